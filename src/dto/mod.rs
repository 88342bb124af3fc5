pub mod admin_dto;
pub mod play_dto;

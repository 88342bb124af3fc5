pub mod game;
pub mod question;
pub mod session;

pub mod game_service;
pub mod registry_service;
pub mod results_service;
pub mod scoring_service;
pub mod session_service;

pub mod config;
pub mod domain;
pub mod errors;
pub mod room;
pub mod services;
pub mod telemetry;
pub mod ws;

pub use errors::DomainError;
pub use services::game_flow::GameFlowService;

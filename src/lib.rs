pub mod config;
pub mod factcheck;
pub mod generator;
pub mod models;
pub mod ollama;
pub mod outbreak;
pub mod server;
pub mod summary;

pub use config::AppConfig;
pub use server::run_server;

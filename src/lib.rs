pub mod config;
pub mod model;
pub mod query;
pub mod refresh;
pub mod server;
mod utils;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;

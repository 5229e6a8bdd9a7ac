pub mod config;
pub mod error;

pub use config::{Config, ConfigFormat};
pub use error::ConfigError;

pub mod config;
pub mod error;
pub mod sample;
pub mod types;

pub use config::AppConfig;
pub use error::{RoiError, RoiResult};

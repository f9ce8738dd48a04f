pub mod config;
pub mod core_cloud;
pub mod core_credentials;
pub mod logging;

pub use logging::{init_logging, LogLevel};

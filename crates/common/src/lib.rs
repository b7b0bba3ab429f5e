//! Shared plumbing for the Liquid faucet workspace: logging setup and
//! configuration file loading.

pub mod config;
pub mod logging;

pub use self::config::load_config;
pub use self::logging::{init_logging, LogFormat, LoggingConfig};

//! Infrastructure Layer
//!
//! Configuration and logging. HTTP lives in the `reel-client` crate.

pub mod config;
pub mod logging;

pub use config::{ConfigError, ReelConfig, BACKEND_ENV_VAR};
pub use logging::{init_tracing, init_tracing_with_level};

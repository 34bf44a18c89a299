//! ReelMetrics box-office client - Main Library
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI)
//! - **boxoffice**: Normalization, aggregation and selection logic (re-exported from workspace)
//! - **reel_client**: HTTP transport and endpoint paths (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use reelmetrics::bin_common::{load_config_from_env, ConfigType};
//! use reelmetrics::boxoffice::SelectionController;
//! ```

// Re-export workspace libraries for convenience
pub use boxoffice;
pub use reel_client;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
}

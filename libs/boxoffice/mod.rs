//! Box-office analytics core
//!
//! Normalizes sale records from heterogeneous backends, groups them by
//! calendar date, answers "top theater on date D" queries and keeps the
//! operator's selection consistent while backends are switched.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used items
pub use application::{
    group_by_date, normalize, normalize_payload, normalize_theaters, total_revenue, Applied,
    Diagnostic, Operation, Phase, Resolution, ResolveFailure, SalesByDate, SalesPayload,
    SelectionController, SelectionError, SelectionState, TopTheaterResolver,
};
pub use domain::{
    Backend, BackendRegistry, RawSaleRecord, RecordError, Sale, Theater, TheaterId,
    TopTheaterResult,
};
pub use infrastructure::{init_tracing, init_tracing_with_level, ConfigError, ReelConfig};

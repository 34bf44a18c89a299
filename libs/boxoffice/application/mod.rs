//! Application Layer
//!
//! The normalization, aggregation and query pipeline, and the selection
//! state machine that drives it.

pub mod adapter;
pub mod aggregator;
pub mod selection;
pub mod top_theater;

pub use adapter::{normalize, normalize_payload, normalize_theaters, SalesPayload};
pub use aggregator::{group_by_date, total_revenue, MovieTotal, SalesByDate};
pub use selection::{
    Applied, BuildError, Diagnostic, Operation, Phase, SelectionController, SelectionError,
    SelectionState,
};
pub use top_theater::{interpret_top_theater, Resolution, ResolveFailure, TopTheaterResolver};

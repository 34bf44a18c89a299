//! Domain Layer
//!
//! Canonical box-office types. Nothing here performs I/O.

pub mod backend;
pub mod models;
pub mod raw;

pub use backend::{Backend, BackendRegistry};
pub use models::{Sale, Theater, TheaterId, TopTheaterResult};
pub use raw::{parse_decimal, parse_sale_date, RawSaleRecord, RecordError};

pub mod endpoints;
pub mod fetcher;
pub mod rest;

pub use endpoints::{theater_sales_url, theaters_url, top_theater_url};
pub use fetcher::{FetchError, JsonFetcher, Result};
pub use rest::HttpClient;

//! Top-theater point query
//!
//! Collapses "the backend has nothing for this date" and "the request
//! failed" into the same [`TopTheaterResult::NoData`]. The reason for a
//! failure is kept on the side in [`Resolution::failure`].

use crate::application::adapter::{ENVELOPE_KEY, SOURCE_KEY};
use crate::domain::{parse_decimal, Backend, TopTheaterResult};
use chrono::NaiveDate;
use reel_client::{top_theater_url, JsonFetcher};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),
}

/// Result of a point query plus the swallowed failure, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub result: TopTheaterResult,
    pub failure: Option<ResolveFailure>,
}

impl Resolution {
    fn no_data(failure: ResolveFailure) -> Self {
        Self {
            result: TopTheaterResult::NoData,
            failure: Some(failure),
        }
    }
}

/// Resolves the highest-grossing theater for a date on one backend
#[derive(Clone)]
pub struct TopTheaterResolver {
    fetcher: Arc<dyn JsonFetcher>,
}

impl TopTheaterResolver {
    pub fn new(fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn resolve(&self, date: NaiveDate, backend: &Backend) -> TopTheaterResult {
        self.resolve_detailed(date, backend).await.result
    }

    pub async fn resolve_detailed(&self, date: NaiveDate, backend: &Backend) -> Resolution {
        let url = top_theater_url(&backend.base_url, date);

        let raw = match self.fetcher.get_json(&url).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Top theater query for {} on {} failed: {}", date, backend.name, e);
                return Resolution::no_data(ResolveFailure::Fetch(e.to_string()));
            }
        };

        match interpret_top_theater(&raw) {
            Ok(result) => {
                debug!("Top theater for {} on {}: {:?}", date, backend.name, result);
                Resolution {
                    result,
                    failure: None,
                }
            }
            Err(failure) => {
                warn!("Top theater payload for {} on {} rejected: {}", date, backend.name, failure);
                Resolution::no_data(failure)
            }
        }
    }
}

/// Map a top-theater payload onto the result type
///
/// `{theater, revenue}` is a hit and `{message}` is a structured miss. Either
/// may arrive wrapped as `{source, data: {...}}`.
pub fn interpret_top_theater(raw: &Value) -> Result<TopTheaterResult, ResolveFailure> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ResolveFailure::UnexpectedPayload(raw.to_string()))?;

    let obj = match obj.get(ENVELOPE_KEY) {
        Some(Value::Object(inner)) if obj.contains_key(SOURCE_KEY) || obj.len() == 1 => inner,
        _ => obj,
    };

    if obj.contains_key("theater") {
        let theater = obj
            .get("theater")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ResolveFailure::UnexpectedPayload("theater name missing".to_string()))?;

        let revenue = obj
            .get("revenue")
            .and_then(parse_decimal)
            .filter(|revenue| *revenue >= Decimal::ZERO)
            .ok_or_else(|| ResolveFailure::UnexpectedPayload("revenue missing or invalid".to_string()))?;

        return Ok(TopTheaterResult::Found {
            theater: theater.to_string(),
            revenue,
        });
    }

    if obj.contains_key("message") {
        return Ok(TopTheaterResult::NoData);
    }

    Err(ResolveFailure::UnexpectedPayload(Value::Object(obj.clone()).to_string()))
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque theater identifier as handed out by a backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TheaterId(String);

impl TheaterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TheaterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TheaterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theater {
    pub id: TheaterId,
    pub name: String,
}

/// Canonical, backend-agnostic sale
///
/// `tickets_sold` and `unit_price` are only known when the backend sent the
/// decomposed shape. `revenue` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub theater_id: TheaterId,
    pub movie_title: String,
    pub sale_date: NaiveDate,
    pub tickets_sold: Option<u64>,
    pub unit_price: Option<Decimal>,
    pub revenue: Decimal,
}

impl Sale {
    /// True when revenue was computed from tickets and unit price
    pub fn is_decomposed(&self) -> bool {
        self.tickets_sold.is_some() && self.unit_price.is_some()
    }
}

/// Outcome of a top-theater point query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopTheaterResult {
    Found { theater: String, revenue: Decimal },
    NoData,
}

impl TopTheaterResult {
    pub fn is_no_data(&self) -> bool {
        matches!(self, TopTheaterResult::NoData)
    }

    pub fn theater(&self) -> Option<&str> {
        match self {
            TopTheaterResult::Found { theater, .. } => Some(theater),
            TopTheaterResult::NoData => None,
        }
    }
}

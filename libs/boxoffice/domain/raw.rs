//! Raw sale records as they arrive from a backend
//!
//! Backends have shipped two record shapes over time:
//!
//! - aggregate: `{sale_date, title, ticket_sales}` with a pre-computed total
//! - decomposed: `{sale_date, movie_title, tickets_sold, ticket_price}`
//!
//! Both are resolved here, once, into [`RawSaleRecord`]. Nothing downstream
//! looks at the JSON shape again.

use super::models::{Sale, TheaterId};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("unrecognized record shape")]
    UnrecognizedShape,

    #[error("missing movie title")]
    MissingTitle,

    #[error("missing sale_date")]
    MissingDate,

    #[error("invalid sale_date '{0}'")]
    InvalidDate(String),

    #[error("field '{0}' is missing or not numeric")]
    NotNumeric(&'static str),

    #[error("field '{0}' is negative")]
    Negative(&'static str),

    #[error("revenue overflows")]
    Overflow,
}

/// A sale record whose variant has been recognized and whose fields parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSaleRecord {
    Aggregate {
        sale_date: NaiveDate,
        title: String,
        ticket_sales: Decimal,
    },
    Decomposed {
        sale_date: NaiveDate,
        title: String,
        tickets_sold: u64,
        ticket_price: Decimal,
    },
}

impl RawSaleRecord {
    /// Recognize the record variant by field presence and parse its fields
    pub fn parse(value: &Value) -> Result<Self, RecordError> {
        let obj = value.as_object().ok_or(RecordError::NotAnObject)?;

        let decomposed = obj.contains_key("tickets_sold") || obj.contains_key("ticket_price");
        if !decomposed && !obj.contains_key("ticket_sales") {
            return Err(RecordError::UnrecognizedShape);
        }

        let title = title_field(obj).ok_or(RecordError::MissingTitle)?;
        let sale_date = match obj.get("sale_date") {
            Some(Value::String(raw)) => parse_sale_date(raw)?,
            Some(Value::Null) | None => return Err(RecordError::MissingDate),
            Some(other) => return Err(RecordError::InvalidDate(other.to_string())),
        };

        if decomposed {
            Ok(RawSaleRecord::Decomposed {
                sale_date,
                title,
                tickets_sold: count_field(obj, "tickets_sold")?,
                ticket_price: amount_field(obj, "ticket_price")?,
            })
        } else {
            Ok(RawSaleRecord::Aggregate {
                sale_date,
                title,
                ticket_sales: amount_field(obj, "ticket_sales")?,
            })
        }
    }

    pub fn sale_date(&self) -> NaiveDate {
        match self {
            RawSaleRecord::Aggregate { sale_date, .. } => *sale_date,
            RawSaleRecord::Decomposed { sale_date, .. } => *sale_date,
        }
    }

    /// Convert into the canonical sale, computing revenue where needed
    pub fn into_sale(self, theater_id: &TheaterId) -> Result<Sale, RecordError> {
        match self {
            RawSaleRecord::Aggregate {
                sale_date,
                title,
                ticket_sales,
            } => Ok(Sale {
                theater_id: theater_id.clone(),
                movie_title: title,
                sale_date,
                tickets_sold: None,
                unit_price: None,
                revenue: ticket_sales,
            }),
            RawSaleRecord::Decomposed {
                sale_date,
                title,
                tickets_sold,
                ticket_price,
            } => {
                let revenue = Decimal::from(tickets_sold)
                    .checked_mul(ticket_price)
                    .ok_or(RecordError::Overflow)?;
                Ok(Sale {
                    theater_id: theater_id.clone(),
                    movie_title: title,
                    sale_date,
                    tickets_sold: Some(tickets_sold),
                    unit_price: Some(ticket_price),
                    revenue,
                })
            }
        }
    }
}

/// Truncate a date or timestamp string to its calendar date
///
/// Accepts `2024-03-01`, `2024-03-01T14:00:00Z` and `2024-03-01 14:00:00`.
pub fn parse_sale_date(raw: &str) -> Result<NaiveDate, RecordError> {
    let date_part = raw
        .trim()
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or_default();

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| RecordError::InvalidDate(raw.to_string()))
}

/// Parse a JSON number or numeric string into an exact decimal
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn title_field(obj: &Map<String, Value>) -> Option<String> {
    ["movie_title", "title"]
        .iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|title| !title.is_empty())
        .map(str::to_string)
}

fn amount_field(obj: &Map<String, Value>, key: &'static str) -> Result<Decimal, RecordError> {
    let amount = obj
        .get(key)
        .and_then(parse_decimal)
        .ok_or(RecordError::NotNumeric(key))?;

    if amount < Decimal::ZERO {
        return Err(RecordError::Negative(key));
    }
    Ok(amount)
}

fn count_field(obj: &Map<String, Value>, key: &'static str) -> Result<u64, RecordError> {
    let count = amount_field(obj, key)?;
    if !count.fract().is_zero() {
        return Err(RecordError::NotNumeric(key));
    }
    count.to_u64().ok_or(RecordError::NotNumeric(key))
}

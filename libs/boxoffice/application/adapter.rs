//! Source adapter
//!
//! Turns whatever a backend returned for a listing endpoint into canonical
//! domain values. Envelope mismatches and bad records never fail the batch.

use crate::domain::{RawSaleRecord, Sale, Theater, TheaterId};
use serde_json::Value;
use tracing::debug;

/// Key under which backends wrap list payloads
pub(crate) const ENVELOPE_KEY: &str = "data";
/// Optional tag a backend adds to say where the payload came from
pub(crate) const SOURCE_KEY: &str = "source";
const NO_RECORDS: &[Value] = &[];

/// Normalized sales plus what the adapter learned along the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesPayload {
    pub sales: Vec<Sale>,
    /// `source` tag from the envelope, e.g. `"cache"`
    pub source: Option<String>,
    /// Records dropped as malformed
    pub skipped: usize,
}

enum Envelope<'a> {
    Records {
        records: &'a [Value],
        source: Option<&'a str>,
    },
    Empty {
        source: Option<&'a str>,
    },
    Unrecognized,
}

fn open_envelope(raw: &Value) -> Envelope<'_> {
    match raw {
        Value::Array(records) => Envelope::Records {
            records,
            source: None,
        },
        Value::Null => Envelope::Empty { source: None },
        Value::Object(obj) => {
            let source = obj.get(SOURCE_KEY).and_then(Value::as_str);
            match obj.get(ENVELOPE_KEY) {
                Some(Value::Array(records)) => Envelope::Records { records, source },
                Some(Value::Null) => Envelope::Empty { source },
                _ => Envelope::Unrecognized,
            }
        }
        _ => Envelope::Unrecognized,
    }
}

/// Normalize a sales listing into canonical sales, in arrival order
pub fn normalize(raw: &Value, theater_id: &TheaterId) -> Vec<Sale> {
    normalize_payload(raw, theater_id).sales
}

/// Like [`normalize`], keeping the envelope source tag and skip count
pub fn normalize_payload(raw: &Value, theater_id: &TheaterId) -> SalesPayload {
    let (records, source) = match open_envelope(raw) {
        Envelope::Records { records, source } => (records, source),
        Envelope::Empty { source } => (NO_RECORDS, source),
        Envelope::Unrecognized => {
            debug!("Unrecognized sales envelope for theater {}", theater_id);
            return SalesPayload::default();
        }
    };

    let mut payload = SalesPayload {
        sales: Vec::with_capacity(records.len()),
        source: source.map(str::to_string),
        skipped: 0,
    };

    for record in records {
        match RawSaleRecord::parse(record).and_then(|r| r.into_sale(theater_id)) {
            Ok(sale) => payload.sales.push(sale),
            Err(e) => {
                debug!("Skipping sale record for theater {}: {}", theater_id, e);
                payload.skipped += 1;
            }
        }
    }

    if payload.skipped > 0 {
        debug!(
            "Normalized {} sales for theater {} ({} skipped)",
            payload.sales.len(),
            theater_id,
            payload.skipped
        );
    }

    payload
}

/// Normalize a theater listing
pub fn normalize_theaters(raw: &Value) -> Vec<Theater> {
    let records = match open_envelope(raw) {
        Envelope::Records { records, .. } => records,
        Envelope::Empty { .. } => return Vec::new(),
        Envelope::Unrecognized => {
            debug!("Unrecognized theaters envelope");
            return Vec::new();
        }
    };

    records
        .iter()
        .filter_map(|record| {
            let theater = parse_theater(record);
            if theater.is_none() {
                debug!("Skipping theater record: {}", record);
            }
            theater
        })
        .collect()
}

fn parse_theater(record: &Value) -> Option<Theater> {
    let obj = record.as_object()?;

    let id = match obj.get("id")? {
        Value::Number(n) => n.to_string(),
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return None,
    };
    let name = obj.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    Some(Theater {
        id: TheaterId::new(id),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn theater() -> TheaterId {
        TheaterId::new("1")
    }

    fn mixed_records() -> Value {
        json!([
            {"sale_date": "2024-03-01", "title": "Dune", "ticket_sales": 532.50},
            {"sale_date": "2024-03-01T14:00:00Z", "movie_title": "Dune", "tickets_sold": 10, "ticket_price": 12.5},
            {"sale_date": "2024-03-02", "title": "Arrival", "ticket_sales": 80}
        ])
    }

    #[test]
    fn test_bare_array_and_envelope_match() {
        let bare = mixed_records();
        let wrapped = json!({"data": mixed_records()});

        let from_bare = normalize(&bare, &theater());
        let from_envelope = normalize(&wrapped, &theater());

        assert_eq!(from_bare.len(), 3);
        assert_eq!(from_bare, from_envelope);
    }

    #[test]
    fn test_arrival_order_preserved() {
        let sales = normalize(&mixed_records(), &theater());
        let revenues: Vec<_> = sales.iter().map(|s| s.revenue).collect();
        assert_eq!(revenues, vec![dec!(532.50), dec!(125.0), dec!(80)]);
        assert!(sales.iter().all(|s| s.theater_id == theater()));
    }

    #[test]
    fn test_source_tag_surfaced() {
        let wrapped = json!({"source": "cache", "data": mixed_records()});
        let payload = normalize_payload(&wrapped, &theater());
        assert_eq!(payload.source.as_deref(), Some("cache"));
        assert_eq!(payload.sales.len(), 3);
        assert_eq!(payload.skipped, 0);
    }

    #[test]
    fn test_unrecognized_envelopes_are_empty() {
        let cases = vec![
            json!({"results": mixed_records()}),
            json!({"data": {"title": "Dune"}}),
            json!("oops"),
            json!(42),
            json!({"error": "Database error"}),
        ];
        for raw in cases {
            assert!(normalize(&raw, &theater()).is_empty(), "input: {}", raw);
        }
    }

    #[test]
    fn test_null_payloads_are_empty() {
        assert!(normalize(&Value::Null, &theater()).is_empty());

        let payload = normalize_payload(&json!({"source": "cache", "data": null}), &theater());
        assert!(payload.sales.is_empty());
        assert_eq!(payload.source.as_deref(), Some("cache"));
    }

    #[test]
    fn test_bad_records_skipped_not_fatal() {
        let raw = json!([
            {"sale_date": "2024-03-01", "title": "Dune", "ticket_sales": 532.50},
            {"sale_date": "2024-03-01", "ticket_sales": 10},
            {"sale_date": "2024-03-01", "movie_title": "Dune", "tickets_sold": 10},
            {"sale_date": "2024-03-01", "movie_title": "Dune", "tickets_sold": "many", "ticket_price": 5},
            null,
            {"sale_date": "2024-03-03", "movie_title": "Heat", "tickets_sold": 4, "ticket_price": 11}
        ]);

        let payload = normalize_payload(&raw, &theater());
        assert_eq!(payload.skipped, 4);
        let titles: Vec<_> = payload.sales.iter().map(|s| s.movie_title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Heat"]);
        assert_eq!(payload.sales[1].revenue, dec!(44));
    }

    #[test]
    fn test_normalize_theaters() {
        let raw = json!([
            {"id": 1, "name": "Regal Cinemas"},
            {"id": "amc-7", "name": " AMC Theaters "},
            {"id": null, "name": "Ghost"},
            {"id": 3},
            {"id": 4, "name": ""}
        ]);

        let theaters = normalize_theaters(&raw);
        assert_eq!(
            theaters,
            vec![
                Theater {
                    id: TheaterId::new("1"),
                    name: "Regal Cinemas".to_string()
                },
                Theater {
                    id: TheaterId::new("amc-7"),
                    name: "AMC Theaters".to_string()
                },
            ]
        );

        assert_eq!(normalize_theaters(&json!({"data": raw})).len(), 2);
        assert!(normalize_theaters(&Value::Null).is_empty());
        assert!(normalize_theaters(&json!({"error": "Database error"})).is_empty());
    }
}

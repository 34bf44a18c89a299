//! Paths of the box-office REST surface
//!
//! Both backend profiles expose the same routes under a different base URL.

use chrono::NaiveDate;

/// `GET /theaters`
pub fn theaters_url(base_url: &str) -> String {
    format!("{}/theaters", trim_base(base_url))
}

/// `GET /theaters/{id}/movies`
pub fn theater_sales_url(base_url: &str, theater_id: &str) -> String {
    format!("{}/theaters/{}/movies", trim_base(base_url), theater_id)
}

/// `GET /top-theater/{YYYY-MM-DD}`
pub fn top_theater_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/top-theater/{}",
        trim_base(base_url),
        date.format("%Y-%m-%d")
    )
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

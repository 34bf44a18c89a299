//! Date bucketing and revenue totals
//!
//! Revenue sums saturate at `Decimal::MAX` instead of overflowing, so a
//! batch of accepted records can never panic the totals.

use crate::domain::Sale;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Sales bucketed by calendar date
///
/// Buckets iterate in calendar order; sales inside a bucket keep the order
/// the adapter emitted them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesByDate {
    buckets: BTreeMap<NaiveDate, Vec<Sale>>,
}

/// Revenue of one movie, summed over some set of sales
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieTotal {
    pub movie_title: String,
    pub revenue: Decimal,
}

/// Group sales by their canonical sale date
pub fn group_by_date<I>(sales: I) -> SalesByDate
where
    I: IntoIterator<Item = Sale>,
{
    let mut buckets: BTreeMap<NaiveDate, Vec<Sale>> = BTreeMap::new();
    for sale in sales {
        buckets.entry(sale.sale_date).or_default().push(sale);
    }
    SalesByDate { buckets }
}

/// Sum of revenue over an ungrouped sequence
pub fn total_revenue(sales: &[Sale]) -> Decimal {
    sum_revenue(sales.iter().map(|s| s.revenue))
}

fn sum_revenue(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

impl SalesByDate {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of distinct dates
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn sale_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.buckets.keys().copied()
    }

    pub fn bucket(&self, date: NaiveDate) -> Option<&[Sale]> {
        self.buckets.get(&date).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[Sale])> + '_ {
        self.buckets.iter().map(|(date, sales)| (*date, sales.as_slice()))
    }

    /// Revenue for one date; zero when the date has no bucket
    pub fn bucket_revenue(&self, date: NaiveDate) -> Decimal {
        self.bucket(date).map(total_revenue).unwrap_or_default()
    }

    /// Revenue across every date
    pub fn total_revenue(&self) -> Decimal {
        sum_revenue(self.buckets.values().map(|sales| total_revenue(sales)))
    }

    /// Per-movie totals across every date
    ///
    /// Movies are listed in calendar-then-arrival order: by the first date
    /// they appear on, then by position within that date's bucket.
    pub fn movie_totals(&self) -> Vec<MovieTotal> {
        movie_totals(self.buckets.values().flatten())
    }

    /// Per-movie totals for one date, in arrival order
    pub fn movie_totals_on(&self, date: NaiveDate) -> Vec<MovieTotal> {
        match self.buckets.get(&date) {
            Some(sales) => movie_totals(sales.iter()),
            None => Vec::new(),
        }
    }
}

fn movie_totals<'a>(sales: impl Iterator<Item = &'a Sale>) -> Vec<MovieTotal> {
    let mut totals: Vec<MovieTotal> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for sale in sales {
        match index.get(sale.movie_title.as_str()) {
            Some(&i) => totals[i].revenue = totals[i].revenue.saturating_add(sale.revenue),
            None => {
                index.insert(sale.movie_title.as_str(), totals.len());
                totals.push(MovieTotal {
                    movie_title: sale.movie_title.clone(),
                    revenue: sale.revenue,
                });
            }
        }
    }

    totals
}

//! Text view model
//!
//! Renders a [`SelectionState`] into the lines a front end displays. Keeps
//! the placeholder wording in one place so every presentation shows the same
//! text for the same state.

use crate::application::SelectionState;
use crate::domain::{BackendRegistry, TopTheaterResult};
use rust_decimal::Decimal;

pub const NO_THEATERS: &str = "No theaters available.";
pub const NO_SALES: &str = "No sales data found for this theater.";
pub const PICK_DATE: &str = "Select a date to see the top theater.";
pub const NO_DATA: &str = "No sales data available";

/// `$1234.50`
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Backend picker, the active backend marked with `*`
pub fn backend_lines(registry: &BackendRegistry, state: &SelectionState) -> Vec<String> {
    registry
        .names()
        .filter_map(|name| registry.get(name))
        .map(|backend| {
            let marker = if backend.name == state.backend.name { "*" } else { " " };
            format!("[{}] {}", marker, backend.label())
        })
        .collect()
}

pub fn theater_lines(state: &SelectionState) -> Vec<String> {
    if state.theaters.is_empty() {
        return vec![NO_THEATERS.to_string()];
    }

    state
        .theaters
        .iter()
        .map(|theater| {
            let selected = state.selected_theater_id.as_ref() == Some(&theater.id);
            format!("{} {} ({})", if selected { ">" } else { "-" }, theater.name, theater.id)
        })
        .collect()
}

/// Per-date sales followed by the theater total; empty before a theater is picked
pub fn sales_lines(state: &SelectionState) -> Vec<String> {
    if state.selected_theater_id.is_none() {
        return Vec::new();
    }
    if state.sales_by_date.is_empty() {
        return vec![NO_SALES.to_string()];
    }

    let mut lines = Vec::new();
    for (date, sales) in state.sales_by_date.iter() {
        lines.push(date.format("%Y-%m-%d").to_string());
        for sale in sales {
            lines.push(format!("  {} - {}", sale.movie_title, format_money(sale.revenue)));
        }
    }
    lines.push(format!(
        "Total Sales: {}",
        format_money(state.sales_by_date.total_revenue())
    ));
    lines
}

/// Top-theater line; absence and failure render identically
pub fn top_theater_line(result: Option<&TopTheaterResult>) -> String {
    match result {
        None => PICK_DATE.to_string(),
        Some(TopTheaterResult::NoData) => NO_DATA.to_string(),
        Some(TopTheaterResult::Found { theater, revenue }) => {
            format!("{} - {}", theater, format_money(*revenue))
        }
    }
}

/// Whole screen as plain text
pub fn render(registry: &BackendRegistry, state: &SelectionState) -> String {
    let mut out = Vec::new();

    out.push("Select Backend:".to_string());
    out.extend(backend_lines(registry, state));

    out.push(String::new());
    out.push("Select a Theater:".to_string());
    out.extend(theater_lines(state));

    let sales = sales_lines(state);
    if !sales.is_empty() {
        out.push(String::new());
        out.push("Sales Data".to_string());
        out.extend(sales);
    }

    out.push(String::new());
    out.push("Top Theater by Sales".to_string());
    if let Some(date) = state.selected_date {
        out.push(format!("Date: {}", date.format("%Y-%m-%d")));
    }
    out.push(top_theater_line(state.top_theater_result.as_ref()));

    out.join("\n")
}

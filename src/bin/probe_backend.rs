//! Probe a box-office backend from the command line
//!
//! Loads the client configuration, switches to a backend and prints what
//! the operator would see after selecting a theater and a date.
//!
//! Usage:
//!   cargo run --bin probe_backend -- [backend] [theater_id] [YYYY-MM-DD]
//!
//! Config path comes from REELMETRICS_CONFIG_PATH (default
//! config/reelmetrics.yaml). Without a config file the stock python/go
//! profiles on localhost are used.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use reelmetrics::bin_common::{load_config_from_env, parse_args, ConfigType};
use reelmetrics::boxoffice::infrastructure::BACKEND_ENV_VAR;
use reelmetrics::boxoffice::{
    init_tracing_with_level, view, Applied, ReelConfig, SelectionController, TheaterId,
};

const RULE: &str = "════════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "────────────────────────────────────────────────────────────────";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = load_config_from_env(ConfigType::Reel);
    let config = if config_path.exists() {
        ReelConfig::load(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        let config = ReelConfig::default().with_backend_override(std::env::var(BACKEND_ENV_VAR).ok());
        config.validate()?;
        config
    };

    init_tracing_with_level(&config.log_level);
    config.log();

    let args = parse_args();
    let backend = args.first().cloned().unwrap_or_else(|| config.default_backend.clone());
    let theater = args.get(1).map(|id| TheaterId::new(id.as_str()));
    let date = match args.get(2) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", raw))?,
        ),
        None => None,
    };

    let controller = SelectionController::from_config(&config)?;

    println!();
    println!("{}", RULE);
    println!("REELMETRICS BACKEND PROBE");
    println!("{}", RULE);
    println!();

    println!("Switching to backend {}...", backend);
    controller.switch_backend(&backend).await?;

    let state = controller.snapshot();
    println!("  Base URL: {}", state.backend.base_url);
    println!("  Theaters: {}", state.theaters.len());
    if let Some(failure) = &state.last_failure {
        println!("  {} failed: {}", failure.operation, failure.reason);
    }

    if let Some(id) = theater {
        println!();
        println!("Selecting theater {}...", id);
        if controller.select_theater(&id).await? == Applied::Stale {
            bail!("sales response for theater {} was superseded", id);
        }

        let state = controller.snapshot();
        println!(
            "  Dates: {}  Sales: {}  Source: {}",
            state.sales_by_date.len(),
            state.sales_by_date.sale_count(),
            state.sales_source.as_deref().unwrap_or("-")
        );
    }

    if let Some(date) = date {
        println!();
        println!("Resolving top theater for {}...", date);
        controller.select_date(date).await?;
    }

    let state = controller.snapshot();
    if let Some(failure) = &state.last_failure {
        println!("  Last failure ({}): {}", failure.operation, failure.reason);
    }

    println!();
    println!("VIEW:");
    println!("{}", THIN_RULE);
    println!("{}", view::render(controller.registry(), &state));
    println!();
    println!("{}", RULE);

    Ok(())
}

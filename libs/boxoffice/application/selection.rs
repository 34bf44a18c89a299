//! Selection controller
//!
//! Owns the one [`SelectionState`] of a session and moves it through
//!
//! ```text
//! NoBackendData -> TheatersLoaded -> TheaterSelected -> DateSelected
//!       ^                                                   |
//!       +------------------- switch_backend ----------------+
//! ```
//!
//! Every fetch is tagged with a [`Ticket`] taken from the scope it belongs
//! to. A response is applied only if that scope has not been renewed while
//! the request was in flight, so a slow reply from a previous backend or a
//! previously selected theater can never overwrite newer state.

use crate::application::adapter::{normalize_payload, normalize_theaters, SalesPayload};
use crate::application::aggregator::{group_by_date, SalesByDate};
use crate::application::top_theater::TopTheaterResolver;
use crate::domain::{Backend, BackendRegistry, Theater, TheaterId, TopTheaterResult};
use crate::infrastructure::ReelConfig;
use chrono::NaiveDate;
use parking_lot::Mutex;
use reel_client::{theater_sales_url, theaters_url, FetchError, HttpClient, JsonFetcher};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Theaters have not been loaded yet")]
    TheatersNotLoaded,

    #[error("Unknown theater: {0}")]
    UnknownTheater(TheaterId),

    #[error("No theater selected")]
    NoTheaterSelected,
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] FetchError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoBackendData,
    TheatersLoaded,
    TheaterSelected,
    DateSelected,
}

/// Whether a finished request was applied or dropped as stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadTheaters,
    LoadSales,
    ResolveTopTheater,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::LoadTheaters => "load theaters",
            Operation::LoadSales => "load sales",
            Operation::ResolveTopTheater => "resolve top theater",
        };
        f.write_str(name)
    }
}

/// A failure that was swallowed into an empty or `NoData` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub operation: Operation,
    pub reason: String,
}

/// Scopes are nested: renewing one renews every narrower scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Scope {
    Backend,
    Theater,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    scope: Scope,
    epoch: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Epochs {
    backend: u64,
    theater: u64,
    date: u64,
    counter: u64,
}

impl Epochs {
    fn current(&self, scope: Scope) -> u64 {
        match scope {
            Scope::Backend => self.backend,
            Scope::Theater => self.theater,
            Scope::Date => self.date,
        }
    }

    fn ticket(&self, scope: Scope) -> Ticket {
        Ticket {
            scope,
            epoch: self.current(scope),
        }
    }

    fn renew(&mut self, scope: Scope) -> Ticket {
        self.counter += 1;
        let epoch = self.counter;
        if scope <= Scope::Backend {
            self.backend = epoch;
        }
        if scope <= Scope::Theater {
            self.theater = epoch;
        }
        self.date = epoch;
        Ticket { scope, epoch }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.current(ticket.scope) == ticket.epoch
    }
}

/// Everything the presentation layer can show
#[derive(Debug, Clone)]
pub struct SelectionState {
    pub backend: Backend,
    pub theaters: Vec<Theater>,
    pub theaters_loaded: bool,
    pub selected_theater_id: Option<TheaterId>,
    pub sales_by_date: SalesByDate,
    /// Where the backend said the last sales payload came from
    pub sales_source: Option<String>,
    pub selected_date: Option<NaiveDate>,
    pub top_theater_result: Option<TopTheaterResult>,
    pub last_failure: Option<Diagnostic>,
    epochs: Epochs,
}

impl SelectionState {
    fn new(backend: Backend) -> Self {
        Self {
            backend,
            theaters: Vec::new(),
            theaters_loaded: false,
            selected_theater_id: None,
            sales_by_date: SalesByDate::default(),
            sales_source: None,
            selected_date: None,
            top_theater_result: None,
            last_failure: None,
            epochs: Epochs::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        if !self.theaters_loaded {
            Phase::NoBackendData
        } else if self.selected_theater_id.is_none() {
            Phase::TheatersLoaded
        } else if self.selected_date.is_none() {
            Phase::TheaterSelected
        } else {
            Phase::DateSelected
        }
    }

    pub fn selected_theater(&self) -> Option<&Theater> {
        let id = self.selected_theater_id.as_ref()?;
        self.theaters.iter().find(|t| &t.id == id)
    }

    /// Drop everything derived from the previous backend
    fn reset_for(&mut self, backend: Backend) -> Ticket {
        let ticket = self.epochs.renew(Scope::Backend);
        self.theaters.clear();
        self.theaters_loaded = false;
        self.selected_theater_id = None;
        self.sales_by_date = SalesByDate::default();
        self.sales_source = None;
        self.top_theater_result = None;
        self.selected_date = None;
        self.last_failure = None;
        self.backend = backend;
        ticket
    }

    /// Record or clear the outcome of a finished fetch
    ///
    /// A success clears `last_failure` only when it was left by the same
    /// operation; failures of other operations stay visible.
    fn settle(&mut self, operation: Operation, failure: Option<String>) {
        match failure {
            Some(reason) => self.last_failure = Some(Diagnostic { operation, reason }),
            None => {
                if self.last_failure.as_ref().map(|d| d.operation) == Some(operation) {
                    self.last_failure = None;
                }
            }
        }
    }
}

/// Coordinates backend, theater and date selection
pub struct SelectionController {
    registry: BackendRegistry,
    fetcher: Arc<dyn JsonFetcher>,
    resolver: TopTheaterResolver,
    state: Mutex<SelectionState>,
}

impl SelectionController {
    /// Create a controller with `default_backend` active and nothing loaded
    pub fn new(
        registry: BackendRegistry,
        default_backend: &str,
        fetcher: Arc<dyn JsonFetcher>,
    ) -> Result<Self, SelectionError> {
        let backend = registry
            .get(default_backend)
            .cloned()
            .ok_or_else(|| SelectionError::UnknownBackend(default_backend.to_string()))?;

        Ok(Self {
            registry,
            resolver: TopTheaterResolver::new(Arc::clone(&fetcher)),
            fetcher,
            state: Mutex::new(SelectionState::new(backend)),
        })
    }

    /// Create a controller talking HTTP to the configured backends
    pub fn from_config(config: &ReelConfig) -> Result<Self, BuildError> {
        let client = HttpClient::with_timeout(config.request_timeout())?;
        Ok(Self::new(
            config.registry(),
            &config.default_backend,
            Arc::new(client),
        )?)
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> SelectionState {
        self.state.lock().clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase()
    }

    pub fn backend(&self) -> Backend {
        self.state.lock().backend.clone()
    }

    /// Fetch the theater list of the active backend
    pub async fn load_theaters(&self) -> Applied {
        let (ticket, backend) = {
            let state = self.state.lock();
            (state.epochs.ticket(Scope::Backend), state.backend.clone())
        };
        self.fetch_theaters(ticket, backend).await
    }

    /// Make `name` the active backend and reload its theaters
    ///
    /// All derived state is cleared before the theaters request is issued.
    pub async fn switch_backend(&self, name: &str) -> Result<Applied, SelectionError> {
        let backend = self
            .registry
            .get(name)
            .cloned()
            .ok_or_else(|| SelectionError::UnknownBackend(name.to_string()))?;

        let ticket = self.state.lock().reset_for(backend.clone());
        info!("Switched to backend {} ({})", backend.name, backend.base_url);

        Ok(self.fetch_theaters(ticket, backend).await)
    }

    /// Select a theater and load its sales
    pub async fn select_theater(&self, id: &TheaterId) -> Result<Applied, SelectionError> {
        let (ticket, backend) = {
            let mut state = self.state.lock();
            if !state.theaters_loaded {
                return Err(SelectionError::TheatersNotLoaded);
            }
            if !state.theaters.iter().any(|t| &t.id == id) {
                return Err(SelectionError::UnknownTheater(id.clone()));
            }

            let ticket = state.epochs.renew(Scope::Theater);
            state.top_theater_result = None;
            state.selected_date = None;
            state.sales_by_date = SalesByDate::default();
            state.sales_source = None;
            state.selected_theater_id = Some(id.clone());
            (ticket, state.backend.clone())
        };

        let url = theater_sales_url(&backend.base_url, id.as_str());
        let (payload, failure) = match self.fetcher.get_json(&url).await {
            Ok(raw) => (normalize_payload(&raw, id), None),
            Err(e) => {
                warn!("Failed to fetch sales for theater {} on {}: {}", id, backend.name, e);
                (SalesPayload::default(), Some(e.to_string()))
            }
        };
        let sales_count = payload.sales.len();
        let grouped = group_by_date(payload.sales);

        let mut state = self.state.lock();
        if !state.epochs.is_current(ticket) {
            debug!("Discarding stale sales for theater {} from {}", id, backend.name);
            return Ok(Applied::Stale);
        }

        info!(
            "Loaded {} sales over {} dates for theater {}",
            sales_count,
            grouped.len(),
            id
        );
        state.sales_by_date = grouped;
        state.sales_source = payload.source;
        state.settle(Operation::LoadSales, failure);
        Ok(Applied::Current)
    }

    /// Select a date and resolve its top theater
    ///
    /// Settles in `DateSelected` whether or not the backend had data.
    pub async fn select_date(&self, date: NaiveDate) -> Result<Applied, SelectionError> {
        let (ticket, backend) = {
            let mut state = self.state.lock();
            if state.selected_theater_id.is_none() {
                return Err(SelectionError::NoTheaterSelected);
            }

            let ticket = state.epochs.renew(Scope::Date);
            state.top_theater_result = None;
            state.selected_date = Some(date);
            (ticket, state.backend.clone())
        };

        let resolution = self.resolver.resolve_detailed(date, &backend).await;

        let mut state = self.state.lock();
        if !state.epochs.is_current(ticket) {
            debug!("Discarding stale top theater for {} from {}", date, backend.name);
            return Ok(Applied::Stale);
        }

        state.top_theater_result = Some(resolution.result);
        state.settle(
            Operation::ResolveTopTheater,
            resolution.failure.map(|failure| failure.to_string()),
        );
        Ok(Applied::Current)
    }

    async fn fetch_theaters(&self, ticket: Ticket, backend: Backend) -> Applied {
        let url = theaters_url(&backend.base_url);
        let (theaters, failure) = match self.fetcher.get_json(&url).await {
            Ok(raw) => (normalize_theaters(&raw), None),
            Err(e) => {
                warn!("Failed to fetch theaters from {}: {}", backend.name, e);
                (Vec::new(), Some(e.to_string()))
            }
        };

        let mut state = self.state.lock();
        if !state.epochs.is_current(ticket) {
            debug!("Discarding stale theaters from {}", backend.name);
            return Applied::Stale;
        }

        info!("Loaded {} theaters from {}", theaters.len(), backend.name);
        state.theaters = theaters;
        state.theaters_loaded = true;
        state.settle(Operation::LoadTheaters, failure);
        Applied::Current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeFetcher;
    use rust_decimal_macros::dec;
    use serde_json::json;

    const PY: &str = "http://localhost:8001";
    const GO: &str = "http://localhost:8002";

    fn registry() -> BackendRegistry {
        BackendRegistry::new().with("python", PY).with("go", GO)
    }

    fn fetcher() -> FakeFetcher {
        FakeFetcher::new()
            .route(
                "http://localhost:8001/theaters",
                json!([{"id": 1, "name": "Regal Cinemas"}, {"id": 2, "name": "Cinemark"}]),
            )
            .route(
                "http://localhost:8001/theaters/1/movies",
                json!([
                    {"sale_date": "2024-03-01", "title": "Dune", "ticket_sales": 532.50},
                    {"sale_date": "2024-03-01T14:00:00Z", "movie_title": "Dune", "tickets_sold": 10, "ticket_price": 12.5}
                ]),
            )
            .route(
                "http://localhost:8001/top-theater/2024-03-01",
                json!({"theater": "Regal Cinemas", "revenue": 657.5}),
            )
            .route("http://localhost:8002/theaters", json!([{"id": 9, "name": "AMC Theaters"}]))
    }

    fn controller() -> SelectionController {
        SelectionController::new(registry(), "python", Arc::new(fetcher())).unwrap()
    }

    fn march_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_epoch_scopes_nest() {
        let mut epochs = Epochs::default();
        let backend = epochs.renew(Scope::Backend);
        let theater = epochs.renew(Scope::Theater);
        assert!(epochs.is_current(backend));
        assert!(epochs.is_current(theater));

        let date = epochs.renew(Scope::Date);
        assert!(epochs.is_current(theater));
        assert!(epochs.is_current(date));

        epochs.renew(Scope::Theater);
        assert!(epochs.is_current(backend));
        assert!(!epochs.is_current(theater));
        assert!(!epochs.is_current(date));

        epochs.renew(Scope::Backend);
        assert!(!epochs.is_current(backend));
    }

    #[test]
    fn test_unknown_default_backend() {
        let result = SelectionController::new(registry(), "rust", Arc::new(FakeFetcher::new()));
        assert!(matches!(result, Err(SelectionError::UnknownBackend(name)) if name == "rust"));
    }

    #[tokio::test]
    async fn test_full_walk_through_phases() {
        let controller = controller();
        assert_eq!(controller.phase(), Phase::NoBackendData);

        assert_eq!(controller.load_theaters().await, Applied::Current);
        assert_eq!(controller.phase(), Phase::TheatersLoaded);
        assert_eq!(controller.snapshot().theaters.len(), 2);

        let applied = controller.select_theater(&TheaterId::new("1")).await.unwrap();
        assert_eq!(applied, Applied::Current);
        assert_eq!(controller.phase(), Phase::TheaterSelected);

        let state = controller.snapshot();
        assert_eq!(state.selected_theater().unwrap().name, "Regal Cinemas");
        assert_eq!(state.sales_by_date.bucket_revenue(march_first()), dec!(657.50));

        controller.select_date(march_first()).await.unwrap();
        assert_eq!(controller.phase(), Phase::DateSelected);
        assert_eq!(
            controller.snapshot().top_theater_result,
            Some(TopTheaterResult::Found {
                theater: "Regal Cinemas".to_string(),
                revenue: dec!(657.5),
            })
        );
    }

    #[tokio::test]
    async fn test_guards_on_transitions() {
        let controller = controller();

        assert_eq!(
            controller.select_theater(&TheaterId::new("1")).await,
            Err(SelectionError::TheatersNotLoaded)
        );
        assert_eq!(
            controller.select_date(march_first()).await,
            Err(SelectionError::NoTheaterSelected)
        );

        controller.load_theaters().await;
        assert_eq!(
            controller.select_theater(&TheaterId::new("404")).await,
            Err(SelectionError::UnknownTheater(TheaterId::new("404")))
        );
        assert_eq!(
            controller.switch_backend("rust").await,
            Err(SelectionError::UnknownBackend("rust".to_string()))
        );
        assert_eq!(controller.backend().name, "python");
        assert_eq!(controller.phase(), Phase::TheatersLoaded);
    }

    #[tokio::test]
    async fn test_reselecting_theater_clears_date_context() {
        let controller = controller();
        controller.load_theaters().await;
        controller.select_theater(&TheaterId::new("1")).await.unwrap();
        controller.select_date(march_first()).await.unwrap();

        // Theater 2 has no sales route: the fetch fails and degrades to empty
        controller.select_theater(&TheaterId::new("2")).await.unwrap();

        let state = controller.snapshot();
        assert_eq!(state.phase(), Phase::TheaterSelected);
        assert_eq!(state.selected_date, None);
        assert_eq!(state.top_theater_result, None);
        assert!(state.sales_by_date.is_empty());
        assert_eq!(
            state.last_failure.map(|d| d.operation),
            Some(Operation::LoadSales)
        );
    }

    #[tokio::test]
    async fn test_no_data_is_a_settled_state() {
        let controller = controller();
        controller.load_theaters().await;
        controller.select_theater(&TheaterId::new("1")).await.unwrap();

        let other_day = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        controller.select_date(other_day).await.unwrap();

        let state = controller.snapshot();
        assert_eq!(state.phase(), Phase::DateSelected);
        assert_eq!(state.top_theater_result, Some(TopTheaterResult::NoData));
    }

    #[tokio::test]
    async fn test_switch_backend_resets_everything() {
        let controller = controller();
        controller.load_theaters().await;
        controller.select_theater(&TheaterId::new("1")).await.unwrap();
        controller.select_date(march_first()).await.unwrap();

        controller.switch_backend("go").await.unwrap();

        let state = controller.snapshot();
        assert_eq!(state.backend.name, "go");
        assert_eq!(state.phase(), Phase::TheatersLoaded);
        assert_eq!(state.theaters.len(), 1);
        assert_eq!(state.theaters[0].name, "AMC Theaters");
        assert_eq!(state.selected_theater_id, None);
        assert!(state.sales_by_date.is_empty());
        assert_eq!(state.selected_date, None);
        assert_eq!(state.top_theater_result, None);
    }

    #[tokio::test]
    async fn test_theater_fetch_failure_is_empty_list() {
        let controller =
            SelectionController::new(registry(), "go", Arc::new(FakeFetcher::new().timeout(
                "http://localhost:8002/theaters",
            )))
            .unwrap();

        assert_eq!(controller.load_theaters().await, Applied::Current);
        let state = controller.snapshot();
        assert_eq!(state.phase(), Phase::TheatersLoaded);
        assert!(state.theaters.is_empty());
        assert_eq!(
            state.last_failure.map(|d| d.operation),
            Some(Operation::LoadTheaters)
        );
    }

    #[tokio::test]
    async fn test_requests_hit_the_active_backend() {
        let fake = Arc::new(fetcher());
        let controller = SelectionController::new(registry(), "python", fake.clone()).unwrap();
        controller.load_theaters().await;
        controller.switch_backend("go").await.unwrap();

        assert_eq!(
            fake.requests(),
            vec![
                "http://localhost:8001/theaters".to_string(),
                "http://localhost:8002/theaters".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_success_clears_failure_of_same_operation() {
        let controller = controller();
        controller.load_theaters().await;

        // Theater 2 has no sales route
        controller.select_theater(&TheaterId::new("2")).await.unwrap();
        assert_eq!(
            controller.snapshot().last_failure.map(|d| d.operation),
            Some(Operation::LoadSales)
        );

        // A top-theater success leaves the sales failure in place
        controller.select_date(march_first()).await.unwrap();
        assert_eq!(
            controller.snapshot().last_failure.map(|d| d.operation),
            Some(Operation::LoadSales)
        );

        controller.select_theater(&TheaterId::new("1")).await.unwrap();
        assert_eq!(controller.snapshot().last_failure, None);
    }
}

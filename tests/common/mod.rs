//! Common test utilities for selection flow integration tests
//!
//! Provides an in-memory fetcher whose responses can be held back per URL,
//! so a test decides exactly when an in-flight request completes.

#![allow(dead_code)]

use async_trait::async_trait;
use reelmetrics::boxoffice::BackendRegistry;
use reelmetrics::reel_client::{FetchError, JsonFetcher};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

pub const PYTHON_URL: &str = "http://localhost:8001";
pub const GO_URL: &str = "http://localhost:8002";

pub fn registry() -> BackendRegistry {
    BackendRegistry::new()
        .with("python", PYTHON_URL)
        .with("go", GO_URL)
}

/// Holds one request until the test releases it
#[derive(Default)]
pub struct Gate {
    arrived: Notify,
    release: Notify,
}

impl Gate {
    /// Wait until the gated request has been issued
    pub async fn arrived(&self) {
        self.arrived.notified().await;
    }

    /// Let the gated request complete
    pub fn release(&self) {
        self.release.notify_one();
    }
}

enum Reply {
    Json(Value),
    Timeout,
}

/// Canned JSON per URL; unrouted URLs answer 404
#[derive(Default)]
pub struct GatedFetcher {
    routes: HashMap<String, Reply>,
    gates: HashMap<String, Arc<Gate>>,
    requests: Mutex<Vec<String>>,
}

impl GatedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, body: Value) -> Self {
        self.routes.insert(url.to_string(), Reply::Json(body));
        self
    }

    pub fn timeout(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Reply::Timeout);
        self
    }

    /// Hold every request to `url` until its gate is released
    pub fn gated(mut self, url: &str) -> Self {
        self.gates.insert(url.to_string(), Arc::new(Gate::default()));
        self
    }

    pub fn gate(&self, url: &str) -> Arc<Gate> {
        Arc::clone(
            self.gates
                .get(url)
                .unwrap_or_else(|| panic!("no gate registered for {}", url)),
        )
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonFetcher for GatedFetcher {
    async fn get_json(&self, url: &str) -> reelmetrics::reel_client::Result<Value> {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some(gate) = self.gates.get(url) {
            gate.arrived.notify_one();
            gate.release.notified().await;
        }

        match self.routes.get(url) {
            Some(Reply::Json(body)) => Ok(body.clone()),
            Some(Reply::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

//! In-memory fetcher for unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use reel_client::{FetchError, JsonFetcher};
use serde_json::Value;
use std::collections::HashMap;

enum Reply {
    Json(Value),
    Timeout,
}

/// Serves canned JSON per URL; anything unrouted answers 404
#[derive(Default)]
pub struct FakeFetcher {
    routes: HashMap<String, Reply>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
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

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl JsonFetcher for FakeFetcher {
    async fn get_json(&self, url: &str) -> reel_client::Result<Value> {
        self.requests.lock().push(url.to_string());
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

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named backend profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    pub name: String,
    pub base_url: String,
}

impl Backend {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    /// Label shown in backend pickers
    pub fn label(&self) -> String {
        self.name.to_uppercase()
    }
}

/// Backend profiles selectable by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Backend>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, backend: Backend) {
        self.backends.insert(backend.name.clone(), backend);
    }

    pub fn with(mut self, name: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.insert(Backend::new(name, base_url));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Backend> {
        self.backends.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

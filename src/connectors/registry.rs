//! Connector registry — named lookup of registered source connectors.

use crate::connectors::{HttpConnector, SourceConnector};
use crate::types::{ConnectorsConfig, Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name → connector lookup. A source name is valid only if registered here;
/// requests naming anything else fail validation before authorization.
#[derive(Default)]
pub struct ConnectorRegistry {
    entries: HashMap<String, Arc<dyn SourceConnector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Build the registry from configuration: one HTTP connector per
    /// configured base URL.
    pub fn from_config(config: &ConnectorsConfig, client: reqwest::Client) -> Result<Self> {
        let mut registry = Self::new();
        let endpoints = [
            ("google_drive", &config.google_drive_url),
            ("notion", &config.notion_url),
            ("sharepoint", &config.sharepoint_url),
        ];
        for (name, url) in endpoints {
            if let Some(url) = url {
                registry.register(Arc::new(HttpConnector::new(name, url, client.clone())))?;
            }
        }
        Ok(registry)
    }

    /// Register a connector.
    ///
    /// Names must be non-empty, contain no ':' (the name becomes the
    /// resource segment of the required scope), and be unique.
    pub fn register(&mut self, connector: Arc<dyn SourceConnector>) -> Result<()> {
        let name = connector.name().to_string();
        if name.is_empty() {
            return Err(Error::validation("Connector name cannot be empty"));
        }
        if name.contains(':') {
            return Err(Error::validation(format!(
                "Connector name '{}' must not contain ':'",
                name
            )));
        }
        if self.entries.contains_key(&name) {
            return Err(Error::validation(format!(
                "Connector '{}' is already registered",
                name
            )));
        }
        self.entries.insert(name, connector);
        Ok(())
    }

    /// Get a connector by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn SourceConnector>> {
        self.entries.get(name).cloned()
    }

    /// Check if a source name is known.
    pub fn has_source(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All registered source names, sorted.
    pub fn source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("sources", &self.source_names())
            .finish()
    }
}

//! # Session Context
//!
//! Who is using the console and where the backend lives. A [`Session`] is
//! handed to every component that needs it at construction time.

use anyhow::{Context, Result};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: Url,
    pub username: String,
    pub group: Option<String>,
    pub properties: Vec<String>,
}

impl Session {
    pub fn new(base_url: &str, username: impl Into<String>) -> Result<Self> {
        let mut url = Url::parse(base_url)
            .with_context(|| format!("Invalid base URL: {}", base_url))?;

        if !url.path().ends_with('/') {
            let mut path = url.path().trim_end_matches('/').to_string();
            path.push('/');
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            username: username.into(),
            group: None,
            properties: Vec::new(),
        })
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_properties(mut self, properties: Vec<String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path such as `RequestMonitor/getSelectionData`
    /// against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Invalid endpoint path: {}", path))
    }
}

//! # Grid Data Endpoint
//!
//! Fetches one page of rows. The endpoint answers
//!
//! ```json
//! { "success": "true", "result": [ { "RequestID": 1, ... } ], "total": 1234 }
//! ```
//!
//! or `{ "success": "false", "error": "..." }`. `success` may be a boolean or
//! the strings `"true"` / `"false"`.

use crate::selector::QueryParameters;
use crate::session::Session;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid request failed: {0}")]
    Http(String),
    #[error("grid endpoint returned unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("failed to decode grid response: {0}")]
    Decode(String),
    #[error("server reported an error: {0}")]
    Server(String),
    #[error("invalid grid endpoint: {0}")]
    InvalidUrl(String),
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridPage {
    pub rows: Vec<Map<String, Value>>,
    pub total: u64,
}

impl GridPage {
    pub fn from_json(body: &Value) -> Result<Self, GridError> {
        let object = body
            .as_object()
            .ok_or_else(|| GridError::Decode("response is not an object".to_string()))?;

        let success = match object.get("success") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            // Some endpoints omit the flag on success
            None => true,
            Some(other) => {
                return Err(GridError::Decode(format!("unexpected success flag {other}")));
            }
        };

        if !success {
            let message = object
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(GridError::Server(message));
        }

        let rows: Vec<Map<String, Value>> = match object.get("result") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(_) => return Err(GridError::Decode("result is not a list".to_string())),
        };

        let total = match object.get("total") {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(rows.len() as u64),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(rows.len() as u64),
            _ => rows.len() as u64,
        };

        Ok(Self { rows, total })
    }
}

/// Anything able to serve pages of grid data.
#[async_trait]
pub trait GridSource: Send + Sync {
    async fn fetch_page(&self, params: &QueryParameters) -> Result<GridPage, GridError>;
}

#[derive(Clone)]
pub struct HttpGridSource {
    http: reqwest::Client,
    url: Url,
}

impl HttpGridSource {
    pub fn new(session: &Session, data_url: &str, timeout: Duration) -> Result<Self, GridError> {
        let url = session
            .endpoint(data_url)
            .map_err(|err| GridError::InvalidUrl(err.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GridError::Http(err.to_string()))?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl GridSource for HttpGridSource {
    async fn fetch_page(&self, params: &QueryParameters) -> Result<GridPage, GridError> {
        info!(url = %self.url, params = params.len(), "loading grid page");

        let response = self
            .http
            .get(self.url.clone())
            .query(params)
            .send()
            .await
            .map_err(|err| GridError::Http(err.to_string()))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "grid endpoint returned an error status");
            return Err(GridError::UnexpectedStatus(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| GridError::Decode(err.to_string()))?;

        GridPage::from_json(&body)
    }
}

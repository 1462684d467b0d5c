//! Backend client.
//!
//! The controller talks to the recommendation service through
//! [`RecipeBackend`]; [`HttpBackend`] is the production implementation over
//! `reqwest`. Tests substitute an in-memory backend.

use async_trait::async_trait;
use mealplan_core::types::{BackendReply, RecipeDetailRequest, RecommendationRequest};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{BackendError, ChatError};

/// A request the controller wants issued.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BackendRequest {
    Recommend(RecommendationRequest),
    Detail(RecipeDetailRequest),
}

impl BackendRequest {
    /// Endpoint path relative to the backend origin.
    pub fn path(&self) -> &'static str {
        match self {
            BackendRequest::Recommend(_) => "/submit",
            BackendRequest::Detail(_) => "/recipe_details",
        }
    }

    pub fn is_detail(&self) -> bool {
        matches!(self, BackendRequest::Detail(_))
    }
}

/// Something that can answer recommendation and detail requests.
#[async_trait]
pub trait RecipeBackend: Send + Sync {
    async fn send(&self, request: &BackendRequest) -> Result<BackendReply, BackendError>;
}

/// JSON-over-HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ChatError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ChatError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, request: &BackendRequest) -> String {
        format!("{}{}", self.base_url, request.path())
    }
}

#[async_trait]
impl RecipeBackend for HttpBackend {
    async fn send(&self, request: &BackendRequest) -> Result<BackendReply, BackendError> {
        let url = self.url_for(request);
        debug!(url = %url, "Sending backend request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Backend returned an error status");
            return Err(BackendError::from_status(
                status.as_u16(),
                status.canonical_reason(),
                &body,
            ));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        BackendReply::decode(payload).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::core::error::AppError;
use crate::features::content::repositories::HeroRepository;

#[derive(Debug, Error)]
pub enum HeroRemoteError {
    #[error("Hero request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Hero endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Hero endpoint rejected the request: {0}")]
    Rejected(String),

    #[error("No hero content stored")]
    Empty,

    #[error("Hero repository failed: {0}")]
    Repository(#[from] AppError),
}

/// Remote copy of the hero section
#[async_trait]
pub trait HeroRemote: Send + Sync {
    async fn fetch(&self) -> Result<Value, HeroRemoteError>;

    async fn push(&self, data: &Value) -> Result<(), HeroRemoteError>;
}

/// `{success, data, message}` as returned by the hero endpoint
#[derive(Debug, Deserialize)]
struct HeroEnvelope {
    success: bool,
    data: Option<Value>,
    message: Option<String>,
}

impl HeroEnvelope {
    fn into_result(self) -> Result<Option<Value>, HeroRemoteError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(HeroRemoteError::Rejected(
                self.message.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

/// Hero endpoint over HTTP. Timeouts are applied by the caller.
pub struct HttpHeroRemote {
    http_client: reqwest::Client,
    url: String,
}

impl HttpHeroRemote {
    /// `base_url` is the remote site root; the hero endpoint is `<base_url>/api/hero`
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url: format!("{}/api/hero", base_url.trim_end_matches('/')),
        }
    }

    async fn read_envelope(response: reqwest::Response) -> Result<Option<Value>, HeroRemoteError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HeroRemoteError::Status { status, body });
        }

        response.json::<HeroEnvelope>().await?.into_result()
    }
}

#[async_trait]
impl HeroRemote for HttpHeroRemote {
    async fn fetch(&self) -> Result<Value, HeroRemoteError> {
        let response = self.http_client.get(&self.url).send().await?;
        Self::read_envelope(response)
            .await?
            .ok_or(HeroRemoteError::Empty)
    }

    async fn push(&self, data: &Value) -> Result<(), HeroRemoteError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&json!({ "data": data }))
            .send()
            .await?;
        Self::read_envelope(response).await?;
        Ok(())
    }
}

/// Hero content kept in the database, used when no hero URL is configured
pub struct RepositoryHeroRemote {
    repository: Arc<dyn HeroRepository>,
}

impl RepositoryHeroRemote {
    pub fn new(repository: Arc<dyn HeroRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl HeroRemote for RepositoryHeroRemote {
    async fn fetch(&self) -> Result<Value, HeroRemoteError> {
        self.repository
            .latest()
            .await?
            .ok_or(HeroRemoteError::Empty)
    }

    async fn push(&self, data: &Value) -> Result<(), HeroRemoteError> {
        self.repository.save(data).await?;
        Ok(())
    }
}

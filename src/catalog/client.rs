use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::request::CatalogRequest;
use super::types::{Genre, GenreList, MoviePage};
use crate::config::CatalogConfig;

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn genres(&self, request: &CatalogRequest) -> Result<Vec<Genre>, CatalogError>;
    async fn movies(&self, request: &CatalogRequest) -> Result<MoviePage, CatalogError>;
}

/// HTTP client for the TMDB v3 API.
pub struct TmdbClient {
    http_client: Client,
    base_url: String,
}

impl TmdbClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: config.api_base_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: &CatalogRequest) -> Result<T, CatalogError> {
        let url = request.url(&self.base_url);
        debug!(endpoint = request.endpoint.path(), query = %redacted(request), "catalog request");

        let response = self.http_client.get(&url).send().await?;

        // Error statuses still carry a JSON body; it is decoded like any other
        // and a body without the expected fields degrades to defaults.
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), endpoint = request.endpoint.path(), "catalog returned error status");
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::Decode(request.endpoint.path(), e))
    }
}

#[async_trait]
impl CatalogApi for TmdbClient {
    async fn genres(&self, request: &CatalogRequest) -> Result<Vec<Genre>, CatalogError> {
        let list: GenreList = self.get_json(request).await?;
        Ok(list.genres)
    }

    async fn movies(&self, request: &CatalogRequest) -> Result<MoviePage, CatalogError> {
        self.get_json(request).await
    }
}

fn redacted(request: &CatalogRequest) -> String {
    request
        .params
        .iter()
        .map(|(k, v)| {
            if *k == "api_key" {
                format!("{}=***", k)
            } else {
                format!("{}={}", k, v)
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to decode response from {0}: {1}")]
    Decode(&'static str, serde_json::Error),
}

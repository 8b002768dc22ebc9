//! Catalog search client

use async_trait::async_trait;

use super::track::{tracks_from_response, CatalogResponse, Track};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::log_catalog_result;

/// Source of search results
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Tracks matching `term`, already filtered to playable songs
    async fn search(&self, term: &str) -> Result<Vec<Track>>;
}

/// iTunes Search API client
#[derive(Clone)]
pub struct ItunesClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ItunesClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.catalog_url.clone(),
        })
    }

    async fn fetch(&self, term: &str) -> Result<Vec<Track>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("term", term)])
            .send()
            .await
            .map_err(|e| network_error(term, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Server {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                url: response.url().to_string(),
            });
        }

        let body: CatalogResponse = response.json().await.map_err(|e| network_error(term, e))?;
        tracing::debug!(term, result_count = body.result_count, "Catalog response decoded");

        Ok(tracks_from_response(body))
    }
}

fn network_error(term: &str, error: reqwest::Error) -> Error {
    Error::Network {
        term: term.to_string(),
        message: error.to_string(),
    }
}

#[async_trait]
impl CatalogClient for ItunesClient {
    async fn search(&self, term: &str) -> Result<Vec<Track>> {
        tracing::debug!(term, endpoint = %self.endpoint, "Catalog request started");
        let result = self.fetch(term).await;
        log_catalog_result!(term, result);
        result
    }
}

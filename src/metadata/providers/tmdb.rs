//! TMDB (The Movie Database) catalog provider.
//!
//! Implements [`CatalogProvider`] against the TMDB v3 REST API.
//!
//! Features:
//! - Token-bucket rate limiting via [`governor`] (`catalog.requests_per_second`).
//! - Per-request timeout (`catalog.timeout_secs`).
//! - Credits embedded in the detail call with `append_to_response`.
//!
//! Failures are never retried here; a 404 maps to [`CatalogError::NotFound`],
//! any other non-2xx status or transport failure to [`CatalogError::Transport`],
//! and an unparseable body to [`CatalogError::Malformed`].

use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reeltag_core::config::CatalogConfig;
use reeltag_core::MediaKind;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::metadata::provider::{CatalogDetails, CatalogError, CatalogProvider, SearchHit};

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// TMDB catalog provider.
///
/// # Examples
///
/// ```no_run
/// use reeltag::metadata::providers::TmdbProvider;
/// use reeltag_core::config::CatalogConfig;
///
/// let mut config = CatalogConfig::default();
/// config.api_key = "your-api-key".into();
/// let provider = TmdbProvider::new(&config).unwrap();
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    base_url: String,
    image_base_url: String,
    api_key: String,
    language: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbProvider {
    /// Create a provider from the `[catalog]` config section.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CatalogError::Transport(format!("failed to build HTTP client: {e}")))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            rate_limiter,
        })
    }

    /// `true` once an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Rate-limited GET returning the raw body.
    async fn get_bytes(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<u8>, CatalogError> {
        self.rate_limiter.until_ready().await;

        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Transport(format!("{url} returned {status}")));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| CatalogError::Transport(format!("reading body of {url} failed: {e}")))?;
        Ok(body.to_vec())
    }

    /// API GET with the key and language attached, decoded as JSON.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        extra: &[(&'static str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{path}", self.base_url);
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
        ];
        params.extend(extra.iter().cloned());

        let body = self.get_bytes(&url, &params).await?;
        serde_json::from_slice(&body)
            .map_err(|e| CatalogError::Malformed(format!("{path}: {e}")))
    }
}

#[async_trait]
impl CatalogProvider for TmdbProvider {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn search(
        &self,
        kind: MediaKind,
        title: &str,
        year: Option<u16>,
    ) -> Result<Vec<SearchHit>, CatalogError> {
        let path = format!("/search/{}", kind.catalog_segment());
        let mut params = vec![("query", title.to_string())];
        if let (MediaKind::Movie, Some(year)) = (kind, year) {
            params.push(("year", year.to_string()));
        }

        debug!(path = %path, title = %title, "TMDB search");
        let body: TmdbSearchResponse = self.get_json(&path, &params).await?;
        Ok(body.results)
    }

    async fn details(&self, kind: MediaKind, id: u64) -> Result<CatalogDetails, CatalogError> {
        let path = format!("/{}/{id}", kind.catalog_segment());
        debug!(path = %path, "TMDB details");
        self.get_json(&path, &[("append_to_response", "credits,keywords".to_string())])
            .await
    }

    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>, CatalogError> {
        let url = format!("{}{path}", self.image_base_url);
        debug!(url = %url, "TMDB image");
        self.get_bytes(&url, &[]).await
    }
}

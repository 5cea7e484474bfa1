//! Remote recipe catalog: search, create and delete over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{NewRecipe, Recipe, RecipeId},
    error::{ApiError, ErrorCode},
    protocol::{CreatedRecipe, SearchResponse},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Public demo catalog the page talks to by default.
pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("catalog transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidUrl { .. } | Self::Transport(_) => ErrorCode::Network,
            Self::Status { .. } => ErrorCode::Status,
            Self::Decode(_) => ErrorCode::Parse,
        }
    }
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Recipe>, CatalogError>;
    async fn create(&self, recipe: &NewRecipe) -> Result<CreatedRecipe, CatalogError>;
    async fn delete(&self, id: RecipeId) -> Result<(), CatalogError>;
}

pub struct HttpCatalogClient {
    http: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        Self::with_timeout(base_url, None)
    }

    /// `None` leaves timeouts to the transport defaults.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, CatalogError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|source| CatalogError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, CatalogError> {
    let mut url = Url::parse(raw.trim()).map_err(|source| CatalogError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn ensure_success(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .ok()
        .map(|err| err.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(CatalogError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn search(&self, query: &str) -> Result<Vec<Recipe>, CatalogError> {
        let url = self.endpoint("recipes/search")?;
        debug!(%url, query, "searching catalog");
        let response = self.http.get(url).query(&[("q", query)]).send().await?;
        let body: SearchResponse = decode(ensure_success(response).await?).await?;
        Ok(body.recipes)
    }

    async fn create(&self, recipe: &NewRecipe) -> Result<CreatedRecipe, CatalogError> {
        let url = self.endpoint("recipes/add")?;
        debug!(%url, name = %recipe.name, "creating catalog recipe");
        let response = self.http.post(url).json(recipe).send().await?;
        decode(ensure_success(response).await?).await
    }

    async fn delete(&self, id: RecipeId) -> Result<(), CatalogError> {
        let url = self.endpoint(&format!("recipes/{id}"))?;
        debug!(%url, "deleting catalog recipe");
        let response = self.http.delete(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;

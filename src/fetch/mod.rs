//! HTTP plumbing for the hosted data store.
//!
//! [`HttpClient`] is the seam the store client is written against;
//! [`BasicClient`] is the plain reqwest implementation and
//! [`auth::ApiKey`] wraps any client with the store's key headers.

pub mod auth;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}

/// Fetches a URL and returns the raw body bytes.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("request failed with status {status}: {body}");
    }
    Ok(resp.bytes().await?.to_vec())
}

/// Fetches a URL and deserializes the JSON body.
pub async fn fetch_json<C: HttpClient, T: DeserializeOwned>(client: &C, url: &str) -> Result<T> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("request failed with status {status}: {body}");
    }
    Ok(resp.json().await?)
}

use async_trait::async_trait;

use super::HttpClient;

/// An [`HttpClient`] wrapper that injects the hosted store's service key.
///
/// The store expects the key twice on every request: as an `apikey` header
/// and as an `Authorization: Bearer` token.
pub struct ApiKey<C> {
    pub inner: C,
    pub key: String,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, key: String) -> Self {
        Self { inner, key }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let headers = req.headers_mut();
        if let Ok(value) = self.key.parse() {
            headers.insert("apikey", value);
        }
        if let Ok(value) = format!("Bearer {}", self.key).parse() {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        self.inner.execute(req).await
    }
}

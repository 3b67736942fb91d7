//! Typed HTTP requests against the db-query API.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::TransportError;

/// Build an API path from raw segments, percent-encoding each one.
///
/// `endpoint(&["dbs", "my db", "query"])` yields `/dbs/my%20db/query`.
pub fn endpoint(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| format!("/{}", urlencoding::encode(s)))
        .collect()
}

/// Client for the db-query REST API.
///
/// Holds the base URL (including the `/api/v1` prefix) and a pooled
/// `reqwest::Client` with the request timeout applied to every call.
#[derive(Debug, Clone)]
pub struct Transport {
    base_url: String,
    http: reqwest::Client,
}

impl Transport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let resp = self.send(self.request(Method::GET, path)).await?;
        decode(resp).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(Method::PUT, path).json(body)).await?;
        decode(resp).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(Method::PATCH, path).json(body)).await?;
        decode(resp).await
    }

    /// POST with an optional JSON body, decoding a JSON response.
    pub async fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut req = self.request(Method::POST, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = self.send(req).await?;
        decode(resp).await
    }

    /// POST a JSON body and return the raw response payload.
    pub async fn post_bytes<B>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<Bytes, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::POST, path).query(query).json(body);
        let resp = self.send(req).await?;
        Ok(resp.bytes().await?)
    }

    /// DELETE, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), TransportError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "API request");
        self.http.request(method, url)
    }

    /// Send a request and turn any non-2xx answer into a [`TransportError`].
    async fn send(&self, req: RequestBuilder) -> Result<Response, TransportError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().await.unwrap_or_default();
        let err = TransportError::from_response(status.as_u16(), &body);
        debug!(status = status.as_u16(), error = %err, "API request failed");
        Err(err)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, TransportError> {
    let status = resp.status().as_u16();
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        TransportError::new(Some(status), format!("invalid response body: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        assert_eq!(endpoint(&["dbs"]), "/dbs");
        assert_eq!(endpoint(&["dbs", "my db", "query"]), "/dbs/my%20db/query");
        assert_eq!(endpoint(&["dbs", "a/b"]), "/dbs/a%2Fb");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = Transport::new("http://localhost:8000/api/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8000/api/v1");
    }
}

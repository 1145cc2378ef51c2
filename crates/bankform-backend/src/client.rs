//! Minimal JSON-over-HTTP/1 client

use hyper::client::HttpConnector;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Body, Client, Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use bankform_core::{CoreError, CoreResult};

/// Longest slice of an error body carried into `CoreError::Backend`
const MAX_ERROR_BODY: usize = 200;

/// Status and body of a finished request
pub(crate) struct Response {
    pub status: StatusCode,
    pub body: hyper::body::Bytes,
}

impl Response {
    pub fn json<T: DeserializeOwned>(&self) -> CoreResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| CoreError::Decode { message: e.to_string() })
    }

    /// Fail on any non-2xx status
    pub fn error_for_status(self) -> CoreResult<Self> {
        if self.status.is_success() {
            return Ok(self);
        }
        let text = String::from_utf8_lossy(&self.body);
        let message = match text.char_indices().nth(MAX_ERROR_BODY) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.into_owned(),
        };
        Err(CoreError::Backend {
            status: self.status.as_u16(),
            message,
        })
    }
}

#[derive(Clone)]
pub(crate) struct JsonClient {
    http: Client<HttpConnector>,
    base_url: String,
}

impl JsonClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> CoreResult<Response> {
        self.send(Method::GET, path, Body::empty()).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> CoreResult<Response> {
        let json = serde_json::to_vec(body).map_err(|e| CoreError::Internal { message: e.to_string() })?;
        self.send(Method::POST, path, Body::from(json)).await
    }

    pub async fn delete(&self, path: &str) -> CoreResult<Response> {
        self.send(Method::DELETE, path, Body::empty()).await
    }

    async fn send(&self, method: Method, path: &str, body: Body) -> CoreResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("{} {}", method, url);

        let request = Request::builder()
            .method(method)
            .uri(url.as_str())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .map_err(|e| CoreError::Internal {
                message: format!("invalid request to {}: {}", url, e),
            })?;

        let response = self.http.request(request).await.map_err(|e| CoreError::Transport {
            message: format!("{}: {}", url, e),
        })?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| CoreError::Transport {
                message: format!("{}: {}", url, e),
            })?;

        log::debug!("{} answered {}", url, status);
        Ok(Response { status, body })
    }
}

//! HTTP transport for release downloads
//!
//! Abstracts the download for testability. Provides:
//! - HttpTransport trait: a single blocking GET returning the body
//! - ReqwestTransport: real HTTPS client for production
//! - StubTransport: canned response that records every requested URL

use std::sync::{Mutex, PoisonError};

/// Transport trait for fetching release archives
pub trait HttpTransport: Send + Sync {
    /// GET `url` and return the response body; non-success statuses are errors
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Blocking reqwest client
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let request_error = |e: reqwest::Error| TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(request_error)?;
        Ok(body.to_vec())
    }
}

#[derive(Debug, Clone)]
enum StubResponse {
    Body(Vec<u8>),
    Status(u16),
}

/// In-process transport returning a fixed response
#[derive(Debug)]
pub struct StubTransport {
    response: StubResponse,
    requests: Mutex<Vec<String>>,
}

impl StubTransport {
    /// Respond to every GET with `body`
    pub fn with_body(body: Vec<u8>) -> Self {
        Self {
            response: StubResponse::Body(body),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Respond to every GET with the given HTTP status
    pub fn with_status(status: u16) -> Self {
        Self {
            response: StubResponse::Status(status),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl HttpTransport for StubTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        match &self.response {
            StubResponse::Body(body) => Ok(body.clone()),
            StubResponse::Status(status) => Err(TransportError::Status {
                url: url.to_string(),
                status: *status,
            }),
        }
    }
}

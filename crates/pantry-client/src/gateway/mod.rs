//! # Gateway
//!
//! The request/response boundary between entity stores and the API.
//!
//! ## Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Gateway Implementations                         │
//! │                                                                         │
//! │  EntityStore<R> ──► Arc<dyn Gateway> ──┬──► HttpGateway                 │
//! │                                        │    reqwest, bearer token,      │
//! │                                        │    ends the session on 401     │
//! │                                        │                                │
//! │                                        └──► InMemoryGateway             │
//! │                                             REST-shaped records in a    │
//! │                                             map, for demos and tests    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Paths are relative to the API root (`/categories`, `/categories/7`).
//! Bodies and responses are plain JSON; decoding into entity types happens in
//! the store.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GatewayError;

pub mod http;
pub mod memory;

pub use http::HttpGateway;
pub use memory::{InMemoryGateway, DEMO_EMAIL, DEMO_PASSWORD};

/// HTTP verbs used by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// How a request body goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Json,
    /// `application/x-www-form-urlencoded`; the body must be a flat object.
    Form,
}

/// A single API call.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub encoding: Encoding,
}

impl GatewayRequest {
    pub fn get(path: impl Into<String>) -> Self {
        GatewayRequest {
            method: Method::Get,
            path: path.into(),
            body: None,
            encoding: Encoding::Json,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        GatewayRequest {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
            encoding: Encoding::Json,
        }
    }

    /// A POST whose body is sent as a form, as the sign-in endpoint expects.
    pub fn post_form(path: impl Into<String>, fields: Value) -> Self {
        GatewayRequest {
            encoding: Encoding::Form,
            ..Self::post(path, fields)
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        GatewayRequest {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
            encoding: Encoding::Json,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        GatewayRequest {
            method: Method::Delete,
            path: path.into(),
            body: None,
            encoding: Encoding::Json,
        }
    }
}

/// Sends requests to the API.
///
/// A successful call yields the decoded JSON body (`Value::Null` when the
/// response had none). Every failure comes back as a [`GatewayError`]; the
/// gateway never panics on a bad response.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send(&self, request: GatewayRequest) -> Result<Value, GatewayError>;
}

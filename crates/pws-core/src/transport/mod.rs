//! Request transport to the practice web server.
//!
//! The `Transport` trait is the single seam the orchestrator talks through:
//! one JSON POST per call, resolving to the decoded response body. Network
//! errors, non-2xx statuses and undecodable bodies all come back as
//! `TransportError`.

pub mod http;

pub use http::HttpTransport;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::TransportError;

/// Name of the authentication endpoint
pub const LOGIN_ENDPOINT: &str = "login";

/// Name of the submissions listing endpoint
pub const SUBMISSIONS_ENDPOINT: &str = "submissions";

pub trait Transport: Send + Sync {
    /// POST `body` as JSON to `endpoint` and decode the JSON response.
    fn post<'a>(&'a self, endpoint: &'a str, body: Value)
        -> BoxFuture<'a, Result<Value, TransportError>>;
}

//! Minimal synchronous JSON REST client.
//!
//! Public API layers:
//! - [`RestClient`]: base URL, headers and credential; `get`/`post`/`put`/`del`.
//! - [`Response`]: status code, raw body and eagerly parsed JSON.
//! - [`ClientError`]: network, HTTP status and JSON parse failures.
//! - [`Transport`]: the seam to the HTTP engine, [`HttpTransport`] by default.
//!
//! Every call blocks until the exchange completes. There is no retry, no
//! connection reuse and no async API.

mod auth;
mod client;
mod error;
mod response;
mod transport;

/// Authentication credential rendered into the `Authorization` header.
pub use auth::{AUTHORIZATION, Credential};
/// Blocking JSON REST client.
pub use client::RestClient;
/// Error type returned by all client operations.
pub use error::ClientError;
/// Completed exchange with a parsed JSON body.
pub use response::Response;
/// Pluggable HTTP execution layer.
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
/// HTTP method type accepted by [`RestClient::request`].
pub use reqwest::Method;

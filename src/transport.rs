use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::ClientError;

/// One outgoing HTTP exchange, fully rendered by [`crate::RestClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    /// Target URL, `base_url + endpoint` without normalization.
    pub url: String,
    /// Header name/value pairs in the order they are sent.
    pub headers: Vec<(String, String)>,
    /// Serialized JSON payload, if any.
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    /// Renders the headers as `Name: Value` lines.
    ///
    /// [`HttpTransport`] passes headers to `reqwest` as a map; this is for
    /// custom transports that speak the line form and for inspecting what a
    /// client would send.
    pub fn header_lines(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect()
    }

    /// Declared payload length in bytes, or `None` without a body.
    pub fn content_length(&self) -> Option<usize> {
        self.body.as_ref().map(Vec::len)
    }
}

/// Status and accumulated body of a completed exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Executes a single HTTP exchange synchronously.
///
/// Implementations report any failure to complete the exchange as
/// [`ClientError::Network`]. HTTP error statuses are not failures at this
/// layer; they are returned as ordinary responses.
pub trait Transport {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ClientError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
        (**self).execute(request)
    }
}

/// Default transport backed by `reqwest::blocking`.
///
/// A fresh client is built for every call and keeps no idle connections, so
/// nothing outlives the exchange. Redirect, timeout and TLS behaviour are the
/// `reqwest` defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpTransport;

impl Transport for HttpTransport {
    fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .pool_max_idle_per_host(0)
            .build()?;

        let mut call = http
            .request(request.method, &request.url)
            .headers(header_map(&request.headers)?);

        if let Some(payload) = request.body {
            call = call.body(payload);
        }

        let mut response = call.send()?;
        let status = response.status().as_u16();

        // The body may arrive in several chunks; append them in order.
        let mut buffer = Vec::new();
        response.copy_to(&mut buffer)?;

        Ok(TransportResponse {
            status,
            body: String::from_utf8_lossy(&buffer).into_owned(),
        })
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, ClientError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ClientError::Network(format!("invalid header name '{name}'")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| ClientError::Network(format!("invalid value for header '{name}'")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

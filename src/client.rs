use std::collections::BTreeMap;

use log::{debug, warn};
use reqwest::Method;
use serde_json::Value;

use crate::auth::{AUTHORIZATION, Credential};
use crate::transport::{HttpTransport, Transport, TransportRequest};
use crate::{ClientError, Response};

/// Synchronous JSON REST client.
///
/// Holds a base URL, a header set and at most one credential. Every call
/// blocks until the transport completes and opens its own connection.
///
/// Configuration methods take `&mut self` and calls take `&self`, so the
/// header set cannot change while a request on the same instance is in
/// flight. Use separate instances for concurrent callers.
#[derive(Clone, Debug)]
pub struct RestClient<T = HttpTransport> {
    base_url: String,
    headers: BTreeMap<String, String>,
    credential: Option<Credential>,
    transport: T,
}

impl RestClient {
    /// Creates a client for `base_url` using [`HttpTransport`].
    ///
    /// The URL is stored verbatim: endpoints are appended to it without any
    /// slash normalization, and it is not validated until the first call.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_transport(base_url, HttpTransport)
    }
}

impl<T: Transport> RestClient<T> {
    /// Creates a client that sends its requests through `transport`.
    pub fn with_transport(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into(),
            headers: BTreeMap::new(),
            credential: None,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every request, including `Authorization` when a
    /// credential is set.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Looks up a header by name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// The credential currently rendered into `Authorization`, if any.
    ///
    /// Setting or removing `Authorization` through the header methods drops it.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Sets a header, replacing any previous value for the same name.
    ///
    /// Names compare case-insensitively, as HTTP treats them; the casing of
    /// the latest call is the one sent.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.remove_header(&key);
        self.headers.insert(key, value.into());
    }

    /// Removes a header under any casing. Absent names are ignored.
    pub fn remove_header(&mut self, key: &str) {
        self.headers.retain(|name, _| !name.eq_ignore_ascii_case(key));
        if key.eq_ignore_ascii_case(AUTHORIZATION) {
            self.credential = None;
        }
    }

    /// Authenticates with a percent-encoded `username:password` pair.
    ///
    /// See [`Credential::authorization_value`] for the exact encoding.
    pub fn set_basic_auth(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.set_credential(Credential::Basic {
            username: username.into(),
            password: password.into(),
        });
    }

    /// Authenticates with `Authorization: Bearer <token>`.
    pub fn set_bearer_token(&mut self, token: impl Into<String>) {
        self.set_credential(Credential::Bearer(token.into()));
    }

    /// Drops the credential and the `Authorization` header.
    pub fn clear_auth(&mut self) {
        self.remove_header(AUTHORIZATION);
    }

    fn set_credential(&mut self, credential: Credential) {
        self.add_header(AUTHORIZATION, credential.authorization_value());
        self.credential = Some(credential);
    }

    /// Sends a `GET` request.
    pub fn get(&self, endpoint: &str) -> Result<Response, ClientError> {
        self.request(Method::GET, endpoint, None)
    }

    /// Sends a `POST` request with a JSON body.
    pub fn post(&self, endpoint: &str, body: &Value) -> Result<Response, ClientError> {
        self.request(Method::POST, endpoint, Some(body))
    }

    /// Sends a `PUT` request with a JSON body.
    pub fn put(&self, endpoint: &str, body: &Value) -> Result<Response, ClientError> {
        self.request(Method::PUT, endpoint, Some(body))
    }

    /// Sends a `DELETE` request.
    pub fn del(&self, endpoint: &str) -> Result<Response, ClientError> {
        self.request(Method::DELETE, endpoint, None)
    }

    /// Sends a request and wraps the outcome.
    ///
    /// Statuses >= 400 become [`ClientError::HttpStatus`] and their body is
    /// dropped. Any other status yields a [`Response`], provided the body
    /// parses as JSON.
    pub fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let request = self.build_request(method, endpoint, body)?;
        debug!(
            "{} {} ({} headers, {} body bytes)",
            request.method,
            request.url,
            request.headers.len(),
            request.content_length().unwrap_or(0)
        );

        let method = request.method.clone();
        let url = request.url.clone();
        let response = self.transport.execute(request).inspect_err(|error| {
            warn!("{method} {url} failed: {error}");
        })?;

        if response.status >= 400 {
            warn!("{method} {url} returned status {}", response.status);
            return Err(ClientError::http_status(response.status));
        }

        debug!(
            "{method} {url} returned status {} ({} body bytes)",
            response.status,
            response.body.len()
        );
        Response::new(response.status, response.body)
    }

    fn build_request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<TransportRequest, ClientError> {
        let payload = body.map(serde_json::to_vec).transpose()?;

        Ok(TransportRequest {
            method,
            url: format!("{}{endpoint}", self.base_url),
            headers: self
                .headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            body: payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use reqwest::Method;
    use serde_json::json;

    use super::RestClient;
    use crate::ClientError;
    use crate::auth::Credential;
    use crate::transport::{Transport, TransportRequest, TransportResponse};

    /// Replays queued outcomes and records every request it receives.
    #[derive(Default)]
    struct RecordingTransport {
        outcomes: RefCell<VecDeque<Result<TransportResponse, ClientError>>>,
        requests: RefCell<Vec<TransportRequest>>,
    }

    impl RecordingTransport {
        fn replying(status: u16, body: &str) -> Self {
            let transport = Self::default();
            transport.push(Ok(TransportResponse {
                status,
                body: body.to_owned(),
            }));
            transport
        }

        fn push(&self, outcome: Result<TransportResponse, ClientError>) {
            self.outcomes.borrow_mut().push_back(outcome);
        }

        fn last_request(&self) -> TransportRequest {
            self.requests
                .borrow()
                .last()
                .cloned()
                .expect("a request was sent")
        }
    }

    impl Transport for RecordingTransport {
        fn execute(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
            self.requests.borrow_mut().push(request);
            self.outcomes
                .borrow_mut()
                .pop_front()
                .expect("an outcome is queued")
        }
    }

    #[test]
    fn add_header_overwrites_existing_value() {
        let mut client = RestClient::new("https://example.com");
        client.add_header("X-Mode", "one");
        client.add_header("X-Mode", "two");
        assert_eq!(client.headers().len(), 1);
        assert_eq!(client.header("X-Mode"), Some("two"));
    }

    #[test]
    fn remove_header_deletes_and_ignores_absent_keys() {
        let mut client = RestClient::new("https://example.com");
        client.add_header("X-Mode", "one");
        client.remove_header("X-Mode");
        assert_eq!(client.header("X-Mode"), None);

        client.remove_header("X-Missing");
        assert!(client.headers().is_empty());
    }

    #[test]
    fn header_names_are_unique_regardless_of_case() {
        let mut client = RestClient::new("https://example.com");
        client.add_header("X-A", "one");
        client.add_header("x-a", "two");
        assert_eq!(client.headers().len(), 1);
        assert_eq!(client.header("X-A"), Some("two"));

        client.remove_header("X-a");
        assert!(client.headers().is_empty());
    }

    #[test]
    fn credential_setter_replaces_differently_cased_authorization() {
        let transport = RecordingTransport::replying(200, "{}");
        let mut client = RestClient::with_transport("https://api.example.com", &transport);
        client.add_header("authorization", "stale");
        client.set_bearer_token("tok");
        assert_eq!(client.headers().len(), 1);

        client.get("/x").expect("successful call");
        assert_eq!(
            transport.last_request().header_lines(),
            vec!["Authorization: Bearer tok"]
        );

        client.add_header("AUTHORIZATION", "manual");
        client.clear_auth();
        assert!(client.headers().is_empty());
    }

    #[test]
    fn manual_authorization_changes_drop_the_credential() {
        let mut client = RestClient::new("https://example.com");
        client.set_bearer_token("tok");
        client.add_header("Authorization", "Token custom");
        assert_eq!(client.credential(), None);
        assert_eq!(client.header("Authorization"), Some("Token custom"));

        client.set_basic_auth("alice", "secret");
        client.remove_header("authorization");
        assert_eq!(client.credential(), None);
        assert_eq!(client.header("Authorization"), None);
    }

    #[test]
    fn bearer_token_replaces_basic_auth() {
        let mut client = RestClient::new("https://example.com");
        client.set_basic_auth("alice", "secret");
        assert_eq!(client.header("Authorization"), Some("Basic alice%3Asecret"));

        client.set_bearer_token("tok");
        assert_eq!(client.header("Authorization"), Some("Bearer tok"));
        assert_eq!(
            client.credential(),
            Some(&Credential::Bearer("tok".to_owned()))
        );
        assert_eq!(client.headers().len(), 1);
    }

    #[test]
    fn clear_auth_removes_authorization_header() {
        let mut client = RestClient::new("https://example.com");
        client.set_bearer_token("tok");
        client.clear_auth();
        assert_eq!(client.header("Authorization"), None);
        assert_eq!(client.credential(), None);

        client.set_basic_auth("alice", "secret");
        client.clear_auth();
        assert_eq!(client.header("Authorization"), None);
    }

    #[test]
    fn get_wraps_successful_json_response() {
        let transport = RecordingTransport::replying(200, r#"{"id":1}"#);
        let client = RestClient::with_transport("https://api.example.com", &transport);

        let response = client.get("/x").expect("successful call");
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body(), r#"{"id":1}"#);
        assert_eq!(response.json(), &json!({ "id": 1 }));

        let sent = transport.last_request();
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.url, "https://api.example.com/x");
        assert_eq!(sent.body, None);
    }

    #[test]
    fn endpoint_is_appended_without_normalization() {
        let transport = RecordingTransport::replying(200, "[]");
        let client = RestClient::with_transport("https://api.example.com/", &transport);
        client.del("/items/3").expect("successful call");

        let sent = transport.last_request();
        assert_eq!(sent.method, Method::DELETE);
        assert_eq!(sent.url, "https://api.example.com//items/3");
    }

    #[test]
    fn error_status_maps_to_http_status_error() {
        let transport = RecordingTransport::replying(404, r#"{"detail":"missing"}"#);
        let client = RestClient::with_transport("https://api.example.com", &transport);

        let error = client.get("/x").expect_err("404 must fail");
        match error {
            ClientError::HttpStatus { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "HTTP error: 404");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn status_just_below_400_is_not_an_error() {
        let transport = RecordingTransport::replying(399, "{}");
        let client = RestClient::with_transport("https://api.example.com", &transport);
        let response = client.get("/x").expect("399 is below the error threshold");
        assert_eq!(response.status_code(), 399);
    }

    #[test]
    fn invalid_json_maps_to_parse_error() {
        let transport = RecordingTransport::replying(200, "not json");
        let client = RestClient::with_transport("https://api.example.com", &transport);
        let error = client.get("/x").expect_err("body is not json");
        assert!(matches!(error, ClientError::JsonParse(_)));
    }

    #[test]
    fn empty_success_body_maps_to_parse_error() {
        let transport = RecordingTransport::replying(204, "");
        let client = RestClient::with_transport("https://api.example.com", &transport);
        let error = client.del("/x").expect_err("empty body is not json");
        assert!(matches!(error, ClientError::JsonParse(_)));
    }

    #[test]
    fn transport_failure_propagates_as_network_error() {
        let transport = RecordingTransport::default();
        transport.push(Err(ClientError::Network("connection refused".to_owned())));
        let client = RestClient::with_transport("http://127.0.0.1:1", &transport);

        let error = client.get("/x").expect_err("transport failed");
        match error {
            ClientError::Network(message) => assert_eq!(message, "connection refused"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn post_sends_serialized_body_with_its_length() {
        let transport = RecordingTransport::replying(201, r#"{"ok":true}"#);
        let client = RestClient::with_transport("https://api.example.com", &transport);
        let body = json!({ "a": 1 });

        client.post("/items", &body).expect("successful call");

        let sent = transport.last_request();
        let expected = serde_json::to_vec(&body).expect("serializable");
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.content_length(), Some(expected.len()));
        assert_eq!(sent.body, Some(expected));
    }

    #[test]
    fn headers_are_read_fresh_on_every_call() {
        let transport = RecordingTransport::default();
        let mut client = RestClient::with_transport("https://api.example.com", &transport);

        client.add_header("Accept", "application/json");
        client.set_bearer_token("tok");
        transport.push(Ok(TransportResponse {
            status: 200,
            body: "{}".to_owned(),
        }));
        client
            .put("/items/1", &json!({ "name": "x" }))
            .expect("successful call");
        assert_eq!(
            transport.last_request().header_lines(),
            vec!["Accept: application/json", "Authorization: Bearer tok"]
        );

        client.clear_auth();
        transport.push(Ok(TransportResponse {
            status: 200,
            body: "{}".to_owned(),
        }));
        client.get("/items/1").expect("successful call");
        assert_eq!(
            transport.last_request().header_lines(),
            vec!["Accept: application/json"]
        );
    }
}

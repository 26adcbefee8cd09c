use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ClientError;

/// A completed HTTP exchange with a JSON body.
///
/// The body is parsed when the value is built, so a `Response` always holds
/// valid JSON. An empty body is a parse failure, not an implicit `null`.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    status_code: u16,
    body: String,
    json: Value,
}

impl Response {
    /// Builds a response from a status code and raw body text.
    ///
    /// Fails with [`ClientError::JsonParse`] when `body` is not valid JSON.
    pub fn new(status_code: u16, body: impl Into<String>) -> Result<Self, ClientError> {
        let body = body.into();
        let json = serde_json::from_str(&body)?;

        Ok(Self {
            status_code,
            body,
            json,
        })
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Raw response body as received.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parsed JSON body.
    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Consumes the response and returns the parsed JSON body.
    pub fn into_json(self) -> Value {
        self.json
    }

    /// Decodes the parsed JSON body into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(T::deserialize(&self.json)?)
    }
}

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Name of the header that carries the active credential.
pub const AUTHORIZATION: &str = "Authorization";

/// Everything except the RFC 3986 unreserved characters `A-Za-z0-9-._~`.
const CREDENTIAL_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// The single active authentication credential of a [`crate::RestClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    Basic { username: String, password: String },
    Bearer(String),
}

impl Credential {
    /// Renders the `Authorization` header value.
    ///
    /// Basic credentials are percent-encoded as `username:password` rather
    /// than base64-encoded, so `user:pa ss` renders as `Basic user%3Apa%20ss`.
    /// Servers implementing RFC 7617 will not accept this form.
    pub fn authorization_value(&self) -> String {
        match self {
            Self::Basic { username, password } => {
                let pair = format!("{username}:{password}");
                let encoded = utf8_percent_encode(&pair, CREDENTIAL_ESCAPE);
                format!("Basic {encoded}")
            }
            Self::Bearer(token) => format!("Bearer {token}"),
        }
    }
}

use crate::error::ClientError;
use serde::de::DeserializeOwned;
use sfetch_domain::{Header, PlainResponse};
use std::borrow::Cow;

/// A verified, decrypted response. Status and headers are the downstream handler's,
/// not the transport's (the transport always answers 200 on success).
#[derive(Debug, Clone)]
pub struct SecureResponse {
    status: u16,
    headers: Vec<Header>,
    body: Vec<u8>,
}

impl SecureResponse {
    /// `true` for a 2xx inner status.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|h| h.name.eq_ignore_ascii_case(name)).map(|h| h.value.as_str())
    }

    #[must_use]
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// Body as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// # Errors
    /// Returns [`ClientError::Decode`] if the body is not JSON of shape `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

impl From<PlainResponse> for SecureResponse {
    fn from(plain: PlainResponse) -> Self {
        Self { status: plain.status, headers: plain.headers, body: plain.body }
    }
}

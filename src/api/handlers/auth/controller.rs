//! Business-logic seam for the auth endpoints.
//!
//! The gateway only checks body shape. Everything else (persistence,
//! credential checks, session issuance) belongs to an [`AuthController`].
//! `login` and `me` also receive a [`ResponseChannel`] so they can stage
//! cookies or auxiliary headers on the outgoing response.

use async_trait::async_trait;
use axum::{
    http::{
        header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE, TRANSFER_ENCODING},
        HeaderMap, HeaderName, HeaderValue, StatusCode,
    },
    response::Response,
};
use serde_json::{Map, Value};
use thiserror::Error;

/// Validated request body handed to the controller.
pub type Body = Map<String, Value>;

pub type ControllerResult = Result<Value, ControllerError>;

/// Rejection returned by a controller operation.
///
/// `detail` is sent to the client untouched. `status` is a hint; the envelope
/// builder falls back to its default when it is absent or not an error code.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("controller rejected request: {detail}")]
pub struct ControllerError {
    pub status: Option<StatusCode>,
    pub detail: Value,
}

impl ControllerError {
    #[must_use]
    pub fn new(detail: Value) -> Self {
        Self {
            status: None,
            detail,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }
}

#[async_trait]
pub trait AuthController: Send + Sync {
    /// Create a new user.
    async fn register(&self, body: Body) -> ControllerResult;

    /// Confirm a user's identity and mark the account validated.
    async fn confirm_identity(&self, body: Body) -> ControllerResult;

    /// Authenticate a user; may stage a session cookie on `channel`.
    async fn login(&self, body: Body, channel: &mut ResponseChannel) -> ControllerResult;

    /// Look up the current user; may refresh cookies on `channel`.
    async fn me(&self, body: Body, channel: &mut ResponseChannel) -> ControllerResult;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("header {0} is reserved for the response envelope")]
    Reserved(HeaderName),
    #[error("invalid header name")]
    InvalidName,
    #[error("invalid header value")]
    InvalidValue,
}

/// Headers a controller wants on the response, applied after it settles.
#[derive(Debug, Default)]
pub struct ResponseChannel {
    headers: HeaderMap,
}

impl ResponseChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `Set-Cookie` header. Multiple cookies are kept.
    ///
    /// # Errors
    /// Returns an error if `cookie` is not a valid header value.
    pub fn set_cookie(&mut self, cookie: &str) -> Result<(), ChannelError> {
        let value = HeaderValue::from_str(cookie).map_err(|_| ChannelError::InvalidValue)?;
        self.headers.append(SET_COOKIE, value);
        Ok(())
    }

    /// Set an auxiliary header, replacing earlier values for the same name.
    ///
    /// # Errors
    /// Returns an error for invalid names/values or for the framing headers
    /// `content-type`, `content-length`, `transfer-encoding` and `connection`.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), ChannelError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| ChannelError::InvalidName)?;
        if is_framing_header(&name) {
            return Err(ChannelError::Reserved(name));
        }
        let value = HeaderValue::from_str(value).map_err(|_| ChannelError::InvalidValue)?;
        self.headers.insert(name, value);
        Ok(())
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Merge staged headers into the final response.
    pub(crate) fn apply(self, mut response: Response) -> Response {
        let target = response.headers_mut();
        let mut last_name: Option<HeaderName> = None;
        for (name, value) in self.headers {
            // `HeaderMap::into_iter` yields the name only for the first value of each key.
            if let Some(name) = name {
                if name != SET_COOKIE {
                    target.remove(&name);
                }
                last_name = Some(name);
            }
            if let Some(name) = &last_name {
                target.append(name.clone(), value);
            }
        }
        response
    }
}

/// Framing headers owned by the envelope response.
fn is_framing_header(name: &HeaderName) -> bool {
    [CONTENT_TYPE, CONTENT_LENGTH, TRANSFER_ENCODING, CONNECTION].contains(name)
}

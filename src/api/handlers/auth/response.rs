//! Uniform `{status, message, data}` response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use utoipa::ToSchema;

use super::{controller::ControllerError, vocabulary::Vocabulary};

#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Envelope {
    pub status: EnvelopeStatus,
    pub message: String,
    /// Controller payload, field lists, or a fixed descriptor.
    #[schema(value_type = Object)]
    pub data: Value,
}

impl Envelope {
    fn success(message: &str, data: Value) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: message.to_string(),
            data,
        }
    }

    fn error(message: &str, data: Value) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            message: message.to_string(),
            data,
        }
    }
}

/// The request carried no parsable JSON object.
pub fn send_body_error(vocabulary: &Vocabulary) -> Response {
    send_body_rejection(vocabulary, StatusCode::BAD_REQUEST)
}

/// The body could not be read at all (too large, aborted stream).
/// Same envelope as [`send_body_error`], with the extractor's status.
pub fn send_body_rejection(vocabulary: &Vocabulary, status: StatusCode) -> Response {
    let envelope = Envelope::error(
        &vocabulary.bad_request,
        Value::String(vocabulary.no_body.clone()),
    );
    (status, Json(envelope)).into_response()
}

/// The body's key set did not match the endpoint's field list.
pub fn send_fields_error(vocabulary: &Vocabulary, missing: &[String], extra: &[String]) -> Response {
    debug!(?missing, ?extra, "rejecting body with bad fields");
    let envelope = Envelope::error(
        &vocabulary.bad_fields,
        json!({ "missing": missing, "extra": extra }),
    );
    (StatusCode::BAD_REQUEST, Json(envelope)).into_response()
}

/// The controller resolved; `data` is passed through unmodified.
pub fn send_api_success_response(label: &str, data: Value) -> Response {
    (StatusCode::OK, Json(Envelope::success(label, data))).into_response()
}

/// The controller rejected; `detail` is passed through unmodified.
///
/// The controller's status is used only when it is a 4xx or 5xx code.
pub fn send_api_error_response(
    label: &str,
    error: ControllerError,
    default_status: StatusCode,
) -> Response {
    let status = error
        .status
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(default_status);
    (status, Json(Envelope::error(label, error.detail))).into_response()
}

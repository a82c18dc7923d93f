//! Auth endpoints: register, identity validation, login, and profile lookup.
//!
//! Flow Overview:
//! 1) Parse the body as a JSON object; anything else is a "no body" error.
//! 2) Compare its key set with the endpoint's [`FieldSpec`].
//! 3) Hand a well-shaped body to the [`AuthController`] and wait for it.
//! 4) Wrap the outcome in one envelope.
//!
//! Each handler returns a single `Response`, so one request can never emit
//! two envelopes.

pub mod controller;
pub mod fields;
pub mod response;
pub mod upstream;
pub mod vocabulary;


pub use self::controller::{
    AuthController, Body, ChannelError, ControllerError, ControllerResult, ResponseChannel,
};
pub use self::fields::{check_fields, AuthFields, FieldCheck, FieldSpec};
pub use self::response::{
    send_api_error_response, send_api_success_response, send_body_error, send_body_rejection,
    send_fields_error, Envelope, EnvelopeStatus,
};
pub use self::upstream::{UpstreamConfig, UpstreamController};
pub use self::vocabulary::{Vocabulary, VocabularyError};

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Extension},
    http::StatusCode,
    response::Response,
    routing::post,
    Router,
};
use serde_json::Value;
use std::{fmt, sync::Arc};
use tracing::{debug, info, instrument, warn};

const DEFAULT_ERROR_STATUS: StatusCode = StatusCode::BAD_REQUEST;

/// Largest request body the auth routes will buffer.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Everything the auth routes need, built once at startup and shared read-only.
#[derive(Clone)]
pub struct AuthState {
    fields: AuthFields,
    vocabulary: Vocabulary,
    controller: Arc<dyn AuthController>,
    default_error_status: StatusCode,
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("fields", &self.fields)
            .field("vocabulary", &self.vocabulary)
            .field("controller", &"dyn AuthController")
            .field("default_error_status", &self.default_error_status)
            .finish()
    }
}

impl AuthState {
    #[must_use]
    pub fn new(controller: Arc<dyn AuthController>) -> Self {
        Self {
            fields: AuthFields::new(),
            vocabulary: Vocabulary::default(),
            controller,
            default_error_status: DEFAULT_ERROR_STATUS,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: AuthFields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Status for controller rejections that carry no 4xx/5xx code.
    /// Non-error codes are ignored.
    #[must_use]
    pub fn with_default_error_status(mut self, status: StatusCode) -> Self {
        if status.is_client_error() || status.is_server_error() {
            self.default_error_status = status;
        } else {
            warn!("Ignoring non-error default status {status}");
        }
        self
    }

    #[must_use]
    pub fn fields(&self) -> &AuthFields {
        &self.fields
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    #[must_use]
    pub fn default_error_status(&self) -> StatusCode {
        self.default_error_status
    }
}

/// Dispatch table entry: which field list to check and which controller call to make.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Register,
    ConfirmIdentity,
    Login,
    Me,
}

impl Operation {
    #[must_use]
    pub fn fields(self, fields: &AuthFields) -> &FieldSpec {
        match self {
            Self::Register => fields.register(),
            Self::ConfirmIdentity => fields.id_validation(),
            Self::Login => fields.login(),
            Self::Me => fields.me(),
        }
    }

    async fn invoke(
        self,
        controller: &dyn AuthController,
        body: Body,
        channel: &mut ResponseChannel,
    ) -> ControllerResult {
        match self {
            Self::Register => controller.register(body).await,
            Self::ConfirmIdentity => controller.confirm_identity(body).await,
            Self::Login => controller.login(body, channel).await,
            Self::Me => controller.me(body, channel).await,
        }
    }
}

/// Only a JSON object counts as a body; empty, malformed, `null`, and
/// non-object payloads are all "no body".
#[must_use]
pub fn parse_body(bytes: &[u8]) -> Option<Body> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Run one request through shape validation and the controller.
#[instrument(skip(state, bytes))]
pub async fn dispatch(state: &AuthState, operation: Operation, bytes: &[u8]) -> Response {
    let Some(body) = parse_body(bytes) else {
        debug!("request has no parsable body");
        return send_body_error(&state.vocabulary);
    };

    let check = check_fields(operation.fields(&state.fields), &body);
    if !check.ok {
        return send_fields_error(&state.vocabulary, &check.missing, &check.extra);
    }

    let mut channel = ResponseChannel::new();
    let outcome = operation
        .invoke(state.controller.as_ref(), body, &mut channel)
        .await;

    let response = match outcome {
        Ok(data) => send_api_success_response(&state.vocabulary.request_success, data),
        Err(err) => {
            info!("controller rejected {operation:?}: {err}");
            send_api_error_response(
                &state.vocabulary.request_error,
                err,
                state.default_error_status,
            )
        }
    };

    channel.apply(response)
}

/// Unreadable bodies still get an envelope; readable ones go to [`dispatch`].
async fn respond(
    state: &AuthState,
    operation: Operation,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(bytes) => dispatch(state, operation, &bytes).await,
        Err(rejection) => {
            warn!("failed to read {operation:?} body: {rejection}");
            send_body_rejection(&state.vocabulary, rejection.status())
        }
    }
}

#[utoipa::path(
    post,
    path = "/register",
    request_body(content = serde_json::Value, description = "Exactly the configured register fields", content_type = "application/json"),
    responses(
        (status = 200, description = "User registered", body = Envelope),
        (status = 400, description = "Missing body, bad fields, or rejected by the controller", body = Envelope),
        (status = 413, description = "Body larger than the gateway accepts", body = Envelope),
        (status = "4XX", description = "Rejected by the controller with its own status", body = Envelope),
        (status = "5XX", description = "Controller or backend failure, 502 when the backend is unreachable", body = Envelope),
    ),
    tag = "auth"
)]
pub async fn register(
    state: Extension<Arc<AuthState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    respond(&state, Operation::Register, body).await
}

#[utoipa::path(
    post,
    path = "/user-validation",
    request_body(content = serde_json::Value, description = "Exactly the configured user-validation fields", content_type = "application/json"),
    responses(
        (status = 200, description = "Identity confirmed", body = Envelope),
        (status = 400, description = "Missing body, bad fields, or rejected by the controller", body = Envelope),
        (status = 413, description = "Body larger than the gateway accepts", body = Envelope),
        (status = "4XX", description = "Rejected by the controller with its own status", body = Envelope),
        (status = "5XX", description = "Controller or backend failure, 502 when the backend is unreachable", body = Envelope),
    ),
    tag = "auth"
)]
pub async fn user_validation(
    state: Extension<Arc<AuthState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    respond(&state, Operation::ConfirmIdentity, body).await
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = serde_json::Value, description = "Exactly the configured login fields", content_type = "application/json"),
    responses(
        (status = 200, description = "Logged in; the controller may set cookies", body = Envelope),
        (status = 400, description = "Missing body, bad fields, or rejected by the controller", body = Envelope),
        (status = 413, description = "Body larger than the gateway accepts", body = Envelope),
        (status = "4XX", description = "Rejected by the controller with its own status", body = Envelope),
        (status = "5XX", description = "Controller or backend failure, 502 when the backend is unreachable", body = Envelope),
    ),
    tag = "auth"
)]
pub async fn login(
    state: Extension<Arc<AuthState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    respond(&state, Operation::Login, body).await
}

#[utoipa::path(
    post,
    path = "/me",
    request_body(content = serde_json::Value, description = "Exactly the configured me fields", content_type = "application/json"),
    responses(
        (status = 200, description = "Current user profile", body = Envelope),
        (status = 400, description = "Missing body, bad fields, or rejected by the controller", body = Envelope),
        (status = 413, description = "Body larger than the gateway accepts", body = Envelope),
        (status = "4XX", description = "Rejected by the controller with its own status", body = Envelope),
        (status = "5XX", description = "Controller or backend failure, 502 when the backend is unreachable", body = Envelope),
    ),
    tag = "auth"
)]
pub async fn me(
    state: Extension<Arc<AuthState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    respond(&state, Operation::Me, body).await
}

/// Compose the four auth routes around `state`.
pub fn router(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/user-validation", post(user_validation))
        .route("/login", post(login))
        .route("/me", post(me))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(Extension(state))
}

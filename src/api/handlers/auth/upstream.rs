//! [`AuthController`] that forwards validated bodies to a backend service.
//!
//! Each operation becomes a JSON `POST` to `{base}/{path}`. The backend owns
//! users, credentials, and sessions; this controller only relays outcomes.

use async_trait::async_trait;
use reqwest::{header::SET_COOKIE, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use url::Url;

use super::controller::{AuthController, Body, ControllerError, ControllerResult, ResponseChannel};

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    base_url: Url,
    token: Option<SecretString>,
    timeout: Duration,
}

impl UpstreamConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[derive(Debug)]
pub struct UpstreamController {
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamController {
    /// Build the HTTP client for the backend.
    ///
    /// # Errors
    /// Returns an error if the client cannot be built.
    pub fn new(config: UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.as_str().trim_end_matches('/'))
    }

    #[instrument(skip(self, body, channel))]
    async fn forward(
        &self,
        path: &str,
        body: Body,
        channel: Option<&mut ResponseChannel>,
    ) -> ControllerResult {
        let url = self.endpoint(path);

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!("Upstream request to {url} failed: {err}");
                return Err(unavailable());
            }
        };

        let status = response.status();
        debug!("upstream responded {status}");

        if let Some(channel) = channel {
            for cookie in response.headers().get_all(SET_COOKIE) {
                let Ok(cookie) = cookie.to_str() else {
                    warn!("Dropping non-ASCII Set-Cookie from upstream");
                    continue;
                };
                if let Err(err) = channel.set_cookie(cookie) {
                    warn!("Dropping upstream Set-Cookie: {err}");
                }
            }
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                error!("Failed to read upstream body from {url}: {err}");
                return Err(unavailable());
            }
        };

        let payload = decode_payload(&bytes);

        if status.is_success() {
            Ok(payload)
        } else {
            Err(ControllerError::new(payload).with_status(status))
        }
    }
}

#[async_trait]
impl AuthController for UpstreamController {
    async fn register(&self, body: Body) -> ControllerResult {
        self.forward("register", body, None).await
    }

    async fn confirm_identity(&self, body: Body) -> ControllerResult {
        self.forward("user-validation", body, None).await
    }

    async fn login(&self, body: Body, channel: &mut ResponseChannel) -> ControllerResult {
        self.forward("login", body, Some(channel)).await
    }

    async fn me(&self, body: Body, channel: &mut ResponseChannel) -> ControllerResult {
        self.forward("me", body, Some(channel)).await
    }
}

fn unavailable() -> ControllerError {
    ControllerError::new(json!({ "reason": "upstream unavailable" }))
        .with_status(StatusCode::BAD_GATEWAY)
}

/// JSON bodies pass through as-is; anything else becomes a JSON string.
fn decode_payload(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, HeaderValue},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use tokio::net::TcpListener;

    async fn spawn_backend() -> Url {
        let app = Router::new()
            .route(
                "/register",
                post(|Json(body): Json<Value>| async move {
                    (StatusCode::CREATED, Json(json!({"created": body["email"]})))
                }),
            )
            .route(
                "/user-validation",
                post(|| async { (StatusCode::CONFLICT, "already validated") }),
            )
            .route(
                "/login",
                post(|headers: HeaderMap| async move {
                    let mut response_headers = HeaderMap::new();
                    response_headers.append(SET_COOKIE, HeaderValue::from_static("sid=s1; HttpOnly"));
                    response_headers.append(SET_COOKIE, HeaderValue::from_static("csrf=c1"));
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    (response_headers, Json(json!({"id": "u1", "auth": auth}))).into_response()
                }),
            )
            .route(
                "/me",
                post(|| async { (StatusCode::NOT_FOUND, Json(json!({"reason": "not found"}))) }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn body(value: Value) -> Body {
        match value {
            Value::Object(map) => map,
            _ => Body::new(),
        }
    }

    #[tokio::test]
    async fn register_resolves_with_backend_json() {
        let controller = UpstreamController::new(UpstreamConfig::new(spawn_backend().await)).unwrap();
        let result = controller.register(body(json!({"email": "a@b.c"}))).await;
        assert_eq!(result, Ok(json!({"created": "a@b.c"})));
    }

    #[tokio::test]
    async fn non_success_rejects_with_status_and_text() {
        let controller = UpstreamController::new(UpstreamConfig::new(spawn_backend().await)).unwrap();
        let result = controller.confirm_identity(body(json!({"_id": "u1"}))).await;
        assert_eq!(
            result,
            Err(ControllerError::new(json!("already validated")).with_status(StatusCode::CONFLICT))
        );
    }

    #[tokio::test]
    async fn login_relays_cookies_and_token() {
        let config = UpstreamConfig::new(spawn_backend().await)
            .with_token(SecretString::from("t0ken".to_string()));
        let controller = UpstreamController::new(config).unwrap();
        let mut channel = ResponseChannel::new();
        let result = controller
            .login(body(json!({"email": "a@b.c", "password": "p"})), &mut channel)
            .await;
        assert_eq!(result, Ok(json!({"id": "u1", "auth": "Bearer t0ken"})));
        let cookies: Vec<_> = channel
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(cookies, vec!["sid=s1; HttpOnly", "csrf=c1"]);
    }

    #[tokio::test]
    async fn me_rejection_keeps_json_detail() {
        let controller = UpstreamController::new(UpstreamConfig::new(spawn_backend().await)).unwrap();
        let mut channel = ResponseChannel::new();
        let result = controller.me(body(json!({"id": "u1"})), &mut channel).await;
        assert_eq!(
            result,
            Err(ControllerError::new(json!({"reason": "not found"}))
                .with_status(StatusCode::NOT_FOUND))
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_bad_gateway() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}")).unwrap();
        let controller = UpstreamController::new(
            UpstreamConfig::new(url).with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        let result = controller.register(body(json!({"email": "a@b.c"}))).await;
        assert_eq!(result, Err(unavailable()));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let url = Url::parse("http://backend.local/api/").unwrap();
        let controller = UpstreamController::new(UpstreamConfig::new(url)).unwrap();
        assert_eq!(controller.endpoint("login"), "http://backend.local/api/login");
    }

    #[test]
    fn decode_payload_variants() {
        assert_eq!(decode_payload(b""), Value::Null);
        assert_eq!(decode_payload(br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(decode_payload(b"plain"), json!("plain"));
    }
}

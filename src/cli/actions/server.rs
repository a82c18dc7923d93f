use crate::{
    api,
    api::handlers::auth::{AuthFields, AuthState, UpstreamConfig, UpstreamController, Vocabulary},
};
use anyhow::{Context, Result};
use axum::http::StatusCode;
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub mount_path: String,
    pub upstream_url: Url,
    pub upstream_token: Option<SecretString>,
    pub upstream_timeout_seconds: u64,
    pub fields: AuthFields,
    pub default_error_status: StatusCode,
    pub vocabulary: Vocabulary,
}

impl Args {
    /// Assemble the shared auth state from the parsed arguments.
    ///
    /// # Errors
    /// Returns an error if the upstream HTTP client cannot be built.
    pub fn auth_state(&self) -> Result<AuthState> {
        let mut upstream = UpstreamConfig::new(self.upstream_url.clone())
            .with_timeout(Duration::from_secs(self.upstream_timeout_seconds));
        if let Some(token) = &self.upstream_token {
            upstream = upstream.with_token(token.clone());
        }

        let controller =
            UpstreamController::new(upstream).context("Failed to build upstream client")?;

        Ok(AuthState::new(Arc::new(controller))
            .with_fields(self.fields.clone())
            .with_vocabulary(self.vocabulary.clone())
            .with_default_error_status(self.default_error_status))
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the upstream client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_state = args.auth_state()?;

    debug!("Auth state: {:?}", auth_state);
    info!(
        upstream = %args.upstream_url,
        mount_path = %args.mount_path,
        "starting authgate"
    );

    api::new(args.port, Arc::new(auth_state), &args.mount_path).await
}

//! # Authgate (registration and login gateway)
//!
//! `authgate` fronts four user-facing endpoints (`/register`, `/user-validation`,
//! `/login`, `/me`). It does not own users: it checks the *shape* of each JSON
//! body against a fixed list of field names, hands valid bodies to an
//! [`AuthController`](api::handlers::auth::AuthController), and wraps whatever
//! comes back in a uniform `{status, message, data}` envelope.
//!
//! ## Shape validation
//!
//! A body is accepted only when its key set equals the endpoint's field list
//! exactly. Missing and unrecognized keys are reported back to the caller so
//! the request can be corrected without guesswork. Values are never inspected.
//!
//! ## Controllers
//!
//! Business logic (persistence, credential checks, sessions) lives behind the
//! controller trait. The shipped binary uses
//! [`UpstreamController`](api::handlers::auth::UpstreamController), which
//! forwards validated bodies to a backend service over HTTP.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}

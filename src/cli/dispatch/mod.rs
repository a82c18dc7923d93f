//! Command-line argument dispatch.
//!
//! Maps validated CLI arguments to the action to run, currently only
//! starting the HTTP server with its full configuration.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{shape, upstream, ARG_MOUNT_PATH, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let mount_path = matches
        .get_one::<String>(ARG_MOUNT_PATH)
        .cloned()
        .unwrap_or_else(|| "/".to_string());

    let upstream_opts = upstream::Options::parse(matches)?;
    let shape_opts = shape::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        mount_path,
        upstream_url: upstream_opts.url,
        upstream_token: upstream_opts.token,
        upstream_timeout_seconds: upstream_opts.timeout_seconds,
        fields: shape_opts.fields,
        default_error_status: shape_opts.default_error_status,
        vocabulary: shape_opts.vocabulary,
    }))
}

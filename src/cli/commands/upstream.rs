use anyhow::{bail, Context};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_UPSTREAM_URL: &str = "upstream-url";
pub const ARG_UPSTREAM_TOKEN: &str = "upstream-token";
pub const ARG_UPSTREAM_TIMEOUT_SECONDS: &str = "upstream-timeout-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: Url,
    pub token: Option<SecretString>,
    pub timeout_seconds: u64,
}

impl Options {
    /// Parse upstream controller arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the URL is missing, malformed, or not http(s).
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let url = match matches.get_one::<String>(ARG_UPSTREAM_URL) {
            Some(value) if !value.trim().is_empty() => value.trim(),
            _ => bail!("missing required argument: --{ARG_UPSTREAM_URL}"),
        };

        let url = Url::parse(url).with_context(|| format!("invalid --{ARG_UPSTREAM_URL}: {url}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("--{ARG_UPSTREAM_URL} must use http or https: {url}");
        }

        // Empty env vars come through as "", treat them as unset.
        let token = matches
            .get_one::<String>(ARG_UPSTREAM_TOKEN)
            .filter(|v| !v.trim().is_empty())
            .map(|v| SecretString::from(v.clone()));

        let timeout_seconds = matches
            .get_one::<u64>(ARG_UPSTREAM_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(10);

        Ok(Self {
            url,
            token,
            timeout_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_UPSTREAM_URL)
                .long(ARG_UPSTREAM_URL)
                .help("Base URL of the controller backend")
                .long_help(
                    "Base URL of the controller backend.\n\nValidated bodies are forwarded as JSON POST to {url}/register, {url}/user-validation,\n{url}/login and {url}/me. The backend owns persistence, credentials and sessions.",
                )
                .env("AUTHGATE_UPSTREAM_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_UPSTREAM_TOKEN)
                .long(ARG_UPSTREAM_TOKEN)
                .help("Bearer token sent to the controller backend")
                .env("AUTHGATE_UPSTREAM_TOKEN")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_UPSTREAM_TIMEOUT_SECONDS)
                .long(ARG_UPSTREAM_TIMEOUT_SECONDS)
                .help("Timeout for each controller backend request in seconds")
                .env("AUTHGATE_UPSTREAM_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn command() -> Command {
        with_args(Command::new("test"))
    }

    #[test]
    fn parses_url_token_and_timeout() {
        let matches = command().get_matches_from(vec![
            "test",
            "--upstream-url",
            "http://backend.local:3000/api",
            "--upstream-token",
            "s3cret",
            "--upstream-timeout-seconds",
            "3",
        ]);
        let options = Options::parse(&matches);
        assert!(options.is_ok());
        if let Ok(options) = options {
            assert_eq!(options.url.as_str(), "http://backend.local:3000/api");
            assert_eq!(
                options.token.as_ref().map(|t| t.expose_secret().to_string()),
                Some("s3cret".to_string())
            );
            assert_eq!(options.timeout_seconds, 3);
        }
    }

    #[test]
    fn empty_token_env_is_unset() {
        temp_env::with_vars(
            [
                ("AUTHGATE_UPSTREAM_URL", Some("https://backend.local")),
                ("AUTHGATE_UPSTREAM_TOKEN", Some("")),
            ],
            || {
                let matches = command().get_matches_from(vec!["test"]);
                let options = Options::parse(&matches);
                assert!(options.is_ok_and(|o| o.token.is_none() && o.timeout_seconds == 10));
            },
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        let matches =
            command().get_matches_from(vec!["test", "--upstream-url", "ftp://backend.local"]);
        let result = Options::parse(&matches);
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(err.to_string().contains("must use http or https"));
        }
    }

    #[test]
    fn rejects_malformed_url() {
        let matches = command().get_matches_from(vec!["test", "--upstream-url", "not a url"]);
        assert!(Options::parse(&matches).is_err());
    }
}

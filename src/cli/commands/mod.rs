pub mod logging;
pub mod shape;
pub mod upstream;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_MOUNT_PATH: &str = "mount-path";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("authgate")
        .about("Registration and login gateway")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("AUTHGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_MOUNT_PATH)
                .long(ARG_MOUNT_PATH)
                .help("Path prefix for the auth routes, e.g. /auth")
                .default_value("/")
                .env("AUTHGATE_MOUNT_PATH"),
        );

    let command = upstream::with_args(command);
    let command = shape::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "authgate");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Registration and login gateway".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_and_upstream() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "authgate",
            "--port",
            "9090",
            "--upstream-url",
            "http://backend.local:3000",
            "--mount-path",
            "/auth",
        ]);

        assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
        assert_eq!(
            matches.get_one::<String>(upstream::ARG_UPSTREAM_URL).cloned(),
            Some("http://backend.local:3000".to_string())
        );
        assert_eq!(
            matches.get_one::<String>(ARG_MOUNT_PATH).cloned(),
            Some("/auth".to_string())
        );
    }

    #[test]
    fn test_upstream_url_required() {
        temp_env::with_vars([("AUTHGATE_UPSTREAM_URL", None::<&str>)], || {
            let result = new().try_get_matches_from(vec!["authgate"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("AUTHGATE_UPSTREAM_URL", Some("https://backend.local")),
                ("AUTHGATE_PORT", Some("443")),
                ("AUTHGATE_MOUNT_PATH", Some("/api/auth")),
                ("AUTHGATE_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["authgate"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(ARG_MOUNT_PATH).cloned(),
                    Some("/api/auth".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("AUTHGATE_LOG_LEVEL", Some(level)),
                    ("AUTHGATE_UPSTREAM_URL", Some("http://backend.local")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["authgate"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("AUTHGATE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "authgate".to_string(),
                    "--upstream-url".to_string(),
                    "http://backend.local".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}

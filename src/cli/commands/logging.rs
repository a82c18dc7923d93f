use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted by `AUTHGATE_LOG_LEVEL`, indexed by `-v` count.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept a level name or its `-v` count, case-insensitively.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> Result<u8, String> {
        let level = level.trim().to_ascii_lowercase();
        if let Ok(count) = level.parse::<u8>() {
            if usize::from(count) < LEVEL_NAMES.len() {
                return Ok(count);
            }
        }
        LEVEL_NAMES
            .iter()
            .position(|name| *name == level)
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("expected one of {} or 0-4", LEVEL_NAMES.join(", ")))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log more: -v warn, -vv info (request spans), -vvv debug (shape rejections), -vvvv trace")
            .long_help(
                "Log more: -v warn, -vv info (request spans), -vvv debug (shape rejections), -vvvv trace.\n\nAUTHGATE_LOG_LEVEL takes a level name instead. RUST_LOG directives still apply on top.",
            )
            .env("AUTHGATE_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

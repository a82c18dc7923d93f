use anyhow::{bail, Context};
use axum::http::StatusCode;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::api::handlers::auth::{AuthFields, FieldSpec, Vocabulary};

pub const ARG_REGISTER_FIELDS: &str = "register-fields";
pub const ARG_USER_VALIDATION_FIELDS: &str = "user-validation-fields";
pub const ARG_LOGIN_FIELDS: &str = "login-fields";
pub const ARG_ME_FIELDS: &str = "me-fields";
pub const ARG_DEFAULT_ERROR_STATUS: &str = "default-error-status";
pub const ARG_VOCABULARY: &str = "vocabulary";

#[derive(Debug, Clone)]
pub struct Options {
    pub fields: AuthFields,
    pub default_error_status: StatusCode,
    pub vocabulary: Vocabulary,
}

impl Options {
    /// Parse field lists, error status, and vocabulary overrides.
    ///
    /// # Errors
    /// Returns an error if a field list is empty, the status is not 4xx/5xx,
    /// or the vocabulary file cannot be loaded.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let fields = AuthFields::new()
            .with_register(spec(matches, ARG_REGISTER_FIELDS)?)
            .with_id_validation(spec(matches, ARG_USER_VALIDATION_FIELDS)?)
            .with_login(spec(matches, ARG_LOGIN_FIELDS)?)
            .with_me(spec(matches, ARG_ME_FIELDS)?);

        let code = matches
            .get_one::<u16>(ARG_DEFAULT_ERROR_STATUS)
            .copied()
            .unwrap_or(400);
        let default_error_status = StatusCode::from_u16(code)
            .with_context(|| format!("invalid --{ARG_DEFAULT_ERROR_STATUS}: {code}"))?;
        if !(default_error_status.is_client_error() || default_error_status.is_server_error()) {
            bail!("--{ARG_DEFAULT_ERROR_STATUS} must be a 4xx or 5xx code, got {code}");
        }

        let vocabulary = match matches
            .get_one::<String>(ARG_VOCABULARY)
            .filter(|v| !v.trim().is_empty())
        {
            Some(path) => Vocabulary::from_file(path)
                .with_context(|| format!("Failed to load vocabulary: {path}"))?,
            None => Vocabulary::default(),
        };

        Ok(Self {
            fields,
            default_error_status,
            vocabulary,
        })
    }
}

fn spec(matches: &ArgMatches, id: &str) -> anyhow::Result<FieldSpec> {
    let names = matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect::<Vec<_>>())
        .unwrap_or_default();

    let spec = FieldSpec::new(names);
    if spec.is_empty() {
        bail!("--{id} must name at least one field");
    }
    Ok(spec)
}

fn field_list(id: &'static str, env: &'static str, help: &'static str, default: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .help(help)
        .env(env)
        .value_delimiter(',')
        .action(ArgAction::Set)
        .default_value(default)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(field_list(
            ARG_REGISTER_FIELDS,
            "AUTHGATE_REGISTER_FIELDS",
            "Comma-separated body fields required by POST /register",
            "email",
        ))
        .arg(field_list(
            ARG_USER_VALIDATION_FIELDS,
            "AUTHGATE_USER_VALIDATION_FIELDS",
            "Comma-separated body fields required by POST /user-validation",
            "_id,password",
        ))
        .arg(field_list(
            ARG_LOGIN_FIELDS,
            "AUTHGATE_LOGIN_FIELDS",
            "Comma-separated body fields required by POST /login",
            "email,password",
        ))
        .arg(field_list(
            ARG_ME_FIELDS,
            "AUTHGATE_ME_FIELDS",
            "Comma-separated body fields required by POST /me",
            "id",
        ))
        .arg(
            Arg::new(ARG_DEFAULT_ERROR_STATUS)
                .long(ARG_DEFAULT_ERROR_STATUS)
                .help("HTTP status for controller rejections that carry none")
                .env("AUTHGATE_DEFAULT_ERROR_STATUS")
                .default_value("400")
                .value_parser(clap::value_parser!(u16).range(400..600)),
        )
        .arg(
            Arg::new(ARG_VOCABULARY)
                .long(ARG_VOCABULARY)
                .help("Path to a JSON file overriding envelope messages")
                .long_help(
                    "Path to a JSON file overriding envelope messages.\n\nRecognized keys: bad_request, no_body, bad_fields, request_success, request_error.\nOmitted keys keep their defaults.",
                )
                .env("AUTHGATE_VOCABULARY"),
        )
}

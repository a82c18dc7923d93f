//! Body shape validation.
//!
//! Every auth endpoint declares the exact set of top-level keys its JSON body
//! must carry. [`check_fields`] compares a parsed body against that set and
//! reports what is missing and what is unrecognized. Values are never
//! inspected: a key present with `null` or `""` still counts as present.

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Ordered, duplicate-free list of field names required by one endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSpec {
    names: Vec<String>,
}

impl FieldSpec {
    /// Build a spec, trimming names and dropping blanks and repeats.
    /// First-seen order is kept; it is the order `missing` is reported in.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut spec = Self::default();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || spec.contains(name) {
                continue;
            }
            spec.names.push(name.to_string());
        }
        spec
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Outcome of comparing a body against a [`FieldSpec`].
#[derive(ToSchema, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FieldCheck {
    /// Required names absent from the body, in spec order.
    pub missing: Vec<String>,
    /// Body keys the spec does not know, in body order.
    pub extra: Vec<String>,
    #[serde(skip)]
    pub ok: bool,
}

/// Compare `body`'s key set with `spec`.
///
/// `ok` is true only when the key set equals the spec exactly.
#[must_use]
pub fn check_fields(spec: &FieldSpec, body: &Map<String, Value>) -> FieldCheck {
    let missing: Vec<String> = spec
        .iter()
        .filter(|name| !body.contains_key(*name))
        .map(str::to_string)
        .collect();

    let extra: Vec<String> = body
        .keys()
        .filter(|key| !spec.contains(key))
        .cloned()
        .collect();

    let ok = missing.is_empty() && extra.is_empty();

    FieldCheck { missing, extra, ok }
}

/// The four endpoint specs, fixed at startup and shared read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthFields {
    register: FieldSpec,
    id_validation: FieldSpec,
    login: FieldSpec,
    me: FieldSpec,
}

impl Default for AuthFields {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthFields {
    /// Defaults: register `email`, user-validation `_id,password`,
    /// login `email,password`, me `id`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            register: FieldSpec::new(["email"]),
            id_validation: FieldSpec::new(["_id", "password"]),
            login: FieldSpec::new(["email", "password"]),
            me: FieldSpec::new(["id"]),
        }
    }

    #[must_use]
    pub fn with_register(mut self, spec: FieldSpec) -> Self {
        self.register = spec;
        self
    }

    #[must_use]
    pub fn with_id_validation(mut self, spec: FieldSpec) -> Self {
        self.id_validation = spec;
        self
    }

    #[must_use]
    pub fn with_login(mut self, spec: FieldSpec) -> Self {
        self.login = spec;
        self
    }

    #[must_use]
    pub fn with_me(mut self, spec: FieldSpec) -> Self {
        self.me = spec;
        self
    }

    #[must_use]
    pub fn register(&self) -> &FieldSpec {
        &self.register
    }

    #[must_use]
    pub fn id_validation(&self) -> &FieldSpec {
        &self.id_validation
    }

    #[must_use]
    pub fn login(&self) -> &FieldSpec {
        &self.login
    }

    #[must_use]
    pub fn me(&self) -> &FieldSpec {
        &self.me
    }
}

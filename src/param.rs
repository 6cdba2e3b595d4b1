//! Shared parameter, query-key, and type-filter definitions.

use std::fmt;

/// A single parameter as returned by the store.
///
/// Records are transient: one fetch produces them and assembly consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Absolute slash-delimited name, always beginning with `/`.
    pub name: String,
    /// Stored string content (plaintext when decryption was requested).
    pub value: String,
    pub kind: ParameterKind,
}

/// The closed set of value kinds the tool handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Plain `String` parameter.
    Plain,
    /// `SecureString` parameter, decrypted on read when requested.
    Secret,
}

impl ParameterKind {
    /// The store's own name for the kind, used in type filters and responses.
    pub fn wire_name(self) -> &'static str {
        match self {
            ParameterKind::Plain => "String",
            ParameterKind::Secret => "SecureString",
        }
    }
}

/// Normalized absolute path prefix under which parameters are requested.
///
/// Always begins with `/` and never carries a trailing `/` except when it
/// denotes the root itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryKey(String);

impl QueryKey {
    /// Normalize raw user input into a query key.
    ///
    /// Surrounding slashes are trimmed and a single leading `/` restored, so
    /// `""`, `/`, `app/` and `/app` normalize to `/`, `/`, `/app` and `/app`.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim_end_matches('/').trim_start_matches('/');
        QueryKey(format!("/{trimmed}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty set of parameter kinds to request from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFilter {
    kinds: Vec<ParameterKind>,
}

impl TypeFilter {
    /// Both kinds; the default when the caller does not narrow the query.
    pub fn all() -> Self {
        TypeFilter {
            kinds: vec![ParameterKind::Plain, ParameterKind::Secret],
        }
    }

    pub fn only(kind: ParameterKind) -> Self {
        TypeFilter { kinds: vec![kind] }
    }

    pub fn kinds(&self) -> &[ParameterKind] {
        &self.kinds
    }

    /// Decryption-on-read is requested iff the filter includes secrets.
    ///
    /// Requesting decryption has a permission cost, so a plain-only filter
    /// must leave it disabled.
    pub fn wants_decryption(&self) -> bool {
        self.kinds.contains(&ParameterKind::Secret)
    }
}

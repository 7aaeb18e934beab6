//! Provenance of accepted relations

use std::fmt;

/// Label recorded on a relation when it is accepted
///
/// Set exactly once, when the relation enters a relation set, and never
/// changed afterwards. Serialized as a plain string: the sieve identifier, or
/// `"closure"` for relations inferred by transitive closure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Origin {
    /// Proposed by the sieve with this identifier
    Sieve(String),

    /// Inferred by the closure oracle
    Closure,
}

impl Origin {
    /// The reserved label used for closure-inferred relations
    pub const CLOSURE_LABEL: &'static str = "closure";

    /// Origin for a named sieve
    pub fn sieve(name: impl Into<String>) -> Self {
        Origin::Sieve(name.into())
    }

    /// Get the origin label as a string
    pub fn as_str(&self) -> &str {
        match self {
            Origin::Sieve(name) => name,
            Origin::Closure => Self::CLOSURE_LABEL,
        }
    }

    /// Whether this relation came from closure inference
    pub fn is_closure(&self) -> bool {
        matches!(self, Origin::Closure)
    }
}

impl From<String> for Origin {
    fn from(label: String) -> Self {
        if label == Self::CLOSURE_LABEL {
            Origin::Closure
        } else {
            Origin::Sieve(label)
        }
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::Sieve(name) => name,
            Origin::Closure => Origin::CLOSURE_LABEL.to_string(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

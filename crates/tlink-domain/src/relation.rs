//! Relation module - typed temporal links between two entities

use crate::{EntityPairKey, Origin};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of temporal relation between two entities
///
/// The engine only compares kinds for equality; the meaning of each kind is
/// owned by the sieves and the closure rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    /// First entity strictly precedes the second
    Before,
    /// First entity strictly follows the second
    After,
    /// First entity immediately precedes the second
    Ibefore,
    /// First entity immediately follows the second
    Iafter,
    /// First entity temporally contains the second
    Includes,
    /// First entity is contained by the second
    IsIncluded,
    /// First entity starts the second
    Begins,
    /// First entity is started by the second
    BegunBy,
    /// First entity ends the second
    Ends,
    /// First entity is ended by the second
    EndedBy,
    /// Both entities hold over the same interval
    Simultaneous,
    /// The entities overlap in some unspecified way
    Overlap,
    /// The relation could not be determined
    Vague,
    /// Explicitly no relation
    None,
}

impl RelationKind {
    /// Get the TimeML name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Before => "BEFORE",
            RelationKind::After => "AFTER",
            RelationKind::Ibefore => "IBEFORE",
            RelationKind::Iafter => "IAFTER",
            RelationKind::Includes => "INCLUDES",
            RelationKind::IsIncluded => "IS_INCLUDED",
            RelationKind::Begins => "BEGINS",
            RelationKind::BegunBy => "BEGUN_BY",
            RelationKind::Ends => "ENDS",
            RelationKind::EndedBy => "ENDED_BY",
            RelationKind::Simultaneous => "SIMULTANEOUS",
            RelationKind::Overlap => "OVERLAP",
            RelationKind::Vague => "VAGUE",
            RelationKind::None => "NONE",
        }
    }

    /// Parse a kind from its TimeML name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BEFORE" => Some(RelationKind::Before),
            "AFTER" => Some(RelationKind::After),
            "IBEFORE" => Some(RelationKind::Ibefore),
            "IAFTER" => Some(RelationKind::Iafter),
            "INCLUDES" => Some(RelationKind::Includes),
            "IS_INCLUDED" => Some(RelationKind::IsIncluded),
            "BEGINS" => Some(RelationKind::Begins),
            "BEGUN_BY" => Some(RelationKind::BegunBy),
            "ENDS" => Some(RelationKind::Ends),
            "ENDED_BY" => Some(RelationKind::EndedBy),
            "SIMULTANEOUS" => Some(RelationKind::Simultaneous),
            "OVERLAP" => Some(RelationKind::Overlap),
            "VAGUE" => Some(RelationKind::Vague),
            "NONE" => Some(RelationKind::None),
            _ => None,
        }
    }

    /// The kind that holds when the endpoints are swapped
    pub fn inverse(&self) -> Self {
        match self {
            RelationKind::Before => RelationKind::After,
            RelationKind::After => RelationKind::Before,
            RelationKind::Ibefore => RelationKind::Iafter,
            RelationKind::Iafter => RelationKind::Ibefore,
            RelationKind::Includes => RelationKind::IsIncluded,
            RelationKind::IsIncluded => RelationKind::Includes,
            RelationKind::Begins => RelationKind::BegunBy,
            RelationKind::BegunBy => RelationKind::Begins,
            RelationKind::Ends => RelationKind::EndedBy,
            RelationKind::EndedBy => RelationKind::Ends,
            symmetric => *symmetric,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A temporal link between two entities of one document
///
/// Endpoints are opaque identifiers (event instance ids or timex ids). A
/// relation with an empty endpoint is invalid and is never accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// First endpoint
    pub id1: String,

    /// Second endpoint
    pub id2: String,

    /// Type of relation from `id1` to `id2`
    pub kind: RelationKind,

    /// Which sieve (or closure) caused the relation to be accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

impl Relation {
    /// Create a new candidate relation (no origin yet)
    pub fn new(id1: impl Into<String>, id2: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            id1: id1.into(),
            id2: id2.into(),
            kind,
            origin: None,
        }
    }

    /// Set the origin
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Both endpoints are present
    pub fn is_valid(&self) -> bool {
        !self.id1.is_empty() && !self.id2.is_empty()
    }

    /// Unordered key for this relation's endpoints, `None` if invalid
    pub fn pair_key(&self) -> Option<EntityPairKey> {
        EntityPairKey::new(&self.id1, &self.id2)
    }

    /// Whether `other` links the same two entities, in either direction
    pub fn covers_same_pair(&self, other: &Relation) -> bool {
        (self.id1 == other.id1 && self.id2 == other.id2)
            || (self.id1 == other.id2 && self.id2 == other.id1)
    }

    /// The same link seen from the other endpoint
    pub fn inverted(&self) -> Relation {
        Relation {
            id1: self.id2.clone(),
            id2: self.id1.clone(),
            kind: self.kind.inverse(),
            origin: self.origin.clone(),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.kind, self.id1, self.id2)?;
        if let Some(origin) = &self.origin {
            write!(f, " [{}]", origin)?;
        }
        Ok(())
    }
}

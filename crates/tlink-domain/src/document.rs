//! Documents and the entities sieves reason about

use crate::Relation;
use serde::{Deserialize, Serialize};

/// Kind of entity a relation endpoint refers to
///
/// The merge core never looks at this; it exists for sieves and for
/// human-readable diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// An event instance
    Event,
    /// A time expression
    Timex,
}

/// Grammatical attributes of an event mention
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventAttributes {
    /// Tense (e.g. PAST, PRESENT)
    pub tense: String,
    /// Aspect (e.g. PERFECTIVE, NONE)
    pub aspect: String,
    /// Event class (e.g. OCCURRENCE, REPORTING)
    pub class: String,
}

/// An event or time expression within a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier used as a relation endpoint
    pub id: String,

    /// Event or timex
    pub kind: EntityKind,

    /// Surface text of the mention
    pub text: String,

    /// Index of the sentence containing the mention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence: Option<usize>,

    /// Normalized value (timexes only, e.g. `2013-05-02`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Tense/aspect/class (events only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<EventAttributes>,
}

impl Entity {
    /// Create an event mention
    pub fn event(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: EntityKind::Event,
            text: text.into(),
            sentence: None,
            value: None,
            attributes: None,
        }
    }

    /// Create a time expression
    pub fn timex(id: impl Into<String>, text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: EntityKind::Timex,
            text: text.into(),
            sentence: None,
            value: Some(value.into()),
            attributes: None,
        }
    }

    /// Set the containing sentence
    pub fn in_sentence(mut self, sentence: usize) -> Self {
        self.sentence = Some(sentence);
        self
    }

    /// Attach tense/aspect/class
    pub fn with_attributes(mut self, attributes: EventAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Whether this entity is a time expression
    pub fn is_timex(&self) -> bool {
        self.kind == EntityKind::Timex
    }
}

/// A document as seen by the sieve pipeline
///
/// Supplies the entity context sieves need, and receives the accepted relation
/// sequence once all sieves have run. Attaching replaces every relation the
/// document held before.
pub trait Document {
    /// Document name, used to identify it in logs and errors
    fn name(&self) -> &str;

    /// Entities in document order
    fn entities(&self) -> &[Entity];

    /// Look up an entity by identifier
    fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities().iter().find(|e| e.id == id)
    }

    /// Text of a sentence, if the document keeps it
    fn sentence(&self, _index: usize) -> Option<&str> {
        None
    }

    /// Relations currently attached to the document
    fn relations(&self) -> &[Relation];

    /// Remove all attached relations
    fn clear_relations(&mut self);

    /// Replace the attached relations with `relations`
    fn attach_relations(&mut self, relations: Vec<Relation>);
}

/// In-memory document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SieveDocument {
    /// Document name
    pub name: String,

    /// Sentence texts, indexed by `Entity::sentence`
    #[serde(default)]
    pub sentences: Vec<String>,

    /// Events and timexes in document order
    #[serde(default)]
    pub entities: Vec<Entity>,

    /// Attached relations
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl SieveDocument {
    /// Create an empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a sentence
    pub fn with_sentence(mut self, text: impl Into<String>) -> Self {
        self.sentences.push(text.into());
        self
    }

    /// Append an entity
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }
}

impl Document for SieveDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn sentence(&self, index: usize) -> Option<&str> {
        self.sentences.get(index).map(String::as_str)
    }

    fn relations(&self) -> &[Relation] {
        &self.relations
    }

    fn clear_relations(&mut self) {
        self.relations.clear();
    }

    fn attach_relations(&mut self, relations: Vec<Relation>) {
        self.relations = relations;
    }
}

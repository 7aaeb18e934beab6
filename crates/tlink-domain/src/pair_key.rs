//! Entity pair key - the unit of consistency for accepted relations

use std::fmt;

/// Canonical, order-independent key for a pair of entity identifiers
///
/// The two identifiers are stored sorted, so `key(a, b) == key(b, a)` and two
/// keys are equal only when both endpoints are equal. Storing the endpoints
/// separately (rather than concatenating them) means `("ab", "c")` and
/// `("a", "bc")` never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityPairKey {
    low: String,
    high: String,
}

impl EntityPairKey {
    /// Build the key for an unordered pair
    ///
    /// Returns `None` when either identifier is empty; such a pair can never
    /// belong to an accepted relation.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlink_domain::EntityPairKey;
    ///
    /// let forward = EntityPairKey::new("e1", "t3").unwrap();
    /// let backward = EntityPairKey::new("t3", "e1").unwrap();
    /// assert_eq!(forward, backward);
    ///
    /// assert!(EntityPairKey::new("e1", "").is_none());
    /// ```
    pub fn new(a: &str, b: &str) -> Option<Self> {
        if a.is_empty() || b.is_empty() {
            return None;
        }

        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Some(Self {
            low: low.to_string(),
            high: high.to_string(),
        })
    }

    /// The lexicographically smaller endpoint
    pub fn low(&self) -> &str {
        &self.low
    }

    /// The lexicographically larger endpoint
    pub fn high(&self) -> &str {
        &self.high
    }

    /// Whether `id` is one of the two endpoints
    pub fn contains(&self, id: &str) -> bool {
        self.low == id || self.high == id
    }
}

impl fmt::Display for EntityPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.low, self.high)
    }
}

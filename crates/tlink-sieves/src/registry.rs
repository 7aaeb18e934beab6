//! Static registry mapping sieve identifiers to factories

use crate::PipelineError;
use std::collections::BTreeMap;
use std::fmt;
use tlink_domain::{Sieve, SieveFault};

/// Builds a fresh sieve instance
pub type SieveFactory = Box<dyn Fn() -> Result<Box<dyn Sieve>, SieveFault> + Send + Sync>;

/// A sieve instance together with the identifier it was configured under
pub struct NamedSieve {
    name: String,
    sieve: Box<dyn Sieve>,
}

impl NamedSieve {
    /// Wrap a sieve under `name`
    pub fn new(name: impl Into<String>, sieve: impl Sieve + 'static) -> Self {
        Self::boxed(name, Box::new(sieve))
    }

    /// Wrap an already boxed sieve
    pub fn boxed(name: impl Into<String>, sieve: Box<dyn Sieve>) -> Self {
        Self {
            name: name.into(),
            sieve,
        }
    }

    /// The configured identifier (used as origin label)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sieve itself
    pub fn sieve(&self) -> &dyn Sieve {
        self.sieve.as_ref()
    }
}

impl fmt::Debug for NamedSieve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedSieve").field("name", &self.name).finish()
    }
}

/// Registry of available sieves
///
/// Sieve identifiers from configuration are resolved here once, when the
/// pipeline is built, rather than per document.
///
/// # Examples
///
/// ```
/// use tlink_domain::{sieve_fn, Document, Relation};
/// use tlink_sieves::SieveRegistry;
///
/// let mut registry = SieveRegistry::new();
/// registry.register("Nothing", || {
///     Ok(sieve_fn(|_doc: &dyn Document, _accepted: &[Relation]| Ok(Vec::new())))
/// });
///
/// let sieves = registry.instantiate(&["Nothing".to_string()]).unwrap();
/// assert_eq!(sieves[0].name(), "Nothing");
/// assert!(registry.instantiate(&["Missing".to_string()]).is_err());
/// ```
#[derive(Default)]
pub struct SieveRegistry {
    factories: BTreeMap<String, SieveFactory>,
}

impl SieveRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<F, S>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<S, SieveFault> + Send + Sync + 'static,
        S: Sieve + 'static,
    {
        let factory: SieveFactory =
            Box::new(move || factory().map(|sieve| Box::new(sieve) as Box<dyn Sieve>));
        self.factories.insert(name.into(), factory);
        self
    }

    /// Whether a sieve is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered identifiers, sorted
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build one sieve per identifier, in the given order
    ///
    /// Every identifier must be registered; the first unknown one is an error.
    pub fn instantiate(&self, names: &[String]) -> Result<Vec<NamedSieve>, PipelineError> {
        names
            .iter()
            .map(|name| {
                let factory = self
                    .factories
                    .get(name)
                    .ok_or_else(|| PipelineError::UnknownSieve(name.clone()))?;

                let sieve = factory().map_err(|source| PipelineError::SieveInit {
                    sieve: name.clone(),
                    source,
                })?;

                tracing::debug!("Added sieve: {}", name);
                Ok(NamedSieve::boxed(name.clone(), sieve))
            })
            .collect()
    }
}

impl fmt::Debug for SieveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SieveRegistry")
            .field("names", &self.names())
            .finish()
    }
}

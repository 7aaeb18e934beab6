//! Configuration for the sieve pipeline
//!
//! Defines the ordered sieve list and whether closure runs after each sieve.

use crate::PipelineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tlink_domain::Origin;

/// Configuration for a sieve pipeline run
///
/// # Examples
///
/// ```
/// use tlink_sieves::PipelineConfig;
///
/// let config = PipelineConfig::from_toml(r#"
///     sieves = ["TimeTimeSieve", "AdjacentVerbTimex"]
///     closure = true
/// "#).unwrap();
///
/// assert_eq!(config.sieves.len(), 2);
/// assert!(config.closure);
/// assert!(!config.debug);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sieve identifiers, in the order they run
    #[serde(default)]
    pub sieves: Vec<String>,

    /// Sieve-list file, read when `sieves` is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sieve_list: Option<PathBuf>,

    /// Run closure expansion after each sieve that added relations
    /// Default: true
    #[serde(default = "default_closure")]
    pub closure: bool,

    /// Log per-sieve counts and conflict rejections
    /// Default: false
    #[serde(default)]
    pub debug: bool,

    /// Documents processed at once by the batch worker
    /// Default: 4
    #[serde(default = "default_max_concurrent_documents")]
    pub max_concurrent_documents: usize,
}

fn default_closure() -> bool {
    true
}

fn default_max_concurrent_documents() -> usize {
    4
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sieves: Vec::new(),
            sieve_list: None,
            closure: default_closure(),
            debug: false,
            max_concurrent_documents: default_max_concurrent_documents(),
        }
    }
}

impl PipelineConfig {
    /// Configuration running `sieves` in order, with closure enabled
    pub fn with_sieves<I, S>(sieves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sieves: sieves.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Disable closure expansion
    pub fn without_closure(mut self) -> Self {
        self.closure = false;
        self
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        toml::from_str(toml_str)
            .map_err(|e| PipelineError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    ///
    /// A relative `sieve_list` path is resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml(&contents)?;
        if let (Some(list), Some(dir)) = (config.sieve_list.as_mut(), path.parent()) {
            if list.is_relative() {
                *list = dir.join(&*list);
            }
        }
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_concurrent_documents == 0 {
            return Err(PipelineError::Config(
                "max_concurrent_documents must be greater than 0".to_string(),
            ));
        }
        if self.sieves.is_empty() && self.sieve_list.is_none() {
            return Err(PipelineError::Config(
                "either sieves or sieve_list must be set".to_string(),
            ));
        }
        for name in &self.sieves {
            check_sieve_name(name)?;
        }
        Ok(())
    }

    /// The ordered sieve identifiers to run
    ///
    /// Uses `sieves` when non-empty, otherwise reads `sieve_list`.
    pub fn resolved_sieves(&self) -> Result<Vec<String>, PipelineError> {
        let names = match (&self.sieves, &self.sieve_list) {
            (sieves, _) if !sieves.is_empty() => sieves.clone(),
            (_, Some(path)) => load_sieve_list(path)?,
            _ => {
                return Err(PipelineError::Config(
                    "either sieves or sieve_list must be set".to_string(),
                ))
            }
        };

        for name in &names {
            check_sieve_name(name)?;
        }
        Ok(names)
    }
}

pub(crate) fn check_sieve_name(name: &str) -> Result<(), PipelineError> {
    if name.trim().is_empty() {
        return Err(PipelineError::Config("sieve identifier must not be empty".to_string()));
    }
    if name == Origin::CLOSURE_LABEL {
        return Err(PipelineError::Config(format!(
            "'{}' is reserved for closure-inferred relations",
            Origin::CLOSURE_LABEL
        )));
    }
    Ok(())
}

/// Parse a sieve-list file
///
/// One identifier per line. Blank lines and `//` comment lines are skipped,
/// and trailing `// ...` comments are stripped.
///
/// # Examples
///
/// ```
/// use tlink_sieves::parse_sieve_list;
///
/// let names = parse_sieve_list("
///     // deterministic sieves first
///     TimeTimeSieve
///     AdjacentVerbTimex   // same sentence only
/// ");
///
/// assert_eq!(names, vec!["TimeTimeSieve", "AdjacentVerbTimex"]);
/// ```
pub fn parse_sieve_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let line = match line.find("//") {
                Some(pos) => &line[..pos],
                None => line,
            };
            let name = line.trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Read and parse a sieve-list file
pub fn load_sieve_list(path: impl AsRef<Path>) -> Result<Vec<String>, PipelineError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let names = parse_sieve_list(&contents);
    tracing::info!("Read {} sieves from {}", names.len(), path.display());
    Ok(names)
}

//! Layered key/value configuration
//!
//! A [`ConfigSet`] is built by layering sources of increasing precedence.
//! Precedence is carried by [`ConfigSource`] itself, so a lower-precedence
//! source layered late never clobbers a value from a higher one.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Origin of a configuration value, ordered from lowest to highest precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigSource {
    /// Previous run's `stackoutput.properties`
    PriorOutput,
    /// `<environment>.properties` under the deployment root
    EnvironmentFile,
    /// Values derived from the calling pipeline
    PipelineContext,
    /// Remote variable broker response
    Broker,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::PriorOutput => write!(f, "prior-output"),
            ConfigSource::EnvironmentFile => write!(f, "environment-file"),
            ConfigSource::PipelineContext => write!(f, "pipeline-context"),
            ConfigSource::Broker => write!(f, "broker"),
        }
    }
}

/// A value together with the source that set it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: ConfigSource,
}

/// Ordered, immutable-by-convention configuration map
///
/// Mutation happens only through [`ConfigSet::layer`], which consumes the
/// set and returns the merged result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigSet {
    entries: BTreeMap<String, ConfigEntry>,
}

impl ConfigSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `entries` from `source` into the set
    ///
    /// A key already set by a higher-precedence source keeps its value.
    /// Equal or lower precedence is overwritten.
    pub fn layer<I, K, V>(mut self, source: ConfigSource, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in entries {
            let key = key.into();
            let value = value.into();
            match self.entries.get(&key).map(|e| e.source) {
                Some(existing) if existing > source => {
                    debug!(
                        key = %key,
                        kept = %existing,
                        ignored = %source,
                        "Keeping higher-precedence value"
                    );
                }
                Some(existing) => {
                    if existing != source {
                        debug!(
                            key = %key,
                            from = %existing,
                            to = %source,
                            "Overriding configuration value"
                        );
                    }
                    self.entries.insert(key, ConfigEntry { value, source });
                }
                None => {
                    self.entries.insert(key, ConfigEntry { value, source });
                }
            }
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    pub fn source_of(&self, key: &str) -> Option<ConfigSource> {
        self.entries.get(key).map(|e| e.source)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, e)| (k.as_str(), e.value.as_str()))
    }

    /// Count of keys contributed by each source
    pub fn source_counts(&self) -> BTreeMap<ConfigSource, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.entries.values() {
            *counts.entry(entry.source).or_insert(0) += 1;
        }
        counts
    }
}

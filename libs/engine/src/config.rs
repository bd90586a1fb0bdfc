//! Engine configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunables for a [`MappingEngine`](crate::MappingEngine).
///
/// Every field has a default, so a partial YAML or JSON document is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Prefix → URI for prefixed output paths. Namespaces declared by the
    /// mapping spec take precedence.
    pub namespaces: BTreeMap<String, String>,
    /// Upper bound on the number of iterations of one COLLECTION mapping
    pub max_collection_size: usize,
    /// Number of parsed paths kept across compilations
    pub path_cache_size: usize,
    /// Emit an information diagnostic when an input path resolves to nothing
    pub report_unresolved_paths: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            namespaces: BTreeMap::new(),
            max_collection_size: 10_000,
            path_cache_size: 1_000,
            report_unresolved_paths: true,
        }
    }
}

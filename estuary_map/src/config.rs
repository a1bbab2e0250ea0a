// Data-driven admission configuration.
//
// The strict insertion path has two policies that depend on the map data
// being loaded: whether a reverse-direction edge counts as a duplicate, and
// whether non-positive lengths are refused. Both live in `AdmissionConfig`,
// loadable from JSON alongside a map description. Missing fields fall back to
// the defaults, so `{}` is a valid config.
//
// See also: `map.rs` where `HabitatMap` consults the config on every strict
// insertion, `load.rs` which threads a config through map loading.

use crate::error::MapError;
use serde::{Deserialize, Serialize};

/// Policies applied by `InsertMode::Strict`. `InsertMode::Unchecked`
/// ignores this entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Treat `B -> A` as already present once `A -> B` exists. The map
    /// models an effectively undirected adjacency with one canonical
    /// direction per connected pair.
    pub reject_reverse_duplicates: bool,

    /// Refuse edges whose length is zero, negative, or NaN.
    pub reject_non_positive_length: bool,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            reject_reverse_duplicates: true,
            reject_non_positive_length: true,
        }
    }
}

impl AdmissionConfig {
    /// Parse a config from JSON. Absent fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }
}

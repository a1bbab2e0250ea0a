// Building a habitat map from a serialized map description.
//
// A `MapDescription` is the plain-data form of a map: node records carrying
// an external id, habitat and position, and edge records naming endpoints by
// those external ids. Loading creates one arena node per record and feeds
// every edge through `HabitatMap::check_and_add_edge`, so redundant input
// (both directions of a channel, repeated segments) collapses to one
// canonical directed edge per connected pair without failing the load.
//
// Only a description that is malformed as a whole is an error: two node
// records with the same id, or an edge naming an id no record declares.
// Edge records may omit `length`, in which case the straight-line distance
// between the endpoint positions is used.
//
// See also: `map.rs` for the admission rules, `config.rs` for the policies
// passed through to the loaded map.

use crate::config::AdmissionConfig;
use crate::error::MapError;
use crate::map::{Edge, HabitatMap};
use crate::types::{HabitatType, MapNodeId, MapPosition};
use crate::validate::{EdgeValidationReport, validate_edge_consistency};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// External id, unique within one description.
    pub id: u32,
    pub habitat: HabitatType,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: u32,
    pub target: u32,
    #[serde(default)]
    pub length: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapDescription {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl MapDescription {
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A map built from a description, plus bookkeeping from the load.
#[derive(Clone, Debug)]
pub struct LoadedMap {
    pub map: HabitatMap,
    /// External record id to arena id.
    pub ids: BTreeMap<u32, MapNodeId>,
    /// Edge records that became edges.
    pub accepted: usize,
    /// Edge records dropped by admission (self-loops, duplicates, etc.).
    pub rejected: usize,
}

impl LoadedMap {
    /// Arena id for an external record id.
    pub fn node_id(&self, record_id: u32) -> Option<MapNodeId> {
        self.ids.get(&record_id).copied()
    }

    /// Run a full consistency pass over the loaded map, logging a warning
    /// if it fails.
    pub fn validate(&self) -> EdgeValidationReport {
        let report = validate_edge_consistency(&self.map);
        if !report.passed() {
            tracing::warn!(
                violations = report.violations.len(),
                "loaded map failed edge consistency validation:\n{report}"
            );
        }
        report
    }
}

impl HabitatMap {
    /// Build a map from `description`, admitting edges under `config`.
    pub fn from_description(
        description: &MapDescription,
        config: AdmissionConfig,
    ) -> Result<LoadedMap, MapError> {
        let mut map = HabitatMap::with_config(config);
        let mut ids = BTreeMap::new();
        let mut positions: Vec<MapPosition> = Vec::with_capacity(description.nodes.len());

        for record in &description.nodes {
            if ids.contains_key(&record.id) {
                return Err(MapError::DuplicateNodeId(record.id));
            }
            let id = map.create_node(record.habitat, record.x, record.y);
            ids.insert(record.id, id);
            positions.push(MapPosition::new(record.x, record.y));
        }

        let mut accepted = 0;
        let mut rejected = 0;
        for (index, record) in description.edges.iter().enumerate() {
            let resolve = |id: u32| {
                ids.get(&id)
                    .copied()
                    .ok_or(MapError::UnknownNodeId { edge: index, id })
            };
            let source = resolve(record.source)?;
            let target = resolve(record.target)?;
            let length = record
                .length
                .unwrap_or_else(|| positions[source.index()].distance(positions[target.index()]));

            if map.check_and_add_edge(Edge::new(source, target, length)).is_accepted() {
                accepted += 1;
            } else {
                rejected += 1;
            }
        }

        tracing::debug!(
            nodes = map.node_count(),
            accepted,
            rejected,
            "map description loaded"
        );

        Ok(LoadedMap {
            map,
            ids,
            accepted,
            rejected,
        })
    }
}

/// Parse a JSON map description and build it.
pub fn load_map_json(json: &str, config: AdmissionConfig) -> Result<LoadedMap, MapError> {
    let description = MapDescription::from_json(json)?;
    HabitatMap::from_description(&description, config)
}

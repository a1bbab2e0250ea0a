// estuary_map: habitat map graph for estuary movement models.
//
// This crate holds the spatial graph that movement and rendering code reads:
// nodes with a habitat classification and a 2D position, joined by directed,
// length-weighted edges. Its job is to keep the per-node incoming and outgoing
// adjacency lists consistent while maps are built from trusted fixtures or
// from redundant external data.
//
// Module overview:
// - `types.rs`:    MapPosition, MapNodeId, HabitatType.
// - `map.rs`:      HabitatMap node arena, Edge, and the two insertion modes
//                  (strict admission / unchecked connect).
// - `validate.rs`: On-demand consistency checker producing a violation report.
// - `config.rs`:   AdmissionConfig, the JSON-loadable strict-mode policies.
// - `load.rs`:     Building a HabitatMap from a serialized MapDescription.
// - `error.rs`:    MapError for config parsing and map loading.
//
// The graph is built and queried on one thread. Construction takes
// `&mut HabitatMap`; readers borrow it immutably once construction is done.

pub mod config;
pub mod error;
pub mod load;
pub mod map;
pub mod types;
pub mod validate;

pub use config::AdmissionConfig;
pub use error::MapError;
pub use load::{EdgeRecord, LoadedMap, MapDescription, NodeRecord, load_map_json};
pub use map::{Admission, Edge, HabitatMap, InsertMode, MapNode, RejectReason};
pub use types::{HabitatType, MapNodeId, MapPosition};
pub use validate::{
    AdjacencyList, EdgeValidationReport, Violation, validate_edge_consistency, validate_nodes,
};

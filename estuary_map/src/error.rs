// Error type for the fallible entry points: config parsing and map loading.
//
// Edge insertion itself never fails: rejected edges are dropped silently
// (see `map.rs`). `MapError` only covers input that is malformed as a whole.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Two node records in one map description share an id.
    #[error("duplicate node id {0} in map description")]
    DuplicateNodeId(u32),

    /// An edge record names a node id that no node record declares.
    #[error("edge {edge} references unknown node id {id}")]
    UnknownNodeId { edge: usize, id: u32 },
}

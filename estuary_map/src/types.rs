// Core types shared across the habitat map.
//
// Defines planar positions (`MapPosition`), the compact node identifier
// (`MapNodeId`), and the habitat classification enum (`HabitatType`). All
// types derive `Serialize` and `Deserialize` so map descriptions and saved
// maps can round-trip through JSON.
//
// See also: `map.rs` which owns nodes by `MapNodeId` index, `load.rs` which
// reads `HabitatType` and positions from map descriptions.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A point on the 2D map plane, in map units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPosition {
    pub x: f32,
    pub y: f32,
}

impl MapPosition {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance between two positions.
    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for MapPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Map node IDs: simple integers doubling as arena indices.
// ---------------------------------------------------------------------------

/// Compact identifier for a map node. The inner value is the node's index in
/// `HabitatMap`'s node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapNodeId(pub u32);

impl MapNodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MapNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Habitat classification
// ---------------------------------------------------------------------------

/// The habitat a map node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HabitatType {
    /// Main channel carrying river flow toward the sea.
    Distributary,
    /// Dead-end tidal channel, fed only from its mouth.
    BlindChannel,
    /// Water held back behind a dike or levee.
    Impoundment,
    /// Flat exposed at low tide.
    LowTideTerrace,
    Harbor,
    /// Shallow water just offshore of the delta front.
    Nearshore,
}

impl fmt::Display for HabitatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Distributary => "distributary",
            Self::BlindChannel => "blind channel",
            Self::Impoundment => "impoundment",
            Self::LowTideTerrace => "low tide terrace",
            Self::Harbor => "harbor",
            Self::Nearshore => "nearshore",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_distance() {
        let a = MapPosition::new(0.0, 0.0);
        let b = MapPosition::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn node_id_ordering() {
        // MapNodeId is used as a BTreeMap value and sorted in reports.
        assert!(MapNodeId(0) < MapNodeId(1));
        assert_eq!(MapNodeId(7).index(), 7);
    }

    #[test]
    fn habitat_serializes_by_variant_name() {
        let json = serde_json::to_string(&HabitatType::BlindChannel).unwrap();
        assert_eq!(json, "\"BlindChannel\"");
        let restored: HabitatType = serde_json::from_str("\"Distributary\"").unwrap();
        assert_eq!(restored, HabitatType::Distributary);
    }
}

// Habitat map graph: node store and edge admission.
//
// The map is a set of `MapNode`s (habitat + position) connected by directed
// `Edge`s carrying a traversal length. Every node keeps two adjacency lists,
// `edges_in` and `edges_out`, and every directed edge is stored exactly twice:
// once in its source's `edges_out` and once in its target's `edges_in`.
// `edges_out` is the canonical view, so the number of distinct directed edges
// is the sum of `edges_out` lengths.
//
// All storage is a `Vec<MapNode>` indexed by `MapNodeId`, and edges refer to
// nodes by id, so an adjacency entry can never point at freed memory.
// Adjacency lists are only mutated through `HabitatMap::insert_edge`, which
// writes both copies of an edge in one step.
//
// `insert_edge` has two modes:
// - `InsertMode::Strict` (`check_and_add_edge`) is used for derived or
//   external input. It silently drops self-loops, exact duplicates, reverse
//   duplicates and invalid lengths, so redundant map data loads without error.
// - `InsertMode::Unchecked` (`connect_nodes`) is used where the caller already
//   knows the edge is valid. It appends unconditionally, which is how
//   genuinely bidirectional segments (`A -> B` plus `B -> A`) are built.
//
// Neither mode verifies graph-wide invariants. That is the job of
// `validate.rs`, which is run on demand rather than on every insertion.
//
// See also: `types.rs` for `MapNodeId`/`HabitatType`, `config.rs` for the
// strict-mode policies, `load.rs` for building a map from a description.

use crate::config::AdmissionConfig;
use crate::types::{HabitatType, MapNodeId, MapPosition};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Most map nodes sit on a channel with a handful of neighbors.
pub type EdgeList = SmallVec<[Edge; 4]>;

/// A directed, length-weighted connection between two map nodes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: MapNodeId,
    pub target: MapNodeId,
    /// Traversal distance in map units. Expected to be positive.
    pub length: f32,
}

impl Edge {
    pub const fn new(source: MapNodeId, target: MapNodeId, length: f32) -> Self {
        Self {
            source,
            target,
            length,
        }
    }
}

/// A point in the habitat map.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapNode {
    pub id: MapNodeId,
    pub habitat: HabitatType,
    pub position: MapPosition,
    /// Edges whose target is this node.
    pub(crate) edges_in: EdgeList,
    /// Edges whose source is this node.
    pub(crate) edges_out: EdgeList,
}

impl MapNode {
    pub fn edges_in(&self) -> &[Edge] {
        &self.edges_in
    }

    pub fn edges_out(&self) -> &[Edge] {
        &self.edges_out
    }

    /// True if this node has an outgoing edge to `target`.
    pub fn has_edge_to(&self, target: MapNodeId) -> bool {
        self.edges_out.iter().any(|e| e.target == target)
    }

    /// True if this node has an incoming edge from `source`.
    pub fn has_edge_from(&self, source: MapNodeId) -> bool {
        self.edges_in.iter().any(|e| e.source == source)
    }
}

/// Which admission rules `HabitatMap::insert_edge` applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertMode {
    /// Reject self-loops, duplicates, reverse duplicates (if configured) and
    /// invalid lengths (if configured).
    Strict,
    /// Append unconditionally. The caller guarantees the edge is valid.
    Unchecked,
}

/// Why an edge was not inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// An endpoint is not a node of this map. Checked in both modes.
    UnknownNode(MapNodeId),
    SelfLoop,
    /// `source -> target` already exists.
    Duplicate,
    /// `target -> source` already exists.
    ReverseDuplicate,
    /// Length is not a finite positive number.
    InvalidLength,
}

/// Outcome of an insertion. Purely informational: rejected edges leave the
/// map untouched and callers are free to ignore this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Rejected(RejectReason),
}

impl Admission {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

/// The habitat map: node arena plus admission policy.
#[derive(Clone, Debug, Default)]
pub struct HabitatMap {
    nodes: Vec<MapNode>,
    config: AdmissionConfig,
}

impl HabitatMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AdmissionConfig) -> Self {
        Self {
            nodes: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Add a node with empty adjacency lists. Returns its ID.
    pub fn create_node(&mut self, habitat: HabitatType, x: f32, y: f32) -> MapNodeId {
        let id = MapNodeId(self.nodes.len() as u32);
        self.nodes.push(MapNode {
            id,
            habitat,
            position: MapPosition::new(x, y),
            edges_in: EdgeList::new(),
            edges_out: EdgeList::new(),
        });
        id
    }

    /// Insert `edge` under the rules of `mode`.
    ///
    /// On acceptance the edge is appended to `source.edges_out` and the same
    /// value to `target.edges_in`. On rejection nothing changes.
    pub fn insert_edge(&mut self, edge: Edge, mode: InsertMode) -> Admission {
        let rejection = match mode {
            InsertMode::Strict => self.strict_rejection(&edge),
            InsertMode::Unchecked => self.unknown_endpoint(&edge),
        };
        if let Some(reason) = rejection {
            tracing::debug!(
                from = %edge.source,
                to = %edge.target,
                length = edge.length,
                ?reason,
                "edge rejected"
            );
            return Admission::Rejected(reason);
        }

        self.nodes[edge.source.index()].edges_out.push(edge);
        self.nodes[edge.target.index()].edges_in.push(edge);
        Admission::Accepted
    }

    /// Admission-controlled insertion for untrusted or derived input.
    /// Invalid and redundant edges are dropped silently, so calling this
    /// twice with the same edge is the same as calling it once.
    pub fn check_and_add_edge(&mut self, edge: Edge) -> Admission {
        self.insert_edge(edge, InsertMode::Strict)
    }

    /// Unconditional insertion for trusted construction code. Connecting
    /// `A -> B` and then `B -> A` yields two independent directed edges.
    pub fn connect_nodes(&mut self, source: MapNodeId, target: MapNodeId, length: f32) {
        self.insert_edge(Edge::new(source, target, length), InsertMode::Unchecked);
    }

    fn unknown_endpoint(&self, edge: &Edge) -> Option<RejectReason> {
        [edge.source, edge.target]
            .into_iter()
            .find(|&id| !self.contains(id))
            .map(RejectReason::UnknownNode)
    }

    fn strict_rejection(&self, edge: &Edge) -> Option<RejectReason> {
        if let Some(reason) = self.unknown_endpoint(edge) {
            return Some(reason);
        }
        if edge.source == edge.target {
            return Some(RejectReason::SelfLoop);
        }
        if self.nodes[edge.source.index()].has_edge_to(edge.target) {
            return Some(RejectReason::Duplicate);
        }
        if self.config.reject_reverse_duplicates
            && self.nodes[edge.target.index()].has_edge_to(edge.source)
        {
            return Some(RejectReason::ReverseDuplicate);
        }
        if self.config.reject_non_positive_length
            && !(edge.length.is_finite() && edge.length > 0.0)
        {
            return Some(RejectReason::InvalidLength);
        }
        None
    }

    /// Get a node by ID.
    pub fn node(&self, id: MapNodeId) -> Option<&MapNode> {
        self.nodes.get(id.index())
    }

    /// Whether `id` is a node of this map.
    pub fn contains(&self, id: MapNodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn nodes(&self) -> &[MapNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Incoming edges of a node. Empty for unknown IDs.
    pub fn edges_in(&self, id: MapNodeId) -> &[Edge] {
        match self.node(id) {
            Some(node) => node.edges_in(),
            None => &[],
        }
    }

    /// Outgoing edges of a node. Empty for unknown IDs.
    pub fn edges_out(&self, id: MapNodeId) -> &[Edge] {
        match self.node(id) {
            Some(node) => node.edges_out(),
            None => &[],
        }
    }

    /// Whether a directed edge `source -> target` exists.
    pub fn has_edge(&self, source: MapNodeId, target: MapNodeId) -> bool {
        self.node(source).is_some_and(|n| n.has_edge_to(target))
    }

    /// Number of distinct directed edges, counted from the canonical
    /// `edges_out` lists.
    pub fn total_unique_edges(&self) -> usize {
        self.nodes.iter().map(|n| n.edges_out.len()).sum()
    }

    /// Find the node closest to `pos` by straight-line distance. Ties go to
    /// the lowest ID. Returns `None` if the map is empty.
    pub fn find_nearest_node(&self, pos: MapPosition) -> Option<MapNodeId> {
        self.nodes
            .iter()
            .min_by(|a, b| {
                a.position
                    .distance(pos)
                    .total_cmp(&b.position.distance(pos))
            })
            .map(|n| n.id)
    }

    /// IDs of all nodes with the given habitat, in ID order.
    pub fn nodes_with_habitat(&self, habitat: HabitatType) -> impl Iterator<Item = MapNodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |n| n.habitat == habitat)
            .map(|n| n.id)
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, id: MapNodeId) -> &mut MapNode {
        &mut self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> (HabitatMap, MapNodeId, MapNodeId) {
        let mut map = HabitatMap::new();
        let a = map.create_node(HabitatType::Distributary, 0.0, 0.0);
        let b = map.create_node(HabitatType::BlindChannel, 1.0, 0.0);
        (map, a, b)
    }

    #[test]
    fn create_node_assigns_sequential_ids() {
        let mut map = HabitatMap::new();
        let a = map.create_node(HabitatType::Distributary, 0.0, 0.0);
        let b = map.create_node(HabitatType::BlindChannel, 1.0, 0.0);
        let c = map.create_node(HabitatType::Harbor, 2.0, 0.0);
        assert_eq!(a, MapNodeId(0));
        assert_eq!(b, MapNodeId(1));
        assert_eq!(c, MapNodeId(2));
        assert_eq!(map.node_count(), 3);
        assert!(map.edges_in(b).is_empty());
        assert!(map.edges_out(b).is_empty());
    }

    #[test]
    fn accepted_edge_is_mirrored() {
        let (mut map, a, b) = two_nodes();
        let admission = map.check_and_add_edge(Edge::new(a, b, 5.0));
        assert_eq!(admission, Admission::Accepted);
        assert_eq!(map.edges_out(a), &[Edge::new(a, b, 5.0)]);
        assert_eq!(map.edges_in(b), &[Edge::new(a, b, 5.0)]);
        assert!(map.edges_in(a).is_empty());
        assert!(map.edges_out(b).is_empty());
        assert!(map.has_edge(a, b));
        assert!(!map.has_edge(b, a));
    }

    #[test]
    fn strict_rejection_reasons() {
        let (mut map, a, b) = two_nodes();
        map.check_and_add_edge(Edge::new(a, b, 5.0));

        assert_eq!(
            map.check_and_add_edge(Edge::new(a, a, 1.0)),
            Admission::Rejected(RejectReason::SelfLoop)
        );
        assert_eq!(
            map.check_and_add_edge(Edge::new(a, b, 5.0)),
            Admission::Rejected(RejectReason::Duplicate)
        );
        assert_eq!(
            map.check_and_add_edge(Edge::new(b, a, 5.0)),
            Admission::Rejected(RejectReason::ReverseDuplicate)
        );
        assert_eq!(
            map.check_and_add_edge(Edge::new(a, MapNodeId(9), 1.0)),
            Admission::Rejected(RejectReason::UnknownNode(MapNodeId(9)))
        );
        assert_eq!(map.total_unique_edges(), 1);
    }

    #[test]
    fn strict_rejects_invalid_lengths_by_default() {
        let (mut map, a, b) = two_nodes();
        for length in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let admission = map.check_and_add_edge(Edge::new(a, b, length));
            assert_eq!(
                admission,
                Admission::Rejected(RejectReason::InvalidLength),
                "length {length} should be rejected"
            );
        }
        assert_eq!(map.total_unique_edges(), 0);
    }

    #[test]
    fn length_check_can_be_disabled() {
        let mut map = HabitatMap::with_config(AdmissionConfig {
            reject_non_positive_length: false,
            ..AdmissionConfig::default()
        });
        let a = map.create_node(HabitatType::Distributary, 0.0, 0.0);
        let b = map.create_node(HabitatType::Distributary, 0.0, 0.0);
        assert!(map.check_and_add_edge(Edge::new(a, b, 0.0)).is_accepted());
    }

    #[test]
    fn reverse_duplicate_check_can_be_disabled() {
        let mut map = HabitatMap::with_config(AdmissionConfig {
            reject_reverse_duplicates: false,
            ..AdmissionConfig::default()
        });
        let a = map.create_node(HabitatType::Distributary, 0.0, 0.0);
        let b = map.create_node(HabitatType::Distributary, 1.0, 0.0);
        assert!(map.check_and_add_edge(Edge::new(a, b, 1.0)).is_accepted());
        assert!(map.check_and_add_edge(Edge::new(b, a, 1.0)).is_accepted());
        // Exact duplicates are still refused.
        assert!(!map.check_and_add_edge(Edge::new(b, a, 1.0)).is_accepted());
        assert_eq!(map.total_unique_edges(), 2);
    }

    #[test]
    fn unchecked_applies_no_admission_rules() {
        let (mut map, a, b) = two_nodes();
        map.connect_nodes(a, b, 2.0);
        map.connect_nodes(a, b, 2.0);
        assert_eq!(map.edges_out(a).len(), 2);
        assert_eq!(map.edges_in(b).len(), 2);
    }

    #[test]
    fn unchecked_still_refuses_unknown_nodes() {
        let (mut map, a, _) = two_nodes();
        let admission = map.insert_edge(Edge::new(MapNodeId(5), a, 1.0), InsertMode::Unchecked);
        assert_eq!(admission, Admission::Rejected(RejectReason::UnknownNode(MapNodeId(5))));
        assert!(map.edges_in(a).is_empty());
        assert!(map.edges_out(MapNodeId(5)).is_empty());
    }

    #[test]
    fn find_nearest_node_works() {
        let mut map = HabitatMap::new();
        map.create_node(HabitatType::Distributary, 0.0, 0.0);
        map.create_node(HabitatType::Distributary, 10.0, 0.0);
        map.create_node(HabitatType::Nearshore, 5.0, 5.0);

        let nearest = map.find_nearest_node(MapPosition::new(4.0, 4.0));
        assert_eq!(nearest, Some(MapNodeId(2)));
    }

    #[test]
    fn find_nearest_node_empty_map() {
        let map = HabitatMap::new();
        assert_eq!(map.find_nearest_node(MapPosition::new(0.0, 0.0)), None);
    }

    #[test]
    fn nodes_with_habitat_filters_in_id_order() {
        let mut map = HabitatMap::new();
        let a = map.create_node(HabitatType::BlindChannel, 0.0, 0.0);
        map.create_node(HabitatType::Distributary, 1.0, 0.0);
        let c = map.create_node(HabitatType::BlindChannel, 2.0, 0.0);
        let blind: Vec<_> = map.nodes_with_habitat(HabitatType::BlindChannel).collect();
        assert_eq!(blind, vec![a, c]);
    }
}

// On-demand consistency checking for habitat map adjacency lists.
//
// `HabitatMap::insert_edge` keeps the hot path cheap by never re-checking
// graph-wide invariants. This module is the separate pass that does: it walks
// a set of nodes and reports every broken invariant as a `Violation`, without
// stopping at the first one.
//
// Checked per node, in node order and then list order (so reports are
// deterministic):
// 1. every `edges_in` entry targets the node,
// 2. every `edges_out` entry originates at the node,
// 3. no self-loops,
// 4. every endpoint is in the validated node set ("not in map"),
// 5. no two `edges_in` entries share a source, no two `edges_out` a target,
// 6. each `edges_out` entry has a mirrored `edges_in` entry on the target,
//    and each `edges_in` entry a mirrored `edges_out` entry on the source,
// 7. every length is strictly positive.
//
// See also: `map.rs` for the store and insertion rules being verified.

use crate::map::{Edge, HabitatMap, MapNode};
use crate::types::MapNodeId;
use rustc_hash::FxHashSet;
use std::fmt;

/// Which adjacency list an edge entry was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdjacencyList {
    In,
    Out,
}

impl fmt::Display for AdjacencyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => f.write_str("edges_in"),
            Self::Out => f.write_str("edges_out"),
        }
    }
}

/// A single broken invariant. `node` is always the node whose list holds the
/// offending entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    /// The validated set names an ID the map does not have.
    UnknownNode { node: MapNodeId },
    /// `edges_in[index].target` is not this node.
    WrongTarget { node: MapNodeId, index: usize },
    /// `edges_out[index].source` is not this node.
    WrongSource { node: MapNodeId, index: usize },
    SelfLoop { node: MapNodeId, list: AdjacencyList },
    /// The far endpoint of an entry is outside the validated node set.
    NotInMap {
        node: MapNodeId,
        list: AdjacencyList,
        endpoint: MapNodeId,
    },
    DuplicateIn { node: MapNodeId, source: MapNodeId },
    DuplicateOut { node: MapNodeId, target: MapNodeId },
    /// `node -> target` is in `node.edges_out` but not in `target.edges_in`.
    MissingMirrorIn { node: MapNodeId, target: MapNodeId },
    /// `source -> node` is in `node.edges_in` but not in `source.edges_out`.
    MissingMirrorOut { node: MapNodeId, source: MapNodeId },
    NonPositiveLength {
        node: MapNodeId,
        list: AdjacencyList,
        length: f32,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode { node } => write!(f, "node {node}: not in map"),
            Self::WrongTarget { node, index } => {
                write!(f, "node {node}: edges_in[{index}].target != this node")
            }
            Self::WrongSource { node, index } => {
                write!(f, "node {node}: edges_out[{index}].source != this node")
            }
            Self::SelfLoop { node, list } => write!(f, "node {node}: self-loop in {list}"),
            Self::NotInMap {
                node,
                list,
                endpoint,
            } => {
                let role = match list {
                    AdjacencyList::In => "source",
                    AdjacencyList::Out => "target",
                };
                write!(f, "node {node}: {list} references {role} {endpoint} not in map")
            }
            Self::DuplicateIn { node, source } => {
                write!(f, "node {node}: duplicate edges_in from source {source}")
            }
            Self::DuplicateOut { node, target } => {
                write!(f, "node {node}: duplicate edges_out to target {target}")
            }
            Self::MissingMirrorIn { node, target } => write!(
                f,
                "node {node}: edges_out to {target} but target has no matching edges_in"
            ),
            Self::MissingMirrorOut { node, source } => write!(
                f,
                "node {node}: edges_in from {source} but source has no matching edges_out"
            ),
            Self::NonPositiveLength { node, list, length } => {
                write!(f, "node {node}: {list} has non-positive length {length}")
            }
        }
    }
}

/// Result of a validation pass.
#[derive(Clone, Debug, Default)]
pub struct EdgeValidationReport {
    pub total_nodes: usize,
    /// Sum of `edges_out` sizes over the validated nodes.
    pub total_unique_edges: usize,
    pub violations: Vec<Violation>,
}

impl EdgeValidationReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// True if any violation's message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.violations.iter().any(|v| v.to_string().contains(needle))
    }
}

impl fmt::Display for EdgeValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} edges, {} violations",
            self.total_nodes,
            self.total_unique_edges,
            self.violations.len()
        )?;
        for v in &self.violations {
            write!(f, "\n  {v}")?;
        }
        Ok(())
    }
}

/// Validate every node of `map` against the whole map.
pub fn validate_edge_consistency(map: &HabitatMap) -> EdgeValidationReport {
    let ids: Vec<MapNodeId> = map.nodes().iter().map(|n| n.id).collect();
    validate_nodes(map, &ids)
}

/// Validate only the listed nodes, treating them as the complete node set.
/// Any edge reaching a node outside `ids` is reported as "not in map".
pub fn validate_nodes(map: &HabitatMap, ids: &[MapNodeId]) -> EdgeValidationReport {
    let node_set: FxHashSet<MapNodeId> = ids.iter().copied().collect();
    let mut report = EdgeValidationReport {
        total_nodes: ids.len(),
        ..EdgeValidationReport::default()
    };

    for &id in ids {
        let Some(node) = map.node(id) else {
            report.violations.push(Violation::UnknownNode { node: id });
            continue;
        };
        check_node(map, node, &node_set, &mut report.violations);
        report.total_unique_edges += node.edges_out().len();
    }

    report
}

fn check_node(
    map: &HabitatMap,
    node: &MapNode,
    node_set: &FxHashSet<MapNodeId>,
    violations: &mut Vec<Violation>,
) {
    let id = node.id;

    for (index, e) in node.edges_in().iter().enumerate() {
        if e.target != id {
            violations.push(Violation::WrongTarget { node: id, index });
        }
    }
    for (index, e) in node.edges_out().iter().enumerate() {
        if e.source != id {
            violations.push(Violation::WrongSource { node: id, index });
        }
    }

    let lists = [
        (AdjacencyList::In, node.edges_in()),
        (AdjacencyList::Out, node.edges_out()),
    ];

    for (list, edges) in lists {
        for e in edges {
            if e.source == e.target {
                violations.push(Violation::SelfLoop { node: id, list });
            }
        }
    }

    for e in node.edges_in() {
        if !node_set.contains(&e.source) {
            violations.push(Violation::NotInMap {
                node: id,
                list: AdjacencyList::In,
                endpoint: e.source,
            });
        }
    }
    for e in node.edges_out() {
        if !node_set.contains(&e.target) {
            violations.push(Violation::NotInMap {
                node: id,
                list: AdjacencyList::Out,
                endpoint: e.target,
            });
        }
    }

    let mut seen = FxHashSet::default();
    for e in node.edges_in() {
        if !seen.insert(e.source) {
            violations.push(Violation::DuplicateIn {
                node: id,
                source: e.source,
            });
        }
    }
    seen.clear();
    for e in node.edges_out() {
        if !seen.insert(e.target) {
            violations.push(Violation::DuplicateOut {
                node: id,
                target: e.target,
            });
        }
    }

    // Mirror lookups go through the arena, not the validated set, so a
    // subset validation still checks symmetry for edges leaving the subset.
    for e in node.edges_out() {
        if !map.node(e.target).is_some_and(|t| t.has_edge_from(id)) {
            violations.push(Violation::MissingMirrorIn {
                node: id,
                target: e.target,
            });
        }
    }
    for e in node.edges_in() {
        if !map.node(e.source).is_some_and(|s| s.has_edge_to(id)) {
            violations.push(Violation::MissingMirrorOut {
                node: id,
                source: e.source,
            });
        }
    }

    for (list, edges) in lists {
        for &Edge { length, .. } in edges {
            if length.is_nan() || length <= 0.0 {
                violations.push(Violation::NonPositiveLength {
                    node: id,
                    list,
                    length,
                });
            }
        }
    }
}

//! Time-respecting path queries.
//!
//! A path is a sequence of link occurrences with non-decreasing traversal
//! times: each occurrence is boarded no earlier than the arrival from the
//! previous one, and delivers the traveler when the occurrence ends (plus
//! its trip duration when traversal durations are attached). Waiting is
//! allowed while the intermediate node stays present; a traveler whose
//! segment ends is stranded.
//!
//! Six optimality criteria, each as single-pair, single-source and pairwise
//! queries:
//!
//! | query | optimizes | secondary |
//! |---|---|---|
//! | [`foremost`] | earliest arrival | — |
//! | [`shortest_foremost`] | earliest arrival | fewest hops |
//! | [`fastest`] | minimal duration | — |
//! | [`shortest_fastest`] | minimal duration | fewest hops |
//! | [`shortest`] | fewest hops | — |
//! | [`fastest_shortest`] | fewest hops | minimal duration |
//!
//! Unreachable destinations are `None` entries, not errors.

mod engine;

pub use engine::{
    fastest, fastest_from, fastest_pairwise, fastest_shortest, fastest_shortest_from,
    fastest_shortest_pairwise, foremost, foremost_from, foremost_pairwise, hop_profiles,
    shortest, shortest_fastest, shortest_fastest_from, shortest_fastest_pairwise,
    shortest_foremost, shortest_foremost_from, shortest_foremost_pairwise, shortest_from,
    shortest_pairwise, Profile,
};

use crate::segment::SegmentedNode;
use crate::NodeId;

/// A query endpoint: a bare node (any occurrence) or one explicit
/// occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Any occurrence of the node.
    Node(NodeId),
    /// One specific occurrence; must name a real presence segment.
    Segment(SegmentedNode),
}

impl Endpoint {
    /// The underlying node.
    pub fn node(&self) -> NodeId {
        match self {
            Endpoint::Node(n) => *n,
            Endpoint::Segment(s) => s.node,
        }
    }
}

impl From<NodeId> for Endpoint {
    fn from(n: NodeId) -> Self {
        Endpoint::Node(n)
    }
}

impl From<SegmentedNode> for Endpoint {
    fn from(s: SegmentedNode) -> Self {
        Endpoint::Segment(s)
    }
}

//! Segmented nodes.
//!
//! Most algorithms operate on one maximal contiguous occurrence of a node at
//! a time. [`SegmentArena`] assigns every occurrence a dense integer id so
//! adjacency can live in index lists instead of keyed maps.

use crate::interval::Interval;
use crate::{NodeId, Time};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One maximal contiguous occurrence `(t0, t1, n)` of node `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentedNode {
    /// Start of the occurrence.
    pub start: Time,
    /// End of the occurrence.
    pub end: Time,
    /// The underlying node.
    pub node: NodeId,
}

impl SegmentedNode {
    /// Create a segmented node.
    pub fn new(start: Time, end: Time, node: NodeId) -> Self {
        Self { start, end, node }
    }

    /// The occurrence interval.
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

impl fmt::Display for SegmentedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.start, self.end, self.node)
    }
}

/// Dense id of a segment inside a [`SegmentArena`].
pub type SegmentId = usize;

/// Arena of all segmented nodes of a stream, with per-node contiguous id
/// ranges. A node with k disjoint presence intervals yields k segments with
/// consecutive ids, in time order.
#[derive(Debug, Clone, Default)]
pub struct SegmentArena {
    segments: Vec<SegmentedNode>,
    /// CSR-style offsets: segments of node `n` occupy
    /// `offsets[n] .. offsets[n + 1]`.
    offsets: Vec<usize>,
}

impl SegmentArena {
    /// Build an arena from per-node presence spans, in node order.
    pub fn from_presences<'a, I>(presences: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, &'a crate::interval::IntervalSeq)>,
    {
        let mut segments = Vec::new();
        let mut offsets = vec![0];
        for (node, presence) in presences {
            for span in presence.iter() {
                segments.push(SegmentedNode::new(span.start, span.end, node));
            }
            debug_assert_eq!(offsets.len(), node as usize + 1);
            offsets.push(segments.len());
        }
        Self { segments, offsets }
    }

    /// Number of segments in the arena.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of nodes the arena was built over (present or not).
    pub fn nb_nodes(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// The segment for an id.
    pub fn get(&self, id: SegmentId) -> SegmentedNode {
        self.segments[id]
    }

    /// All segments in id order.
    pub fn segments(&self) -> &[SegmentedNode] {
        &self.segments
    }

    /// Iterate `(id, segment)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, SegmentedNode)> + '_ {
        self.segments.iter().copied().enumerate()
    }

    /// Ids of the segments of one node.
    pub fn ids_of_node(&self, node: NodeId) -> std::ops::Range<SegmentId> {
        let n = node as usize;
        if n + 1 >= self.offsets.len() {
            return 0..0;
        }
        self.offsets[n]..self.offsets[n + 1]
    }

    /// The segment of `node` whose interval fully contains `interval`, if
    /// any. Used to resolve a link occurrence to its endpoint occurrences.
    pub fn locate(&self, node: NodeId, interval: &Interval) -> Option<SegmentId> {
        let range = self.ids_of_node(node);
        let slice = &self.segments[range.clone()];
        let idx = slice.partition_point(|s| s.end < interval.start);
        slice
            .get(idx)
            .filter(|s| s.interval().contains(interval))
            .map(|_| range.start + idx)
    }

    /// The segment of `node` containing the instant `t`, if any.
    pub fn locate_at(&self, node: NodeId, t: Time) -> Option<SegmentId> {
        let range = self.ids_of_node(node);
        let slice = &self.segments[range.clone()];
        let idx = slice.partition_point(|s| s.end < t);
        slice
            .get(idx)
            .filter(|s| s.interval().contains_time(t))
            .map(|_| range.start + idx)
    }

    /// Id of an exact segment, if present. Rejects restrictions that name no
    /// real occurrence.
    pub fn id_of(&self, segment: &SegmentedNode) -> Option<SegmentId> {
        self.locate(segment.node, &segment.interval())
            .filter(|&id| self.segments[id] == *segment)
    }
}

//! Connectivity algorithms over stream graphs.

/// Disjoint-set forest used by the incremental component strategies.
pub mod union_find;

/// Weak and weakly-bounded connected components.
pub mod weak;

/// Stable windows, stable components and the static-analyzer seam.
pub mod stable;

/// Temporal strongly connected components.
pub mod strong;

/// Condensation DAG, stable DAG, k-core and k-clique decompositions.
pub mod dag;

use crate::interval::Interval;
use crate::segment::SegmentedNode;
use serde::{Deserialize, Serialize};

/// A set of temporal nodes grouped by a connectivity criterion, with an id
/// and the time window it spans.
///
/// The bare cluster shape `{(t0, t1, n), ...}` is the `members` slice; the
/// caller picks the representation by the accessor it uses, not by a format
/// flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Dense component id.
    pub id: usize,
    /// Envelope of the member occurrences.
    pub times: Interval,
    /// Member occurrences, sorted.
    pub members: Vec<SegmentedNode>,
}

impl Component {
    pub(crate) fn from_members(id: usize, mut members: Vec<SegmentedNode>) -> Self {
        members.sort_unstable();
        let times = members
            .iter()
            .map(SegmentedNode::interval)
            .reduce(|a, b| a.envelope(&b))
            .unwrap_or(Interval::new(0, 0));
        Self { id, times, members }
    }

    /// The bare cluster view.
    pub fn cluster(&self) -> &[SegmentedNode] {
        &self.members
    }

    /// Number of member occurrences.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the component is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Strip a component list down to bare clusters.
pub fn clusters(components: &[Component]) -> Vec<Vec<SegmentedNode>> {
    components.iter().map(|c| c.members.clone()).collect()
}

//! Degree-partition sweep.
//!
//! For each node, all incident link interval endpoints are merged into one
//! +1/-1 multiset, sorted, and accumulated into the instantaneous-degree
//! timeline. Simultaneous endpoints at one timestamp are resolved by net
//! delta — they are genuinely simultaneous topology changes, not a causal
//! sequence, so the node/link kind tie-break does not apply here.
//!
//! Output feeds the k-core machinery, the WBCC re-segmentation
//! ([`activity_bounds`]) and the node-weight time series.

use crate::interval::{Interval, IntervalSeq};
use crate::segment::SegmentedNode;
use crate::stream::StreamGraph;
use crate::{NodeId, Time};
use std::collections::BTreeMap;
use tracing::warn;

/// Per-node sorted `(time, delta)` endpoint lists.
fn interaction_deltas(sg: &StreamGraph) -> Vec<Vec<(Time, i32)>> {
    let mut deltas: Vec<Vec<(Time, i32)>> = vec![Vec::new(); sg.nb_nodes()];
    for (l, link) in sg.links().iter().enumerate() {
        let presence = sg.link_presence(l).expect("link id from enumeration");
        for span in presence.iter() {
            for n in [link.u, link.v] {
                deltas[n as usize].push((span.start, 1));
                deltas[n as usize].push((span.end, -1));
            }
        }
    }
    for d in &mut deltas {
        d.sort_unstable_by_key(|&(t, _)| t);
    }
    deltas
}

/// The instantaneous-degree timeline of every node: maximal sub-intervals of
/// constant strictly-positive degree, in time order. Zero-degree stretches
/// are omitted (see [`isolated_segments`]).
pub fn degree_series(sg: &StreamGraph) -> Vec<Vec<(Interval, u32)>> {
    let deltas = interaction_deltas(sg);
    deltas
        .into_iter()
        .map(|d| {
            let mut series: Vec<(Interval, u32)> = Vec::new();
            let mut degree: i32 = 0;
            let mut i = 0;
            while i < d.len() {
                let t = d[i].0;
                // Net delta across everything happening at this instant
                let mut net = 0;
                while i < d.len() && d[i].0 == t {
                    net += d[i].1;
                    i += 1;
                }
                degree += net;
                debug_assert!(degree >= 0, "degree went negative at t={t}");
                if degree > 0 {
                    let next = d[i].0;
                    if t < next {
                        match series.last_mut() {
                            // Zero net delta keeps the previous step open
                            Some((span, deg)) if *deg == degree as u32 && span.end == t => {
                                span.end = next;
                            }
                            _ => series.push((Interval::new(t, next), degree as u32)),
                        }
                    }
                }
            }
            series
        })
        .collect()
}

/// The degree partition: degree value to the set of temporal-node pieces
/// holding that degree.
pub fn degree_partition(sg: &StreamGraph) -> BTreeMap<u32, Vec<SegmentedNode>> {
    let mut partition: BTreeMap<u32, Vec<SegmentedNode>> = BTreeMap::new();
    for (n, series) in degree_series(sg).into_iter().enumerate() {
        for (span, degree) in series {
            partition
                .entry(degree)
                .or_default()
                .push(SegmentedNode::new(span.start, span.end, n as NodeId));
        }
    }
    partition
}

/// Per-node maximal runs of strictly positive degree — the bounds inside
/// which the node can possibly belong to a non-singleton component. The WBCC
/// re-segmentation.
pub fn activity_bounds(sg: &StreamGraph) -> Vec<IntervalSeq> {
    let deltas = interaction_deltas(sg);
    deltas
        .into_iter()
        .map(|d| {
            let mut runs: Vec<Interval> = Vec::new();
            let mut degree: i32 = 0;
            let mut run_start: Option<Time> = None;
            let mut i = 0;
            while i < d.len() {
                let t = d[i].0;
                let mut net = 0;
                while i < d.len() && d[i].0 == t {
                    net += d[i].1;
                    i += 1;
                }
                let old = degree;
                degree += net;
                if old == 0 && degree > 0 {
                    run_start = Some(t);
                } else if old > 0 && degree == 0 {
                    if let Some(start) = run_start.take() {
                        runs.push(Interval::new(start, t));
                    }
                }
            }
            IntervalSeq::from(runs)
        })
        .collect()
}

/// Maximal zero-degree presence pieces: stretches where a node is present
/// but has no incident link, including wholly idle nodes. A valid edge case,
/// logged and returned as data.
pub fn isolated_segments(sg: &StreamGraph) -> Vec<SegmentedNode> {
    let bounds = activity_bounds(sg);
    let mut isolated = Vec::new();
    for n in sg.nodes() {
        let presence = sg.node_presence(n).expect("node id from iteration");
        if presence.is_empty() {
            continue;
        }
        let mut idle = presence.clone();
        for run in bounds[n as usize].iter() {
            idle.subtract(run);
        }
        if bounds[n as usize].is_empty() {
            warn!(node = n, "node has no incident link time");
        }
        for span in idle.iter() {
            isolated.push(SegmentedNode::new(span.start, span.end, n));
        }
    }
    isolated
}

/// Time-averaged degree over all node presence.
pub fn average_degree(sg: &StreamGraph) -> f64 {
    let card_w = sg.card_w();
    if card_w == 0 {
        return 0.0;
    }
    let weighted: u64 = degree_series(sg)
        .iter()
        .flatten()
        .map(|(span, deg)| span.duration() * u64::from(*deg))
        .sum();
    weighted as f64 / card_w as f64
}

/// Highest instantaneous degree reached by any node.
pub fn max_degree(sg: &StreamGraph) -> u32 {
    degree_series(sg)
        .iter()
        .flatten()
        .map(|&(_, deg)| deg)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> StreamGraph {
        // Nodes 0,1,2 on [0,10]; links (0,1) on [2,5], (0,2) on [4,7]
        StreamGraph::from_parts(
            (0, 10),
            vec![vec![0, 10], vec![0, 10], vec![0, 10]],
            vec![(0, 1), (0, 2)],
            vec![vec![2, 5], vec![4, 7]],
        )
        .unwrap()
    }

    #[test]
    fn test_degree_series() {
        let series = degree_series(&stream());
        assert_eq!(
            series[0],
            vec![
                (Interval::new(2, 4), 1),
                (Interval::new(4, 5), 2),
                (Interval::new(5, 7), 1),
            ]
        );
        assert_eq!(series[1], vec![(Interval::new(2, 5), 1)]);
        assert_eq!(series[2], vec![(Interval::new(4, 7), 1)]);
    }

    #[test]
    fn test_simultaneous_events_net_delta() {
        // One link ends exactly when another starts: degree stays 1, the
        // step must not split into causal sub-steps.
        let sg = StreamGraph::from_parts(
            (0, 10),
            vec![vec![0, 10], vec![0, 10], vec![0, 10]],
            vec![(0, 1), (0, 2)],
            vec![vec![0, 5], vec![5, 10]],
        )
        .unwrap();
        let series = degree_series(&sg);
        assert_eq!(series[0], vec![(Interval::new(0, 10), 1)]);
    }

    #[test]
    fn test_activity_bounds() {
        let bounds = activity_bounds(&stream());
        assert_eq!(bounds[0].to_flat(), vec![2, 7]);
        assert_eq!(bounds[1].to_flat(), vec![2, 5]);
    }

    #[test]
    fn test_isolated_segments() {
        let sg = StreamGraph::from_parts(
            (0, 10),
            vec![vec![0, 10], vec![0, 10], vec![0, 10]],
            vec![(0, 1)],
            vec![vec![2, 5]],
        )
        .unwrap();
        let mut isolated = isolated_segments(&sg);
        isolated.sort();
        assert!(isolated.contains(&SegmentedNode::new(0, 2, 0)));
        assert!(isolated.contains(&SegmentedNode::new(5, 10, 0)));
        // Node 2 never interacts: one whole-presence idle piece
        assert!(isolated.contains(&SegmentedNode::new(0, 10, 2)));
        assert_eq!(isolated.len(), 5);
    }

    #[test]
    fn test_degree_partition() {
        let partition = degree_partition(&stream());
        assert_eq!(partition[&2], vec![SegmentedNode::new(4, 5, 0)]);
        assert_eq!(partition[&1].len(), 4);
    }

    #[test]
    fn test_average_and_max_degree() {
        let sg = stream();
        assert_eq!(max_degree(&sg), 2);
        // degree-time mass 6 + 3 + 3 = 12 over card_w = 30
        assert!((average_degree(&sg) - 0.4).abs() < 1e-9);
    }
}

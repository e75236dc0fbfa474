//! Path sweeps.
//!
//! One label-correcting sweep underlies all six criteria: per segment, the
//! Pareto profile of `(hops, arrival)` labels — increasing hop count,
//! strictly decreasing earliest arrival. Earlier arrival never hurts a
//! label's extensions (an occurrence is boardable while the arrival precedes
//! its end), so per-segment minimal arrival per hop bound is an exact
//! dominance.
//!
//! The fastest family enumerates latest-boarding departures at the source:
//! arrival through an occurrence is fixed at its end, so for every choice of
//! first occurrence the optimal departure is that occurrence's end.

use crate::algo::union_find::UnionFind;
use crate::error::{Error, Result};
use crate::paths::Endpoint;
use crate::segment::SegmentId;
use crate::stream::{Neighborhood, StreamGraph};
use crate::{NodeId, Time};
use std::collections::HashMap;
use tracing::debug;

/// Pareto profile of one segment: `(hops, earliest arrival within that hop
/// bound)`, hop counts increasing, arrivals strictly decreasing.
pub type Profile = Vec<(u32, Time)>;

/// Run the hop-bounded earliest-arrival sweep from `seeds` (all carrying the
/// same initial hop count) and return the profile of every segment.
pub fn hop_profiles(nb: &Neighborhood, seeds: &[(SegmentId, Time)], hops0: u32) -> Vec<Profile> {
    let n = nb.len();
    let mut profiles: Vec<Profile> = vec![Vec::new(); n];
    let mut best: Vec<Option<Time>> = vec![None; n];
    let mut frontier: Vec<(SegmentId, Time)> = Vec::new();
    for &(s, avail) in seeds {
        if best[s].map_or(true, |b| avail < b) {
            best[s] = Some(avail);
            match profiles[s].last_mut() {
                Some((h, a)) if *h == hops0 => *a = avail,
                _ => profiles[s].push((hops0, avail)),
            }
            frontier.push((s, avail));
        }
    }
    let mut hops = hops0;
    while !frontier.is_empty() {
        hops += 1;
        let mut next: Vec<(SegmentId, Time)> = Vec::new();
        for &(s, avail) in &frontier {
            // A label stays useful even after a later, earlier-arriving one
            // supersedes it: it carries fewer hops, and arrival through an
            // occurrence does not depend on the boarding label.
            for occ in nb.neighbors(s) {
                if avail > occ.interval.end {
                    continue; // occurrence gone before we can board
                }
                let arrival = occ.interval.end + occ.trip;
                if arrival > nb.arena().get(occ.peer).end {
                    continue; // peer departs before delivery
                }
                if best[occ.peer].map_or(true, |b| arrival < b) {
                    best[occ.peer] = Some(arrival);
                    match profiles[occ.peer].last_mut() {
                        Some((h, a)) if *h == hops => *a = arrival,
                        _ => profiles[occ.peer].push((hops, arrival)),
                    }
                    next.push((occ.peer, arrival));
                }
            }
        }
        next.sort_unstable();
        next.dedup_by(|a, b| a.0 == b.0);
        frontier = next;
    }
    profiles
}

/// Resolve the source restriction and start time into `(segment, first
/// availability)` seeds.
fn seeds(
    nb: &Neighborhood,
    source: Endpoint,
    start: Option<Time>,
) -> Result<Vec<(SegmentId, Time)>> {
    match source {
        Endpoint::Node(n) => {
            if n as usize >= nb.arena().nb_nodes() {
                return Err(Error::UnknownNode(n));
            }
            let range = nb.arena().ids_of_node(n);
            Ok(range
                .filter_map(|s| {
                    let segment = nb.arena().get(s);
                    let avail = start.map_or(segment.start, |t| t.max(segment.start));
                    (avail <= segment.end).then_some((s, avail))
                })
                .collect())
        }
        Endpoint::Segment(segment) => {
            let s = nb
                .arena()
                .id_of(&segment)
                .ok_or(Error::UnknownSegment {
                    node: segment.node,
                    start: segment.start,
                    end: segment.end,
                })?;
            let avail = start.map_or(segment.start, |t| t.max(segment.start));
            if avail > segment.end {
                return Err(Error::Configuration(format!(
                    "start time {} after the restricted source segment {segment}",
                    start.unwrap_or(avail),
                )));
            }
            Ok(vec![(s, avail)])
        }
    }
}

/// Resolve the destination restriction into segment ids.
fn destination_segments(nb: &Neighborhood, dest: Endpoint) -> Result<Vec<SegmentId>> {
    match dest {
        Endpoint::Node(n) => {
            if n as usize >= nb.arena().nb_nodes() {
                return Err(Error::UnknownNode(n));
            }
            Ok(nb.arena().ids_of_node(n).collect())
        }
        Endpoint::Segment(segment) => {
            let s = nb.arena().id_of(&segment).ok_or(Error::UnknownSegment {
                node: segment.node,
                start: segment.start,
                end: segment.end,
            })?;
            Ok(vec![s])
        }
    }
}

/// Negative reachability filter for pair queries: a time-respecting path
/// never leaves the weakly connected component of its origin.
fn weakly_connected(nb: &Neighborhood, seeds: &[(SegmentId, Time)], dests: &[SegmentId]) -> bool {
    let mut uf = UnionFind::new(nb.len());
    for s in 0..nb.len() {
        for occ in nb.neighbors(s) {
            uf.union(s, occ.peer);
        }
    }
    let roots: Vec<usize> = seeds.iter().map(|&(s, _)| uf.find(s)).collect();
    dests.iter().any(|&d| roots.contains(&uf.find(d)))
}

/// Latest-boarding departure candidates at the source: one per boardable
/// occurrence, `(departure, first segment reached, arrival there)`.
fn departure_candidates(
    nb: &Neighborhood,
    seeds: &[(SegmentId, Time)],
) -> Vec<(Time, SegmentId, Time)> {
    let mut candidates = Vec::new();
    for &(s, avail) in seeds {
        for occ in nb.neighbors(s) {
            if avail > occ.interval.end {
                continue;
            }
            let arrival = occ.interval.end + occ.trip;
            if arrival > nb.arena().get(occ.peer).end {
                continue;
            }
            candidates.push((occ.interval.end, occ.peer, arrival));
        }
    }
    candidates.sort_unstable();
    candidates.dedup();
    candidates
}

/// Earliest arrival over a set of destination segments, with the fewest hops
/// achieving it.
fn best_arrival(profiles: &[Profile], dests: &[SegmentId]) -> Option<(Time, u32)> {
    let arrival = dests
        .iter()
        .filter_map(|&d| profiles[d].last().map(|&(_, a)| a))
        .min()?;
    let hops = dests
        .iter()
        .filter_map(|&d| {
            profiles[d]
                .iter()
                .find(|&&(_, a)| a <= arrival)
                .map(|&(h, _)| h)
        })
        .min()
        .expect("some destination realizes the minimal arrival");
    Some((arrival, hops))
}

/// Fewest hops over a set of destination segments, with the earliest arrival
/// within that hop bound.
fn best_hops(profiles: &[Profile], dests: &[SegmentId]) -> Option<(u32, Time)> {
    let hops = dests
        .iter()
        .filter_map(|&d| profiles[d].first().map(|&(h, _)| h))
        .min()?;
    let arrival = dests
        .iter()
        .filter_map(|&d| {
            profiles[d]
                .first()
                .filter(|&&(h, _)| h == hops)
                .map(|&(_, a)| a)
        })
        .min()
        .expect("some destination realizes the minimal hop count");
    Some((hops, arrival))
}

/// Group segment profiles per node, for single-source extraction.
fn segments_by_node(nb: &Neighborhood) -> HashMap<NodeId, Vec<SegmentId>> {
    let mut by_node: HashMap<NodeId, Vec<SegmentId>> = HashMap::new();
    for (s, segment) in nb.arena().iter() {
        by_node.entry(segment.node).or_default().push(s);
    }
    by_node
}

// ----------------------------------------------------------------------
// Foremost family
// ----------------------------------------------------------------------

/// Earliest arrival time from `source` to `dest`, optionally departing no
/// earlier than `start`. `None` when no time-respecting path exists.
pub fn foremost(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    dest: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<Option<Time>> {
    Ok(shortest_foremost(sg, source, dest, start)?.map(|(a, _)| a))
}

/// Earliest arrival and fewest hops among foremost paths.
pub fn shortest_foremost(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    dest: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<Option<(Time, u32)>> {
    let nb = sg.neighborhood()?;
    let seeds = seeds(&nb, source.into(), start)?;
    let dests = destination_segments(&nb, dest.into())?;
    if seeds.is_empty() || !weakly_connected(&nb, &seeds, &dests) {
        return Ok(None);
    }
    let profiles = hop_profiles(&nb, &seeds, 0);
    Ok(best_arrival(&profiles, &dests))
}

/// Earliest arrival to every reachable node.
pub fn foremost_from(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<HashMap<NodeId, Time>> {
    Ok(shortest_foremost_from(sg, source, start)?
        .into_iter()
        .map(|(n, (a, _))| (n, a))
        .collect())
}

/// Earliest arrival and hop count to every reachable node.
pub fn shortest_foremost_from(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<HashMap<NodeId, (Time, u32)>> {
    let nb = sg.neighborhood()?;
    let seeds = seeds(&nb, source.into(), start)?;
    let profiles = hop_profiles(&nb, &seeds, 0);
    let mut out = HashMap::new();
    for (n, segs) in segments_by_node(&nb) {
        if let Some(value) = best_arrival(&profiles, &segs) {
            out.insert(n, value);
        }
    }
    Ok(out)
}

/// The full pairwise table of earliest arrivals.
pub fn foremost_pairwise(sg: &StreamGraph) -> Result<HashMap<(NodeId, NodeId), Time>> {
    pairwise(sg, |sg, n| foremost_from(sg, n, None))
}

/// The full pairwise table of `(arrival, hops)`.
pub fn shortest_foremost_pairwise(
    sg: &StreamGraph,
) -> Result<HashMap<(NodeId, NodeId), (Time, u32)>> {
    pairwise(sg, |sg, n| shortest_foremost_from(sg, n, None))
}

// ----------------------------------------------------------------------
// Shortest family
// ----------------------------------------------------------------------

/// Fewest hops from `source` to `dest` over any departure.
pub fn shortest(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    dest: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<Option<u32>> {
    let nb = sg.neighborhood()?;
    let seeds = seeds(&nb, source.into(), start)?;
    let dests = destination_segments(&nb, dest.into())?;
    if seeds.is_empty() || !weakly_connected(&nb, &seeds, &dests) {
        return Ok(None);
    }
    let profiles = hop_profiles(&nb, &seeds, 0);
    Ok(best_hops(&profiles, &dests).map(|(h, _)| h))
}

/// Fewest hops, and the minimal duration among fewest-hop paths.
pub fn fastest_shortest(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    dest: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<Option<(u32, Time)>> {
    let nb = sg.neighborhood()?;
    let source = source.into();
    let seeds = seeds(&nb, source, start)?;
    let dests = destination_segments(&nb, dest.into())?;
    if seeds.is_empty() || !weakly_connected(&nb, &seeds, &dests) {
        return Ok(None);
    }
    if seeds.iter().any(|&(s, _)| dests.contains(&s)) {
        return Ok(Some((0, 0)));
    }
    let mut best: Option<(u32, Time)> = None;
    for (dep, first, arrival) in departure_candidates(&nb, &seeds) {
        let profiles = hop_profiles(&nb, &[(first, arrival)], 1);
        if let Some((hops, arr)) = best_hops(&profiles, &dests) {
            let value = (hops, arr - dep);
            if best.map_or(true, |b| value < b) {
                best = Some(value);
            }
        }
    }
    Ok(best)
}

/// Fewest hops to every reachable node.
pub fn shortest_from(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<HashMap<NodeId, u32>> {
    let nb = sg.neighborhood()?;
    let seeds = seeds(&nb, source.into(), start)?;
    let profiles = hop_profiles(&nb, &seeds, 0);
    let mut out = HashMap::new();
    for (n, segs) in segments_by_node(&nb) {
        if let Some((hops, _)) = best_hops(&profiles, &segs) {
            out.insert(n, hops);
        }
    }
    Ok(out)
}

/// `(hops, duration)` to every reachable node.
pub fn fastest_shortest_from(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<HashMap<NodeId, (u32, Time)>> {
    let nb = sg.neighborhood()?;
    let source = source.into();
    let seeds = seeds(&nb, source, start)?;
    let mut out: HashMap<NodeId, (u32, Time)> = HashMap::new();
    for &(s, _) in &seeds {
        out.insert(nb.arena().get(s).node, (0, 0));
    }
    let by_node = segments_by_node(&nb);
    for (dep, first, arrival) in departure_candidates(&nb, &seeds) {
        let profiles = hop_profiles(&nb, &[(first, arrival)], 1);
        for (&n, segs) in &by_node {
            if let Some((hops, arr)) = best_hops(&profiles, segs) {
                let value = (hops, arr - dep);
                match out.get_mut(&n) {
                    Some(cur) => *cur = (*cur).min(value),
                    None => {
                        out.insert(n, value);
                    }
                }
            }
        }
    }
    Ok(out)
}

/// The full pairwise hop-count table.
pub fn shortest_pairwise(sg: &StreamGraph) -> Result<HashMap<(NodeId, NodeId), u32>> {
    pairwise(sg, |sg, n| shortest_from(sg, n, None))
}

/// The full pairwise `(hops, duration)` table.
pub fn fastest_shortest_pairwise(
    sg: &StreamGraph,
) -> Result<HashMap<(NodeId, NodeId), (u32, Time)>> {
    pairwise(sg, |sg, n| fastest_shortest_from(sg, n, None))
}

// ----------------------------------------------------------------------
// Fastest family
// ----------------------------------------------------------------------

/// Minimal duration (latency) from `source` to `dest` over all departures.
pub fn fastest(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    dest: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<Option<Time>> {
    Ok(shortest_fastest(sg, source, dest, start)?.map(|(d, _)| d))
}

/// Minimal duration, and the fewest hops among fastest paths.
pub fn shortest_fastest(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    dest: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<Option<(Time, u32)>> {
    let nb = sg.neighborhood()?;
    let seeds = seeds(&nb, source.into(), start)?;
    let dests = destination_segments(&nb, dest.into())?;
    if seeds.is_empty() || !weakly_connected(&nb, &seeds, &dests) {
        return Ok(None);
    }
    if seeds.iter().any(|&(s, _)| dests.contains(&s)) {
        return Ok(Some((0, 0)));
    }
    let mut best: Option<(Time, u32)> = None;
    for (dep, first, arrival) in departure_candidates(&nb, &seeds) {
        let profiles = hop_profiles(&nb, &[(first, arrival)], 1);
        if let Some((arr, hops)) = best_arrival(&profiles, &dests) {
            let value = (arr - dep, hops);
            if best.map_or(true, |b| value < b) {
                best = Some(value);
            }
        }
    }
    Ok(best)
}

/// Minimal duration to every reachable node.
pub fn fastest_from(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<HashMap<NodeId, Time>> {
    Ok(shortest_fastest_from(sg, source, start)?
        .into_iter()
        .map(|(n, (d, _))| (n, d))
        .collect())
}

/// `(duration, hops)` to every reachable node.
pub fn shortest_fastest_from(
    sg: &StreamGraph,
    source: impl Into<Endpoint>,
    start: Option<Time>,
) -> Result<HashMap<NodeId, (Time, u32)>> {
    let nb = sg.neighborhood()?;
    let seeds = seeds(&nb, source.into(), start)?;
    let mut out: HashMap<NodeId, (Time, u32)> = HashMap::new();
    for &(s, _) in &seeds {
        out.insert(nb.arena().get(s).node, (0, 0));
    }
    let by_node = segments_by_node(&nb);
    for (dep, first, arrival) in departure_candidates(&nb, &seeds) {
        let profiles = hop_profiles(&nb, &[(first, arrival)], 1);
        for (&n, segs) in &by_node {
            if let Some((arr, hops)) = best_arrival(&profiles, segs) {
                let value = (arr - dep, hops);
                match out.get_mut(&n) {
                    Some(cur) => *cur = (*cur).min(value),
                    None => {
                        out.insert(n, value);
                    }
                }
            }
        }
    }
    Ok(out)
}

/// The full pairwise latency table.
pub fn fastest_pairwise(sg: &StreamGraph) -> Result<HashMap<(NodeId, NodeId), Time>> {
    pairwise(sg, |sg, n| fastest_from(sg, n, None))
}

/// The full pairwise `(duration, hops)` table.
pub fn shortest_fastest_pairwise(
    sg: &StreamGraph,
) -> Result<HashMap<(NodeId, NodeId), (Time, u32)>> {
    pairwise(sg, |sg, n| shortest_fastest_from(sg, n, None))
}

// ----------------------------------------------------------------------

fn pairwise<V, F>(sg: &StreamGraph, mut from: F) -> Result<HashMap<(NodeId, NodeId), V>>
where
    F: FnMut(&StreamGraph, NodeId) -> Result<HashMap<NodeId, V>>,
{
    debug!(nodes = sg.nb_nodes(), "pairwise path sweep");
    let mut table = HashMap::new();
    for n in sg.nodes() {
        for (m, value) in from(sg, n)? {
            table.insert((n, m), value);
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario B: A-B on [0,3], B-C on [4,6], everyone present [0,10].
    fn scenario_b() -> StreamGraph {
        StreamGraph::from_parts(
            (0, 10),
            vec![vec![0, 10], vec![0, 10], vec![0, 10]],
            vec![(0, 1), (1, 2)],
            vec![vec![0, 3], vec![4, 6]],
        )
        .unwrap()
    }

    /// Scenario B with the extra direct link A-C on [0,1].
    fn scenario_b_direct() -> StreamGraph {
        StreamGraph::from_parts(
            (0, 10),
            vec![vec![0, 10], vec![0, 10], vec![0, 10]],
            vec![(0, 1), (1, 2), (0, 2)],
            vec![vec![0, 3], vec![4, 6], vec![0, 1]],
        )
        .unwrap()
    }

    #[test]
    fn test_foremost_respects_the_gap() {
        let sg = scenario_b();
        assert_eq!(foremost(&sg, 0u32, 2u32, Some(0)).unwrap(), Some(6));
        assert_eq!(shortest(&sg, 0u32, 2u32, None).unwrap(), Some(2));
    }

    #[test]
    fn test_direct_link_changes_both_optima() {
        let sg = scenario_b_direct();
        assert_eq!(foremost(&sg, 0u32, 2u32, Some(0)).unwrap(), Some(1));
        assert_eq!(shortest(&sg, 0u32, 2u32, None).unwrap(), Some(1));
    }

    #[test]
    fn test_unreachable_is_none() {
        // B-C closes before A-B opens: no time-respecting path A -> C
        let sg = StreamGraph::from_parts(
            (0, 10),
            vec![vec![0, 10], vec![0, 10], vec![0, 10]],
            vec![(0, 1), (1, 2)],
            vec![vec![4, 6], vec![0, 3]],
        )
        .unwrap();
        assert_eq!(foremost(&sg, 0u32, 2u32, Some(0)).unwrap(), None);
        assert_eq!(shortest(&sg, 0u32, 2u32, None).unwrap(), None);
        // The reverse direction works
        assert_eq!(foremost(&sg, 2u32, 0u32, Some(0)).unwrap(), Some(6));
    }

    #[test]
    fn test_secondary_criteria_preserve_primary() {
        let sg = scenario_b_direct();
        let fo = foremost(&sg, 0u32, 2u32, Some(0)).unwrap().unwrap();
        let (sfo, _) = shortest_foremost(&sg, 0u32, 2u32, Some(0)).unwrap().unwrap();
        assert_eq!(fo, sfo);

        let fa = fastest(&sg, 0u32, 2u32, None).unwrap().unwrap();
        let (sfa, _) = shortest_fastest(&sg, 0u32, 2u32, None).unwrap().unwrap();
        assert_eq!(fa, sfa);

        let sp = shortest(&sg, 0u32, 2u32, None).unwrap().unwrap();
        let (fsp, _) = fastest_shortest(&sg, 0u32, 2u32, None).unwrap().unwrap();
        assert_eq!(sp, fsp);
    }

    #[test]
    fn test_fastest_boards_late() {
        // Waiting at A until t=3 and boarding the tail of A-B gives
        // duration 3 (depart 3, arrive 6) instead of 6
        let sg = scenario_b();
        assert_eq!(fastest(&sg, 0u32, 2u32, None).unwrap(), Some(3));
    }

    #[test]
    fn test_source_restriction_by_segment() {
        // Node 0 has two occurrences; the second one misses link (0,1)
        let sg = StreamGraph::from_parts(
            (0, 20),
            vec![vec![0, 4, 10, 20], vec![0, 20]],
            vec![(0, 1)],
            vec![vec![1, 3]],
        )
        .unwrap();
        let early = crate::segment::SegmentedNode::new(0, 4, 0);
        let late = crate::segment::SegmentedNode::new(10, 20, 0);
        assert_eq!(foremost(&sg, early, 1u32, None).unwrap(), Some(3));
        assert_eq!(foremost(&sg, late, 1u32, None).unwrap(), None);
    }

    #[test]
    fn test_unknown_segment_is_configuration_error() {
        let sg = scenario_b();
        let fake = crate::segment::SegmentedNode::new(0, 3, 0);
        assert!(foremost(&sg, fake, 2u32, None).is_err());
    }

    #[test]
    fn test_single_source_and_pairwise() {
        let sg = scenario_b();
        let from_a = foremost_from(&sg, 0u32, Some(0)).unwrap();
        assert_eq!(from_a[&0], 0);
        assert_eq!(from_a[&1], 3);
        assert_eq!(from_a[&2], 6);

        let table = shortest_pairwise(&sg).unwrap();
        assert_eq!(table[&(0, 2)], 2);
        assert_eq!(table[&(1, 1)], 0);
        // C's only way out delivers at 6, after A-B has closed
        assert!(!table.contains_key(&(2, 0)));
    }

    #[test]
    fn test_trips_delay_arrival() {
        let sg = StreamGraph::from_parts(
            (0, 10),
            vec![vec![0, 10], vec![0, 10]],
            vec![(0, 1)],
            vec![vec![2, 5]],
        )
        .unwrap()
        .with_trips(vec![vec![3]])
        .unwrap();
        assert_eq!(foremost(&sg, 0u32, 1u32, Some(0)).unwrap(), Some(8));
    }

    #[test]
    fn test_trip_beyond_peer_presence_is_unboardable() {
        let sg = StreamGraph::from_parts(
            (0, 10),
            vec![vec![0, 10], vec![0, 6]],
            vec![(0, 1)],
            vec![vec![2, 5]],
        )
        .unwrap()
        .with_trips(vec![vec![3]])
        .unwrap();
        // Delivery at 8 but node 1 departs at 6
        assert_eq!(foremost(&sg, 0u32, 1u32, Some(0)).unwrap(), None);
    }
}

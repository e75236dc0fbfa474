//! Temporal strongly connected components.
//!
//! A strong component is a maximal set of temporal nodes that stay mutually
//! reachable through present links over one time window: the window opens
//! when the member set forms and closes the instant its composition changes.
//! Internal link churn that neither merges nor splits the member set keeps
//! the window open.
//!
//! The sweep consumes the deterministic event order of [`crate::event`]:
//! at a shared instant nodes arrive first, then links arrive, links depart,
//! nodes depart. Each weakly connected slice of the stream is swept
//! independently under a fork-join pool; every task owns a disjoint slice
//! of segments, so no state is shared.

use crate::algo::union_find::UnionFind;
use crate::algo::Component;
use crate::error::Result;
use crate::interval::Interval;
use crate::segment::{SegmentArena, SegmentId, SegmentedNode};
use crate::stream::StreamGraph;
use crate::Time;
use rayon::prelude::*;
use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use tracing::debug;

/// One emitted strong cluster: a member set over one window.
#[derive(Debug, Clone)]
pub(crate) struct RawCluster {
    pub window: Interval,
    pub segments: Vec<SegmentId>,
}

/// Sweep product: clusters in emission order plus lineage edges (members of
/// the source flow into the target when the source window closes).
#[derive(Debug, Default)]
pub(crate) struct SweepOutput {
    pub clusters: Vec<RawCluster>,
    pub edges: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepEvent {
    NodeStart { time: Time, seg: SegmentId },
    LinkStart { time: Time, u: SegmentId, v: SegmentId },
    LinkEnd { time: Time, u: SegmentId, v: SegmentId },
    NodeEnd { time: Time, seg: SegmentId },
}

impl SweepEvent {
    fn order_key(&self) -> (Time, i8, SegmentId, SegmentId) {
        match *self {
            SweepEvent::NodeStart { time, seg } => (time, -2, seg, seg),
            SweepEvent::LinkStart { time, u, v } => (time, -1, u.min(v), u.max(v)),
            SweepEvent::LinkEnd { time, u, v } => (time, 1, u.min(v), u.max(v)),
            SweepEvent::NodeEnd { time, seg } => (time, 2, seg, seg),
        }
    }
}

struct OpenComp {
    start: Time,
    members: Vec<SegmentId>,
    preds: SmallVec<[usize; 2]>,
}

/// Sweep state over one weakly connected slice.
#[derive(Default)]
struct Sweep {
    open: Vec<Option<OpenComp>>,
    comp_of: HashMap<SegmentId, usize>,
    neighbors: HashMap<SegmentId, SmallVec<[SegmentId; 4]>>,
    edge_count: HashMap<(SegmentId, SegmentId), u32>,
    out: SweepOutput,
}

impl Sweep {
    fn open_comp(
        &mut self,
        start: Time,
        members: Vec<SegmentId>,
        preds: SmallVec<[usize; 2]>,
    ) {
        let idx = self.open.len();
        for &m in &members {
            self.comp_of.insert(m, idx);
        }
        self.open.push(Some(OpenComp {
            start,
            members,
            preds,
        }));
    }

    /// Close a component at `t`. A nonzero window is emitted as a cluster
    /// and becomes the single predecessor of its successors; a zero-length
    /// transient only hands its own predecessors on.
    fn close_comp(&mut self, idx: usize, t: Time) -> (Vec<SegmentId>, SmallVec<[usize; 2]>) {
        let comp = self.open[idx].take().expect("closing a closed component");
        if comp.start < t {
            let id = self.out.clusters.len();
            for &p in &comp.preds {
                self.out.edges.push((p, id));
            }
            let mut segments = comp.members.clone();
            segments.sort_unstable();
            self.out.clusters.push(RawCluster {
                window: Interval::new(comp.start, t),
                segments,
            });
            (comp.members, smallvec![id])
        } else {
            (comp.members, comp.preds)
        }
    }

    fn bfs(&self, from: SegmentId) -> Vec<SegmentId> {
        let mut seen: SmallVec<[SegmentId; 8]> = smallvec![from];
        let mut stack = vec![from];
        while let Some(s) = stack.pop() {
            if let Some(peers) = self.neighbors.get(&s) {
                for &p in peers {
                    if !seen.contains(&p) {
                        seen.push(p);
                        stack.push(p);
                    }
                }
            }
        }
        seen.into_vec()
    }

    fn handle(&mut self, event: SweepEvent) {
        match event {
            SweepEvent::NodeStart { time, seg } => {
                self.open_comp(time, vec![seg], SmallVec::new());
            }
            SweepEvent::LinkStart { time, u, v } => {
                let key = (u.min(v), u.max(v));
                let count = self.edge_count.entry(key).or_insert(0);
                *count += 1;
                if *count == 1 {
                    self.neighbors.entry(u).or_default().push(v);
                    self.neighbors.entry(v).or_default().push(u);
                }
                let (cu, cv) = (self.comp_of[&u], self.comp_of[&v]);
                if cu != cv {
                    let (mu, pu) = self.close_comp(cu, time);
                    let (mv, pv) = self.close_comp(cv, time);
                    let mut members = mu;
                    members.extend(mv);
                    let mut preds = pu;
                    preds.extend(pv);
                    self.open_comp(time, members, preds);
                }
            }
            SweepEvent::LinkEnd { time, u, v } => {
                let key = (u.min(v), u.max(v));
                let count = self
                    .edge_count
                    .get_mut(&key)
                    .expect("link end without matching start");
                *count -= 1;
                if *count > 0 {
                    return;
                }
                self.edge_count.remove(&key);
                if let Some(peers) = self.neighbors.get_mut(&u) {
                    peers.retain(|&mut p| p != v);
                }
                if let Some(peers) = self.neighbors.get_mut(&v) {
                    peers.retain(|&mut p| p != u);
                }
                let cu = self.comp_of[&u];
                let part = self.bfs(u);
                if part.contains(&v) {
                    // Still connected; internal churn keeps the window open
                    return;
                }
                let (members, preds) = self.close_comp(cu, time);
                let rest: Vec<SegmentId> =
                    members.into_iter().filter(|m| !part.contains(m)).collect();
                self.open_comp(time, part, preds.clone());
                self.open_comp(time, rest, preds);
            }
            SweepEvent::NodeEnd { time, seg } => {
                let cu = self.comp_of[&seg];
                let (members, preds) = self.close_comp(cu, time);
                self.comp_of.remove(&seg);
                self.neighbors.remove(&seg);
                let rest: Vec<SegmentId> =
                    members.into_iter().filter(|&m| m != seg).collect();
                if rest.is_empty() {
                    return;
                }
                // The departing segment had no live links (link ends sort
                // before node ends), so the remainder keeps its parts intact
                let mut remaining = rest;
                while let Some(&first) = remaining.first() {
                    let part = self.bfs(first);
                    remaining.retain(|m| !part.contains(m));
                    self.open_comp(time, part, preds.clone());
                }
            }
        }
    }
}

/// Sweep one slice of events, already sorted.
fn sweep_slice(events: &[SweepEvent]) -> SweepOutput {
    let mut sweep = Sweep::default();
    for &event in events {
        sweep.handle(event);
    }
    debug_assert!(sweep.open.iter().all(Option::is_none));
    sweep.out
}

/// Build the sweep event lists, one per weakly connected slice of the
/// stream, with the arena they index into.
fn slices(sg: &StreamGraph) -> Result<(SegmentArena, Vec<Vec<SweepEvent>>)> {
    let nb = sg.neighborhood()?;
    let mut uf = UnionFind::new(nb.len());
    for s in 0..nb.len() {
        for occurrence in nb.neighbors(s) {
            uf.union(s, occurrence.peer);
        }
    }
    let mut slice_of_root: HashMap<usize, usize> = HashMap::new();
    let mut slice_of_seg = vec![0usize; nb.len()];
    for s in 0..nb.len() {
        let root = uf.find(s);
        let next = slice_of_root.len();
        let slice = *slice_of_root.entry(root).or_insert(next);
        slice_of_seg[s] = slice;
    }

    let mut events: Vec<Vec<SweepEvent>> = vec![Vec::new(); slice_of_root.len()];
    let arena = nb.arena().clone();
    for (s, segment) in arena.iter() {
        events[slice_of_seg[s]].push(SweepEvent::NodeStart {
            time: segment.start,
            seg: s,
        });
        events[slice_of_seg[s]].push(SweepEvent::NodeEnd {
            time: segment.end,
            seg: s,
        });
    }
    for s in 0..nb.len() {
        for occurrence in nb.neighbors(s) {
            if occurrence.peer < s {
                continue; // each occurrence once
            }
            events[slice_of_seg[s]].push(SweepEvent::LinkStart {
                time: occurrence.interval.start,
                u: s,
                v: occurrence.peer,
            });
            events[slice_of_seg[s]].push(SweepEvent::LinkEnd {
                time: occurrence.interval.end,
                u: s,
                v: occurrence.peer,
            });
        }
    }
    for slice in &mut events {
        slice.sort_unstable_by_key(SweepEvent::order_key);
    }
    Ok((arena, events))
}

/// Run the condensation sweep over every weakly connected slice in
/// parallel and merge the outputs with offset ids.
pub(crate) fn condensation_sweep(sg: &StreamGraph) -> Result<(SegmentArena, SweepOutput)> {
    let (arena, slices) = slices(sg)?;
    debug!(slices = slices.len(), "sweeping strong components");
    let outputs: Vec<SweepOutput> = slices.par_iter().map(|s| sweep_slice(s)).collect();
    let mut merged = SweepOutput::default();
    for out in outputs {
        let offset = merged.clusters.len();
        merged.clusters.extend(out.clusters);
        merged
            .edges
            .extend(out.edges.into_iter().map(|(a, b)| (a + offset, b + offset)));
    }
    merged.edges.sort_unstable();
    merged.edges.dedup();
    Ok((arena, merged))
}

/// The strongly connected components of the stream: clusters of temporal
/// nodes sharing one time window.
pub fn strongly_connected_components(sg: &StreamGraph) -> Result<Vec<Component>> {
    let (arena, output) = condensation_sweep(sg)?;
    Ok(output
        .clusters
        .iter()
        .enumerate()
        .map(|(id, cluster)| {
            let members = cluster
                .segments
                .iter()
                .map(|&s| {
                    SegmentedNode::new(
                        cluster.window.start,
                        cluster.window.end,
                        arena.get(s).node,
                    )
                })
                .collect();
            Component::from_members(id, members)
        })
        .collect())
}

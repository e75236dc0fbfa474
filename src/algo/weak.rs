//! Weak and weakly-bounded connected components.
//!
//! Both treat links as undirected and connect segmented nodes through
//! overlapping link occurrences. WCC runs on maximal presence segments; WBCC
//! first re-segments every node at its activity bounds, so a node that goes
//! fully idle for a nonzero interval splits across components even though it
//! is the same topological node.

use crate::algo::union_find::UnionFind;
use crate::algo::Component;
use crate::degree;
use crate::error::{Error, Result};
use crate::interval::Interval;
use crate::segment::SegmentedNode;
use crate::stream::StreamGraph;
use crate::NodeId;
use smallvec::SmallVec;
use tracing::debug;

/// Iterative DFS over an index-list adjacency; returns the group of every
/// element, `usize::MAX` marking unvisited slots (none remain on return).
fn dfs_groups(adjacency: &[SmallVec<[usize; 4]>]) -> Vec<usize> {
    let n = adjacency.len();
    let mut group = vec![usize::MAX; n];
    let mut next_group = 0;
    let mut stack = Vec::new();
    for start in 0..n {
        if group[start] != usize::MAX {
            continue;
        }
        stack.push(start);
        group[start] = next_group;
        while let Some(v) = stack.pop() {
            for &w in &adjacency[v] {
                if group[w] == usize::MAX {
                    group[w] = next_group;
                    stack.push(w);
                }
            }
        }
        next_group += 1;
    }
    group
}

fn components_from_groups(
    groups: &[usize],
    segment_of: impl Fn(usize) -> SegmentedNode,
) -> Vec<Component> {
    let count = groups.iter().copied().max().map_or(0, |g| g + 1);
    let mut members: Vec<Vec<SegmentedNode>> = vec![Vec::new(); count];
    for (idx, &g) in groups.iter().enumerate() {
        members[g].push(segment_of(idx));
    }
    let mut components: Vec<Component> = members
        .into_iter()
        .filter(|m| !m.is_empty())
        .enumerate()
        .map(|(id, m)| Component::from_members(id, m))
        .collect();
    components.sort_unstable_by_key(|c| c.members[0]);
    for (id, c) in components.iter_mut().enumerate() {
        c.id = id;
    }
    components
}

/// Weakly connected components via iterative DFS over the
/// neighborhood-with-presence. `O(M)` in segmented link occurrences.
pub fn weakly_connected_components(sg: &StreamGraph) -> Result<Vec<Component>> {
    let nb = sg.neighborhood()?;
    debug!(segments = nb.len(), "computing weakly connected components");
    let adjacency: Vec<SmallVec<[usize; 4]>> = (0..nb.len())
        .map(|s| nb.neighbors(s).iter().map(|o| o.peer).collect())
        .collect();
    let groups = dfs_groups(&adjacency);
    Ok(components_from_groups(&groups, |s| nb.arena().get(s)))
}

/// Weakly connected components via an explicit union-find, merging as links
/// are discovered. Produces the same partition as the DFS strategy with a
/// different amortized cost profile.
pub fn weakly_connected_components_union_find(sg: &StreamGraph) -> Result<Vec<Component>> {
    let nb = sg.neighborhood()?;
    let mut uf = UnionFind::new(nb.len());
    for s in 0..nb.len() {
        for occurrence in nb.neighbors(s) {
            uf.union(s, occurrence.peer);
        }
    }
    let mut group = vec![usize::MAX; nb.len()];
    let mut next = 0;
    for s in 0..nb.len() {
        let root = uf.find(s);
        if group[root] == usize::MAX {
            group[root] = next;
            next += 1;
        }
        group[s] = group[root];
    }
    Ok(components_from_groups(&group, |s| nb.arena().get(s)))
}

/// One piece of the bounds-driven node partition used by WBCC.
#[derive(Debug, Clone, Copy)]
struct Piece {
    span: Interval,
    node: NodeId,
    active: bool,
}

/// Weakly *bounded* connected components: a strictly finer partition than
/// WCC. Presence is first re-segmented into maximal runs of strictly
/// positive degree; idle pieces become singleton clusters.
pub fn weakly_bounded_connected_components(sg: &StreamGraph) -> Result<Vec<Component>> {
    let bounds = degree::activity_bounds(sg);

    // Subdivide every presence span at its bound boundaries.
    let mut pieces: Vec<Piece> = Vec::new();
    let mut offsets = vec![0usize];
    for n in sg.nodes() {
        let presence = sg.node_presence(n)?;
        for span in presence.iter() {
            let mut cursor = span.start;
            for run in bounds[n as usize].iter().filter(|r| span.contains(r)) {
                if cursor < run.start {
                    pieces.push(Piece {
                        span: Interval::new(cursor, run.start),
                        node: n,
                        active: false,
                    });
                }
                pieces.push(Piece {
                    span: *run,
                    node: n,
                    active: true,
                });
                cursor = run.end;
            }
            if cursor < span.end {
                pieces.push(Piece {
                    span: Interval::new(cursor, span.end),
                    node: n,
                    active: false,
                });
            }
        }
        offsets.push(pieces.len());
    }

    let locate = |n: NodeId, span: &Interval| -> Result<usize> {
        let range = offsets[n as usize]..offsets[n as usize + 1];
        let slice = &pieces[range.clone()];
        let idx = slice.partition_point(|p| p.span.end < span.start);
        slice
            .get(idx)
            .filter(|p| p.active && p.span.contains(span))
            .map(|_| range.start + idx)
            .ok_or_else(|| Error::Integrity {
                u: n,
                v: n,
                interval: *span,
                reason: "link occurrence outside the node's activity bounds".into(),
            })
    };

    let mut adjacency: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); pieces.len()];
    for (l, link) in sg.links().iter().enumerate() {
        for span in sg.link_presence(l)?.iter() {
            let pu = locate(link.u, span)?;
            let pv = locate(link.v, span)?;
            adjacency[pu].push(pv);
            adjacency[pv].push(pu);
        }
    }

    let groups = dfs_groups(&adjacency);
    Ok(components_from_groups(&groups, |p| {
        SegmentedNode::new(pieces[p].span.start, pieces[p].span.end, pieces[p].node)
    }))
}

//! Condensation DAG and its decompositions.
//!
//! Nodes are strongly connected clusters (a node set over one window);
//! directed edges carry time-respecting reachability: members of a closing
//! cluster flow into its successors. Acyclic by construction — every edge
//! strictly advances the window start.
//!
//! k-core and k-clique work is independent per DAG node once the DAG is
//! fixed, and runs under a rayon fork-join pool.

use crate::algo::strong::condensation_sweep;
use crate::algo::union_find::UnionFind;
use crate::algo::Component;
use crate::error::Result;
use crate::interval::Interval;
use crate::segment::SegmentedNode;
use crate::stream::StreamGraph;
use crate::{NodeId, Time};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// One strongly connected cluster in the condensation.
#[derive(Debug, Clone)]
pub struct DagNode {
    /// Dense id inside the DAG.
    pub id: usize,
    /// Validity window of the cluster.
    pub window: Interval,
    /// Distinct member nodes, sorted.
    pub nodes: Vec<NodeId>,
    /// The maximal presence segments the members come from.
    pub segments: Vec<SegmentedNode>,
}

impl DagNode {
    /// The cluster shape: the window applied to every member.
    pub fn cluster(&self) -> Vec<SegmentedNode> {
        self.nodes
            .iter()
            .map(|&n| SegmentedNode::new(self.window.start, self.window.end, n))
            .collect()
    }
}

/// The condensation of a stream graph into strongly connected clusters.
#[derive(Debug, Clone)]
pub struct CondensationDag {
    nodes: Vec<DagNode>,
    succ: Vec<SmallVec<[usize; 4]>>,
    pred: Vec<SmallVec<[usize; 4]>>,
    times: Interval,
}

impl CondensationDag {
    /// Build the condensation of a stream, sweeping each weakly connected
    /// slice in parallel.
    pub fn build(sg: &StreamGraph) -> Result<Self> {
        let (arena, output) = condensation_sweep(sg)?;
        let nodes: Vec<DagNode> = output
            .clusters
            .iter()
            .enumerate()
            .map(|(id, cluster)| {
                let segments: Vec<SegmentedNode> =
                    cluster.segments.iter().map(|&s| arena.get(s)).collect();
                let mut members: Vec<NodeId> = segments.iter().map(|s| s.node).collect();
                members.sort_unstable();
                members.dedup();
                DagNode {
                    id,
                    window: cluster.window,
                    nodes: members,
                    segments,
                }
            })
            .collect();
        let mut dag = Self::from_nodes_and_edges(nodes, &output.edges);
        debug!(clusters = dag.len(), "condensation built");
        dag.times = dag
            .nodes
            .iter()
            .map(|n| n.window)
            .reduce(|a, b| a.envelope(&b))
            .unwrap_or(sg.times());
        Ok(dag)
    }

    fn from_nodes_and_edges(nodes: Vec<DagNode>, edges: &[(usize, usize)]) -> Self {
        let mut succ: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); nodes.len()];
        let mut pred: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); nodes.len()];
        for &(a, b) in edges {
            succ[a].push(b);
            pred[b].push(a);
        }
        Self {
            nodes,
            succ,
            pred,
            times: Interval::new(0, 0),
        }
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the DAG is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Envelope of all cluster windows.
    pub fn times(&self) -> Interval {
        self.times
    }

    /// All clusters in id order.
    pub fn nodes(&self) -> &[DagNode] {
        &self.nodes
    }

    /// One cluster.
    pub fn node(&self, id: usize) -> &DagNode {
        &self.nodes[id]
    }

    /// Clusters the members of `id` flow into.
    pub fn successors(&self, id: usize) -> &[usize] {
        &self.succ[id]
    }

    /// Clusters flowing into `id`.
    pub fn predecessors(&self, id: usize) -> &[usize] {
        &self.pred[id]
    }

    /// The strong component partition as [`Component`] objects.
    pub fn components(&self) -> Vec<Component> {
        self.nodes
            .iter()
            .map(|n| Component::from_members(n.id, n.cluster()))
            .collect()
    }

    /// Map each maximal presence segment to the clusters it participates
    /// in, in window order.
    pub fn segment_index(&self) -> HashMap<SegmentedNode, Vec<usize>> {
        let mut index: HashMap<SegmentedNode, Vec<usize>> = HashMap::new();
        for node in &self.nodes {
            for &segment in &node.segments {
                index.entry(segment).or_default().push(node.id);
            }
        }
        for ids in index.values_mut() {
            ids.sort_unstable_by_key(|&id| self.nodes[id].window);
        }
        index
    }

    /// Every cluster reachable from `id` through time-respecting flow.
    pub fn descendants(&self, id: usize) -> Vec<usize> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![id];
        let mut out = Vec::new();
        seen[id] = true;
        while let Some(x) = stack.pop() {
            for &y in &self.succ[x] {
                if !seen[y] {
                    seen[y] = true;
                    out.push(y);
                    stack.push(y);
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// Contract chains of clusters covering the same node set across
    /// contiguous windows — the compact stable DAG.
    pub fn stable_dag(&self) -> CondensationDag {
        let mut uf = UnionFind::new(self.nodes.len());
        for (a, succs) in self.succ.iter().enumerate() {
            for &b in succs {
                if self.nodes[a].nodes == self.nodes[b].nodes
                    && self.nodes[a].window.end == self.nodes[b].window.start
                {
                    uf.union(a, b);
                }
            }
        }
        let groups = uf.partition();
        let mut group_of = vec![0usize; self.nodes.len()];
        for (g, members) in groups.iter().enumerate() {
            for &m in members {
                group_of[m] = g;
            }
        }
        let nodes: Vec<DagNode> = groups
            .iter()
            .enumerate()
            .map(|(id, members)| {
                let window = members
                    .iter()
                    .map(|&m| self.nodes[m].window)
                    .reduce(|a, b| a.envelope(&b))
                    .expect("group is nonempty");
                let mut segments: Vec<SegmentedNode> = members
                    .iter()
                    .flat_map(|&m| self.nodes[m].segments.iter().copied())
                    .collect();
                segments.sort_unstable();
                segments.dedup();
                DagNode {
                    id,
                    window,
                    nodes: self.nodes[members[0]].nodes.clone(),
                    segments,
                }
            })
            .collect();
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (a, succs) in self.succ.iter().enumerate() {
            for &b in succs {
                let (ga, gb) = (group_of[a], group_of[b]);
                if ga != gb {
                    edges.push((ga, gb));
                }
            }
        }
        edges.sort_unstable();
        edges.dedup();
        let mut dag = Self::from_nodes_and_edges(nodes, &edges);
        dag.times = self.times;
        dag
    }

    // ------------------------------------------------------------------
    // k-core / k-clique
    // ------------------------------------------------------------------

    /// The temporal k-core: every kept temporal-node piece has at least `k`
    /// neighbors within its cluster at every instant of the piece.
    pub fn k_core(&self, sg: &StreamGraph, k: u32) -> Result<Vec<SegmentedNode>> {
        let per_node: Vec<Vec<(Interval, NodeId)>> = self
            .nodes
            .par_iter()
            .map(|node| {
                let occs = member_link_occurrences(sg, node);
                sub_windows(&node.window, &occs)
                    .into_iter()
                    .flat_map(|sw| {
                        let adj = window_adjacency(node, &occs, &sw);
                        peel_k_core(&adj, k)
                            .into_iter()
                            .map(move |n| (sw, n))
                            .collect::<Vec<_>>()
                    })
                    .collect()
            })
            .collect();
        Ok(merge_pieces(per_node.into_iter().flatten()))
    }

    /// Core number of every temporal-node piece, grouped by core value.
    pub fn core_number(&self, sg: &StreamGraph) -> Result<BTreeMap<u32, Vec<SegmentedNode>>> {
        let per_node: Vec<Vec<(u32, Interval, NodeId)>> = self
            .nodes
            .par_iter()
            .map(|node| {
                let occs = member_link_occurrences(sg, node);
                let mut out = Vec::new();
                for sw in sub_windows(&node.window, &occs) {
                    let adj = window_adjacency(node, &occs, &sw);
                    for (n, core) in core_numbers(&adj) {
                        out.push((core, sw, n));
                    }
                }
                out
            })
            .collect();
        let mut by_core: BTreeMap<u32, Vec<(Interval, NodeId)>> = BTreeMap::new();
        for (core, sw, n) in per_node.into_iter().flatten() {
            by_core.entry(core).or_default().push((sw, n));
        }
        Ok(by_core
            .into_iter()
            .map(|(core, pieces)| (core, merge_pieces(pieces.into_iter())))
            .collect())
    }

    /// Time-averaged core number over all node presence.
    pub fn average_core_size(&self, sg: &StreamGraph) -> Result<f64> {
        let denom = sg.nb_nodes() as f64 * sg.duration() as f64;
        if denom == 0.0 {
            return Ok(0.0);
        }
        let weighted: f64 = self
            .core_number(sg)?
            .into_iter()
            .map(|(core, pieces)| {
                let mass: Time = pieces.iter().map(|p| p.interval().duration()).sum();
                f64::from(core) * mass as f64
            })
            .sum();
        Ok(weighted / denom)
    }

    /// All maximal cliques of at least two nodes, keyed by size. Each entry
    /// is the clique's node set over one constant-adjacency window.
    pub fn all_cliques(
        &self,
        sg: &StreamGraph,
    ) -> Result<BTreeMap<usize, Vec<(Interval, Vec<NodeId>)>>> {
        let per_node: Vec<Vec<(Interval, Vec<NodeId>)>> = self
            .nodes
            .par_iter()
            .map(|node| {
                let occs = member_link_occurrences(sg, node);
                let mut out = Vec::new();
                for sw in sub_windows(&node.window, &occs) {
                    let adj = window_adjacency(node, &occs, &sw);
                    for clique in maximal_cliques(&adj) {
                        out.push((sw, clique));
                    }
                }
                out
            })
            .collect();
        let mut by_size: BTreeMap<usize, Vec<(Interval, Vec<NodeId>)>> = BTreeMap::new();
        for (sw, clique) in per_node.into_iter().flatten() {
            by_size.entry(clique.len()).or_default().push((sw, clique));
        }
        Ok(by_size)
    }

    /// Maximal cliques of at least `k` nodes.
    pub fn k_cliques(
        &self,
        sg: &StreamGraph,
        k: usize,
    ) -> Result<Vec<(Interval, Vec<NodeId>)>> {
        Ok(self
            .all_cliques(sg)?
            .into_iter()
            .filter(|(size, _)| *size >= k)
            .flat_map(|(_, cliques)| cliques)
            .collect())
    }

    /// Largest clique size present anywhere in the stream.
    pub fn max_clique_number(&self, sg: &StreamGraph) -> Result<usize> {
        Ok(self
            .all_cliques(sg)?
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0))
    }
}

/// Keep, for every temporal-node piece, only its largest clique: iterate
/// cliques by descending size and let the first claim win.
pub fn max_clique_membership(
    cliques: &BTreeMap<usize, Vec<(Interval, Vec<NodeId>)>>,
) -> HashMap<SegmentedNode, usize> {
    let mut claimed: HashMap<SegmentedNode, usize> = HashMap::new();
    for (&size, entries) in cliques.iter().rev() {
        for (window, nodes) in entries {
            for &n in nodes {
                claimed
                    .entry(SegmentedNode::new(window.start, window.end, n))
                    .or_insert(size);
            }
        }
    }
    claimed
}

/// Link occurrences internal to a cluster, clipped to its window.
fn member_link_occurrences(
    sg: &StreamGraph,
    node: &DagNode,
) -> Vec<(Interval, NodeId, NodeId)> {
    let members: HashSet<NodeId> = node.nodes.iter().copied().collect();
    let mut occs = Vec::new();
    for (l, link) in sg.links().iter().enumerate() {
        if !members.contains(&link.u) || !members.contains(&link.v) {
            continue;
        }
        let presence = sg.link_presence(l).expect("link id in range");
        for span in presence.iter() {
            if let Some(clipped) = span.intersect(&node.window) {
                occs.push((clipped, link.u, link.v));
            }
        }
    }
    occs
}

/// Constant-adjacency sub-windows of a cluster window.
fn sub_windows(window: &Interval, occs: &[(Interval, NodeId, NodeId)]) -> Vec<Interval> {
    let mut bounds: Vec<Time> = vec![window.start, window.end];
    for (span, _, _) in occs {
        bounds.push(span.start);
        bounds.push(span.end);
    }
    bounds.sort_unstable();
    bounds.dedup();
    bounds
        .windows(2)
        .map(|pair| Interval::new(pair[0], pair[1]))
        .collect()
}

/// Adjacency among cluster members over one sub-window.
fn window_adjacency(
    node: &DagNode,
    occs: &[(Interval, NodeId, NodeId)],
    sw: &Interval,
) -> HashMap<NodeId, HashSet<NodeId>> {
    let mut adj: HashMap<NodeId, HashSet<NodeId>> =
        node.nodes.iter().map(|&n| (n, HashSet::new())).collect();
    for (span, u, v) in occs {
        if span.contains(sw) {
            adj.get_mut(u).expect("member").insert(*v);
            adj.get_mut(v).expect("member").insert(*u);
        }
    }
    adj
}

/// Peel nodes of induced degree below `k` to fixpoint; returns survivors,
/// sorted.
fn peel_k_core(adj: &HashMap<NodeId, HashSet<NodeId>>, k: u32) -> Vec<NodeId> {
    let mut degree: HashMap<NodeId, u32> =
        adj.iter().map(|(&n, peers)| (n, peers.len() as u32)).collect();
    let mut removed: HashSet<NodeId> = HashSet::new();
    let mut queue: Vec<NodeId> = degree
        .iter()
        .filter(|(_, &d)| d < k)
        .map(|(&n, _)| n)
        .collect();
    while let Some(n) = queue.pop() {
        if !removed.insert(n) {
            continue;
        }
        for &peer in &adj[&n] {
            if removed.contains(&peer) {
                continue;
            }
            let d = degree.get_mut(&peer).expect("member");
            *d -= 1;
            if *d < k {
                queue.push(peer);
            }
        }
    }
    let mut survivors: Vec<NodeId> = adj
        .keys()
        .copied()
        .filter(|n| !removed.contains(n))
        .collect();
    survivors.sort_unstable();
    survivors
}

/// Core number of every node of one static slice.
fn core_numbers(adj: &HashMap<NodeId, HashSet<NodeId>>) -> Vec<(NodeId, u32)> {
    let mut out = Vec::new();
    let mut assigned: HashSet<NodeId> = HashSet::new();
    let mut k = 0;
    loop {
        let survivors = peel_k_core(adj, k + 1);
        for &n in adj.keys() {
            if !assigned.contains(&n) && !survivors.contains(&n) {
                out.push((n, k));
                assigned.insert(n);
            }
        }
        if survivors.is_empty() {
            break;
        }
        k += 1;
    }
    out
}

/// Bron-Kerbosch with pivoting; maximal cliques of size >= 2.
fn maximal_cliques(adj: &HashMap<NodeId, HashSet<NodeId>>) -> Vec<Vec<NodeId>> {
    fn extend(
        adj: &HashMap<NodeId, HashSet<NodeId>>,
        r: &mut Vec<NodeId>,
        mut p: HashSet<NodeId>,
        mut x: HashSet<NodeId>,
        out: &mut Vec<Vec<NodeId>>,
    ) {
        if p.is_empty() && x.is_empty() {
            if r.len() >= 2 {
                let mut clique = r.clone();
                clique.sort_unstable();
                out.push(clique);
            }
            return;
        }
        let pivot = p
            .iter()
            .chain(x.iter())
            .copied()
            .max_by_key(|n| adj[n].intersection(&p).count())
            .expect("p or x nonempty");
        let candidates: Vec<NodeId> = p.difference(&adj[&pivot]).copied().collect();
        for n in candidates {
            r.push(n);
            let p_next: HashSet<NodeId> = p.intersection(&adj[&n]).copied().collect();
            let x_next: HashSet<NodeId> = x.intersection(&adj[&n]).copied().collect();
            extend(adj, r, p_next, x_next, out);
            r.pop();
            p.remove(&n);
            x.insert(n);
        }
    }

    let mut out = Vec::new();
    let p: HashSet<NodeId> = adj.keys().copied().collect();
    extend(adj, &mut Vec::new(), p, HashSet::new(), &mut out);
    out.sort_unstable();
    out
}

/// Merge time-adjacent `(window, node)` pieces into maximal segments.
fn merge_pieces(pieces: impl Iterator<Item = (Interval, NodeId)>) -> Vec<SegmentedNode> {
    let mut sorted: Vec<(NodeId, Interval)> = pieces.map(|(w, n)| (n, w)).collect();
    sorted.sort_unstable();
    let mut out: Vec<SegmentedNode> = Vec::new();
    for (n, w) in sorted {
        match out.last_mut() {
            Some(last) if last.node == n && last.end == w.start => last.end = w.end,
            _ => out.push(SegmentedNode::new(w.start, w.end, n)),
        }
    }
    out.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> StreamGraph {
        StreamGraph::from_parts(
            (0, 10),
            vec![vec![0, 10], vec![0, 10]],
            vec![(0, 1)],
            vec![vec![2, 5]],
        )
        .unwrap()
    }

    /// Triangle 0-1-2 on [2,8], plus a pendant 3 attached on [4,6].
    fn triangle() -> StreamGraph {
        StreamGraph::from_parts(
            (0, 10),
            vec![vec![0, 10], vec![0, 10], vec![0, 10], vec![0, 10]],
            vec![(0, 1), (1, 2), (0, 2), (2, 3)],
            vec![vec![2, 8], vec![2, 8], vec![2, 8], vec![4, 6]],
        )
        .unwrap()
    }

    #[test]
    fn test_dag_edges_advance_in_time() {
        let dag = CondensationDag::build(&scenario_a()).unwrap();
        assert_eq!(dag.len(), 5);
        for node in dag.nodes() {
            for &s in dag.successors(node.id) {
                assert_eq!(dag.node(s).window.start, node.window.end);
            }
        }
    }

    #[test]
    fn test_segment_index() {
        let dag = CondensationDag::build(&scenario_a()).unwrap();
        let index = dag.segment_index();
        let ids = &index[&SegmentedNode::new(0, 10, 0)];
        // Node 0's single segment traverses three clusters
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_stable_dag_contracts_chains() {
        // Node 2 joins and leaves: the {0,1} cluster splits at 4 and 6,
        // but both {0,1,...} windows around the pendant share no contraction
        let sg = triangle();
        let dag = CondensationDag::build(&sg).unwrap();
        let stable = dag.stable_dag();
        assert!(stable.len() <= dag.len());
        // Contracting preserves total cluster mass
        let mass = |d: &CondensationDag| -> Time {
            d.nodes()
                .iter()
                .map(|n| n.window.duration() * n.nodes.len() as Time)
                .sum()
        };
        assert_eq!(mass(&dag), mass(&stable));
    }

    #[test]
    fn test_k_core_triangle() {
        let sg = triangle();
        let dag = CondensationDag::build(&sg).unwrap();
        let core2 = dag.k_core(&sg, 2).unwrap();
        // The triangle is a 2-core over its whole lifetime; the pendant
        // never reaches degree 2
        assert!(core2.contains(&SegmentedNode::new(2, 8, 0)));
        assert!(core2.contains(&SegmentedNode::new(2, 8, 1)));
        assert!(core2.contains(&SegmentedNode::new(2, 8, 2)));
        assert!(!core2.iter().any(|s| s.node == 3));
    }

    #[test]
    fn test_core_number() {
        let sg = triangle();
        let dag = CondensationDag::build(&sg).unwrap();
        let cores = dag.core_number(&sg).unwrap();
        assert!(cores[&2].contains(&SegmentedNode::new(2, 8, 0)));
        assert!(cores[&1].contains(&SegmentedNode::new(4, 6, 3)));
    }

    #[test]
    fn test_cliques() {
        let sg = triangle();
        let dag = CondensationDag::build(&sg).unwrap();
        let cliques = dag.all_cliques(&sg).unwrap();
        assert!(cliques[&3]
            .iter()
            .any(|(w, nodes)| *w == Interval::new(2, 4) && nodes == &vec![0, 1, 2]));
        assert_eq!(dag.max_clique_number(&sg).unwrap(), 3);

        let membership = max_clique_membership(&cliques);
        // Node 2 sits in the triangle, not in its pendant pair
        assert_eq!(membership[&SegmentedNode::new(4, 6, 2)], 3);
        assert_eq!(membership[&SegmentedNode::new(4, 6, 3)], 2);
    }

    #[test]
    fn test_descendants() {
        let dag = CondensationDag::build(&scenario_a()).unwrap();
        let pair = dag
            .nodes()
            .iter()
            .find(|n| n.nodes.len() == 2)
            .expect("pair cluster");
        assert_eq!(dag.descendants(pair.id).len(), 2);
        assert_eq!(dag.predecessors(pair.id).len(), 2);
    }
}

//! Stable windows and stable connected components.
//!
//! A stable window is a maximal span over which the set of present links and
//! nodes does not change, so node-to-node adjacency is constant. Static
//! graph work is applied once per stable window, not once per event, then
//! re-expanded onto temporal nodes — stable windows are far fewer than raw
//! events on low-churn datasets.

use crate::algo::union_find::UnionFind;
use crate::algo::Component;
use crate::event::LinkId;
use crate::interval::Interval;
use crate::segment::SegmentedNode;
use crate::stream::StreamGraph;
use crate::{NodeId, Time};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{EdgeRef, NodeIndexable};
use std::collections::HashMap;
use tracing::debug;

/// An injected capability computing some property of one static time-slice.
///
/// The core hands the analyzer one induced graph per stable window and never
/// depends on its internals; generic per-window properties (centralities,
/// community detection, ...) live behind this seam.
pub trait StaticGraphAnalyzer {
    type Output;

    /// Analyze the static graph valid over `window`. Node weights are the
    /// stream's node ids, edge weights the carrying link ids.
    fn analyze(&self, window: Interval, graph: &UnGraph<NodeId, LinkId>) -> Self::Output;
}

impl<F, O> StaticGraphAnalyzer for F
where
    F: Fn(Interval, &UnGraph<NodeId, LinkId>) -> O,
{
    type Output = O;

    fn analyze(&self, window: Interval, graph: &UnGraph<NodeId, LinkId>) -> O {
        self(window, graph)
    }
}

/// The maximal constant-adjacency windows of the stream, in time order.
/// Every presence endpoint is a boundary; between two consecutive distinct
/// event times both the link set and the node set are constant.
pub fn stable_windows(sg: &StreamGraph) -> Vec<Interval> {
    let mut times: Vec<Time> = Vec::new();
    for n in sg.nodes() {
        for span in sg.node_presence(n).expect("node id from iteration").iter() {
            times.push(span.start);
            times.push(span.end);
        }
    }
    for l in 0..sg.nb_links() {
        for span in sg.link_presence(l).expect("link id in range").iter() {
            times.push(span.start);
            times.push(span.end);
        }
    }
    times.sort_unstable();
    times.dedup();
    times
        .windows(2)
        .map(|pair| Interval::new(pair[0], pair[1]))
        .collect()
}

/// The static graph induced on one stable window.
fn window_graph(sg: &StreamGraph, window: &Interval) -> UnGraph<NodeId, LinkId> {
    let mut graph = UnGraph::new_undirected();
    let mut index: HashMap<NodeId, NodeIndex> = HashMap::new();
    for n in sg.nodes() {
        let presence = sg.node_presence(n).expect("node id from iteration");
        if presence.span_containing(window).is_some() {
            index.insert(n, graph.add_node(n));
        }
    }
    for (l, link) in sg.links().iter().enumerate() {
        let presence = sg.link_presence(l).expect("link id in range");
        if presence.span_containing(window).is_some() {
            if let (Some(&a), Some(&b)) = (index.get(&link.u), index.get(&link.v)) {
                graph.add_edge(a, b, l);
            }
        }
    }
    graph
}

/// One static induced graph per stable window, tagged with its validity
/// interval.
pub fn stable_snapshots(sg: &StreamGraph) -> Vec<(Interval, UnGraph<NodeId, LinkId>)> {
    let windows = stable_windows(sg);
    debug!(windows = windows.len(), "materializing stable snapshots");
    windows
        .into_iter()
        .map(|w| {
            let graph = window_graph(sg, &w);
            (w, graph)
        })
        .collect()
}

/// Stable connected components: the connected components of each stable
/// window's induced graph, tagged with the window. Present-but-isolated
/// nodes form singleton clusters.
pub fn stable_connected_components(sg: &StreamGraph) -> Vec<Component> {
    let mut components = Vec::new();
    for (window, graph) in stable_snapshots(sg) {
        let n = graph.node_bound();
        if n == 0 {
            continue;
        }
        let mut uf = UnionFind::new(n);
        for edge in graph.edge_references() {
            uf.union(graph.to_index(edge.source()), graph.to_index(edge.target()));
        }
        let mut by_root: HashMap<usize, Vec<SegmentedNode>> = HashMap::new();
        for idx in graph.node_indices() {
            let root = uf.find(graph.to_index(idx));
            by_root
                .entry(root)
                .or_default()
                .push(SegmentedNode::new(window.start, window.end, graph[idx]));
        }
        let mut groups: Vec<Vec<SegmentedNode>> = by_root.into_values().collect();
        groups.sort_unstable_by_key(|g| g.iter().copied().min());
        for members in groups {
            let id = components.len();
            components.push(Component::from_members(id, members));
        }
    }
    components
}

/// Apply an analyzer once per stable window. Returns per-window outputs in
/// time order.
pub fn analyze_windows<A: StaticGraphAnalyzer>(
    sg: &StreamGraph,
    analyzer: &A,
) -> Vec<(Interval, A::Output)> {
    stable_snapshots(sg)
        .into_iter()
        .map(|(window, graph)| {
            let out = analyzer.analyze(window, &graph);
            (window, out)
        })
        .collect()
}

/// Apply a per-node analyzer once per stable window and re-expand the
/// results onto maximal temporal nodes: each segment collects the window
/// slices of the value its node held.
pub fn analyze_per_node<V, A>(
    sg: &StreamGraph,
    analyzer: &A,
) -> HashMap<SegmentedNode, Vec<(Interval, V)>>
where
    A: StaticGraphAnalyzer<Output = HashMap<NodeId, V>>,
{
    let arena = sg.segments();
    let mut expanded: HashMap<SegmentedNode, Vec<(Interval, V)>> = HashMap::new();
    for (window, values) in analyze_windows(sg, analyzer) {
        for (n, value) in values {
            if let Some(id) = arena.locate(n, &window) {
                expanded.entry(arena.get(id)).or_default().push((window, value));
            }
        }
    }
    for slices in expanded.values_mut() {
        slices.sort_unstable_by_key(|(w, _)| *w);
    }
    expanded
}

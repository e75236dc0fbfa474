//! Stream graph storage.
//!
//! A [`StreamGraph`] owns its nodes and links together with their presence
//! intervals over a global time domain. Every derived structure (segments,
//! components, DAGs, path results) is a read-only view rebuilt from this
//! data, never mutated in place.
//!
//! The mutation methods take `&mut self` and the analyses take `&self`: the
//! exclusive-writer/shared-readers contract is enforced by the borrow
//! checker on the caller's side.

use crate::error::{Error, Result};
use crate::event::{Event, LinkEvent, LinkId};
use crate::interval::{Interval, IntervalSeq};
use crate::segment::{SegmentArena, SegmentId};
use crate::{NodeId, Time};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::debug;

/// An unordered node pair. Stored as `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub u: NodeId,
    pub v: NodeId,
}

impl Link {
    /// Create a link, normalizing endpoint order.
    pub fn new(u: NodeId, v: NodeId) -> Self {
        if u <= v {
            Self { u, v }
        } else {
            Self { u: v, v: u }
        }
    }

    /// The endpoint opposite to `n`.
    pub fn other(&self, n: NodeId) -> NodeId {
        if n == self.u {
            self.v
        } else {
            self.u
        }
    }
}

/// A graph whose nodes and links exist over unions of disjoint time
/// intervals inside a global time domain `[alpha, omega]`.
///
/// Built once at ingestion from the parallel collections of the loader
/// contract; optional per-link-interval weights and traversal durations
/// ("trips") align positionally with each link's interval list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamGraph {
    times: Interval,
    node_presence: Vec<IntervalSeq>,
    links: Vec<Link>,
    link_presence: Vec<IntervalSeq>,
    weights: Option<Vec<Vec<f64>>>,
    trips: Option<Vec<Vec<Time>>>,
    labels: Option<Vec<String>>,
}

impl StreamGraph {
    /// Build a stream graph from the ingestion contract: a time domain, one
    /// flattened `[t0,t1,...]` presence list per node, the link pairs, and
    /// one flattened presence list per link.
    ///
    /// Presence lists are normalized (sorted, overlapping/adjacent spans
    /// merged); misaligned collections are a configuration error. Link
    /// containment in endpoint presence is *not* checked here — call
    /// [`StreamGraph::check_integrity`] before analysis.
    pub fn from_parts(
        times: (Time, Time),
        node_presence: Vec<Vec<Time>>,
        links: Vec<(NodeId, NodeId)>,
        link_presence: Vec<Vec<Time>>,
    ) -> Result<Self> {
        if times.0 > times.1 {
            return Err(Error::Configuration(format!(
                "time domain [{}, {}] is reversed",
                times.0, times.1
            )));
        }
        if links.len() != link_presence.len() {
            return Err(Error::Configuration(format!(
                "{} links but {} link presence lists",
                links.len(),
                link_presence.len()
            )));
        }
        let n = node_presence.len() as u32;
        let node_presence = node_presence
            .iter()
            .map(|flat| IntervalSeq::from_flat(flat))
            .collect::<Result<Vec<_>>>()?;
        let mut normalized_links = Vec::with_capacity(links.len());
        for &(u, v) in &links {
            if u >= n {
                return Err(Error::UnknownNode(u));
            }
            if v >= n {
                return Err(Error::UnknownNode(v));
            }
            if u == v {
                return Err(Error::Configuration(format!("self-loop on node {u}")));
            }
            normalized_links.push(Link::new(u, v));
        }
        let link_presence = link_presence
            .iter()
            .map(|flat| IntervalSeq::from_flat(flat))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            times: Interval::new(times.0, times.1),
            node_presence,
            links: normalized_links,
            link_presence,
            weights: None,
            trips: None,
            labels: None,
        })
    }

    /// Attach per-link-interval weights, positionally aligned with each
    /// link's interval list.
    pub fn with_weights(mut self, weights: Vec<Vec<f64>>) -> Result<Self> {
        self.check_aligned(&weights, "weight")?;
        self.weights = Some(weights);
        Ok(self)
    }

    /// Attach per-link-interval traversal durations.
    pub fn with_trips(mut self, trips: Vec<Vec<Time>>) -> Result<Self> {
        self.check_aligned(&trips, "trip")?;
        self.trips = Some(trips);
        Ok(self)
    }

    /// Attach display labels, one per node.
    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self> {
        if labels.len() != self.node_presence.len() {
            return Err(Error::Configuration(format!(
                "{} labels for {} nodes",
                labels.len(),
                self.node_presence.len()
            )));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    fn check_aligned<T>(&self, attr: &[Vec<T>], what: &str) -> Result<()> {
        if attr.len() != self.links.len() {
            return Err(Error::Configuration(format!(
                "{} {what} lists for {} links",
                attr.len(),
                self.links.len()
            )));
        }
        for (l, (values, presence)) in attr.iter().zip(&self.link_presence).enumerate() {
            if values.len() != presence.len() {
                return Err(Error::Configuration(format!(
                    "link {l} has {} intervals but {} {what} values",
                    presence.len(),
                    values.len()
                )));
            }
        }
        Ok(())
    }

    /// Check that every link interval is contained in the intersection of
    /// both endpoints' presence. A violation is fatal; no algorithm should
    /// run on a stream that fails this.
    pub fn check_integrity(&self) -> Result<()> {
        for (l, presence) in self.link_presence.iter().enumerate() {
            let link = self.links[l];
            for span in presence.iter() {
                for end in [link.u, link.v] {
                    if self.node_presence[end as usize].span_containing(span).is_none() {
                        return Err(Error::Integrity {
                            u: link.u,
                            v: link.v,
                            interval: *span,
                            reason: format!("no presence of node {end} contains the link span"),
                        });
                    }
                }
            }
        }
        debug!(
            nodes = self.node_presence.len(),
            links = self.links.len(),
            "integrity check passed"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Global time domain `[alpha, omega]`.
    pub fn times(&self) -> Interval {
        self.times
    }

    /// Number of distinct nodes.
    pub fn nb_nodes(&self) -> usize {
        self.node_presence.len()
    }

    /// Number of distinct links.
    pub fn nb_links(&self) -> usize {
        self.links.len()
    }

    /// Iterate node ids.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        0..self.node_presence.len() as NodeId
    }

    /// Presence of a node.
    pub fn node_presence(&self, n: NodeId) -> Result<&IntervalSeq> {
        self.node_presence
            .get(n as usize)
            .ok_or(Error::UnknownNode(n))
    }

    /// All links in id order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Presence of a link.
    pub fn link_presence(&self, l: LinkId) -> Result<&IntervalSeq> {
        self.link_presence.get(l).ok_or(Error::UnknownLink(l))
    }

    /// Weight of the `k`-th interval of link `l` (1.0 when no weights are
    /// attached).
    pub fn weight(&self, l: LinkId, k: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[l][k])
    }

    /// Traversal duration of the `k`-th interval of link `l` (0 when no
    /// trips are attached).
    pub fn trip(&self, l: LinkId, k: usize) -> Time {
        self.trips.as_ref().map_or(0, |t| t[l][k])
    }

    /// Display label of a node (its id rendered as text by default).
    pub fn label(&self, n: NodeId) -> String {
        self.labels
            .as_ref()
            .and_then(|ls| ls.get(n as usize).cloned())
            .unwrap_or_else(|| n.to_string())
    }

    /// Whether node `n` is present at instant `t`.
    pub fn node_present_at(&self, n: NodeId, t: Time) -> Result<bool> {
        Ok(self.node_presence(n)?.contains_time(t))
    }

    /// Whether link `l` is present at instant `t`.
    pub fn link_present_at(&self, l: LinkId, t: Time) -> Result<bool> {
        Ok(self.link_presence(l)?.contains_time(t))
    }

    /// Neighbors of `n` at instant `t`, with the link carrying each.
    pub fn neighbors_at(&self, n: NodeId, t: Time) -> Result<Vec<(NodeId, LinkId)>> {
        if n as usize >= self.node_presence.len() {
            return Err(Error::UnknownNode(n));
        }
        let mut out = Vec::new();
        for (l, (link, presence)) in self.links.iter().zip(&self.link_presence).enumerate() {
            if (link.u == n || link.v == n) && presence.contains_time(t) {
                out.push((link.other(n), l));
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// The arena of segmented nodes, one entry per maximal contiguous
    /// occurrence, grouped by node in time order.
    pub fn segments(&self) -> SegmentArena {
        SegmentArena::from_presences(
            self.node_presence
                .iter()
                .enumerate()
                .map(|(n, p)| (n as NodeId, p)),
        )
    }

    /// The ordered event stream: one start and one end event per presence
    /// interval, sorted by time then kind (NodeStart, LinkStart, LinkEnd,
    /// NodeEnd at equal instants).
    pub fn events(&self) -> Vec<Event> {
        let mut events = Vec::new();
        for (n, presence) in self.node_presence.iter().enumerate() {
            for span in presence.iter() {
                events.push(Event::NodeStart {
                    interval: *span,
                    node: n as NodeId,
                });
                events.push(Event::NodeEnd {
                    time: span.end,
                    node: n as NodeId,
                });
            }
        }
        for (l, presence) in self.link_presence.iter().enumerate() {
            let link = self.links[l];
            for (k, span) in presence.iter().enumerate() {
                events.push(Event::LinkStart {
                    interval: *span,
                    link: l,
                    u: link.u,
                    v: link.v,
                    weight: self.weight(l, k),
                    trip: self.trip(l, k),
                });
                events.push(Event::LinkEnd {
                    time: span.end,
                    link: l,
                    u: link.u,
                    v: link.v,
                });
            }
        }
        events.sort_unstable();
        events
    }

    /// The link event stream with endpoints resolved to their containing
    /// segments. Fails if a link occurrence escapes an endpoint's presence.
    pub fn link_events(&self, arena: &SegmentArena) -> Result<Vec<LinkEvent>> {
        let mut events = Vec::new();
        for (l, presence) in self.link_presence.iter().enumerate() {
            let link = self.links[l];
            for (k, span) in presence.iter().enumerate() {
                let (u, v) = self.resolve_occurrence(arena, l, span)?;
                events.push(LinkEvent::Start {
                    interval: *span,
                    link: l,
                    u,
                    v,
                    weight: self.weight(l, k),
                    trip: self.trip(l, k),
                });
                events.push(LinkEvent::End {
                    time: span.end,
                    link: l,
                    u,
                    v,
                });
            }
        }
        events.sort_unstable();
        Ok(events)
    }

    fn resolve_occurrence(
        &self,
        arena: &SegmentArena,
        l: LinkId,
        span: &Interval,
    ) -> Result<(SegmentId, SegmentId)> {
        let link = self.links[l];
        let locate = |n: NodeId| {
            arena.locate(n, span).ok_or(Error::Integrity {
                u: link.u,
                v: link.v,
                interval: *span,
                reason: format!("no presence of node {n} contains the link span"),
            })
        };
        Ok((locate(link.u)?, locate(link.v)?))
    }

    /// The neighborhood-with-presence view: for every segment, the link
    /// occurrences attaching it to peer segments.
    pub fn neighborhood(&self) -> Result<Neighborhood> {
        let arena = self.segments();
        let mut adj: Vec<SmallVec<[LinkOccurrence; 4]>> = vec![SmallVec::new(); arena.len()];
        for (l, presence) in self.link_presence.iter().enumerate() {
            for (k, span) in presence.iter().enumerate() {
                let (su, sv) = self.resolve_occurrence(&arena, l, span)?;
                let weight = self.weight(l, k);
                let trip = self.trip(l, k);
                adj[su].push(LinkOccurrence {
                    interval: *span,
                    peer: sv,
                    link: l,
                    weight,
                    trip,
                });
                adj[sv].push(LinkOccurrence {
                    interval: *span,
                    peer: su,
                    link: l,
                    weight,
                    trip,
                });
            }
        }
        Ok(Neighborhood { arena, adj })
    }

    /// Static snapshot at instant `t`: present nodes, present links.
    pub fn instant_graph(&self, t: Time) -> UnGraph<NodeId, LinkId> {
        let mut graph = UnGraph::new_undirected();
        let mut index: HashMap<NodeId, NodeIndex> = HashMap::new();
        for (n, presence) in self.node_presence.iter().enumerate() {
            if presence.contains_time(t) {
                index.insert(n as NodeId, graph.add_node(n as NodeId));
            }
        }
        for (l, presence) in self.link_presence.iter().enumerate() {
            if presence.contains_time(t) {
                let link = self.links[l];
                if let (Some(&a), Some(&b)) = (index.get(&link.u), index.get(&link.v)) {
                    graph.add_edge(a, b, l);
                }
            }
        }
        graph
    }

    /// Whole-stream aggregate: every node, one edge per link weighted by its
    /// total presence duration.
    pub fn aggregated_graph(&self) -> UnGraph<NodeId, Time> {
        let mut graph = UnGraph::new_undirected();
        let indices: Vec<NodeIndex> = self.nodes().map(|n| graph.add_node(n)).collect();
        for (l, presence) in self.link_presence.iter().enumerate() {
            let link = self.links[l];
            graph.add_edge(
                indices[link.u as usize],
                indices[link.v as usize],
                presence.total_duration(),
            );
        }
        graph
    }

    // ------------------------------------------------------------------
    // Metrics
    // ------------------------------------------------------------------

    /// Length of the time domain.
    pub fn duration(&self) -> Time {
        self.times.duration()
    }

    /// Total node presence duration (the measure of W).
    pub fn card_w(&self) -> Time {
        self.node_presence.iter().map(IntervalSeq::total_duration).sum()
    }

    /// Total link presence duration (the measure of E).
    pub fn card_e(&self) -> Time {
        self.link_presence.iter().map(IntervalSeq::total_duration).sum()
    }

    /// Fraction of `nodes x time domain` actually covered by presence.
    pub fn coverage(&self) -> f64 {
        let denom = self.nb_nodes() as f64 * self.duration() as f64;
        if denom == 0.0 {
            return 0.0;
        }
        self.card_w() as f64 / denom
    }

    /// Link presence over possible link presence: `card_e` divided by the
    /// summed pairwise intersection of endpoint presences.
    pub fn density(&self) -> f64 {
        let mut possible: Time = 0;
        let n = self.node_presence.len();
        for u in 0..n {
            for v in (u + 1)..n {
                possible +=
                    self.node_presence[u].intersection_duration(&self.node_presence[v]);
            }
        }
        if possible == 0 {
            return 0.0;
        }
        self.card_e() as f64 / possible as f64
    }

    /// Summed pairwise presence intersection over summed pairwise union.
    pub fn uniformity(&self) -> f64 {
        let n = self.node_presence.len();
        let mut inter: Time = 0;
        let mut union: Time = 0;
        for u in 0..n {
            for v in (u + 1)..n {
                let i = self.node_presence[u].intersection_duration(&self.node_presence[v]);
                inter += i;
                union += self.node_presence[u].total_duration()
                    + self.node_presence[v].total_duration()
                    - i;
            }
        }
        if union == 0 {
            return 0.0;
        }
        inter as f64 / union as f64
    }

    /// Mean presence duration per node.
    pub fn node_duration(&self) -> f64 {
        if self.nb_nodes() == 0 {
            return 0.0;
        }
        self.card_w() as f64 / self.nb_nodes() as f64
    }

    /// Mean presence duration per link.
    pub fn link_duration(&self) -> f64 {
        if self.nb_links() == 0 {
            return 0.0;
        }
        self.card_e() as f64 / self.nb_links() as f64
    }

    /// Summary statistics.
    pub fn stats(&self) -> StreamStats {
        StreamStats {
            nb_nodes: self.nb_nodes(),
            nb_links: self.nb_links(),
            nb_segments: self.segments().len(),
            duration: self.duration(),
            card_w: self.card_w(),
            card_e: self.card_e(),
            coverage: self.coverage(),
            density: self.density(),
            uniformity: self.uniformity(),
            node_duration: self.node_duration(),
            link_duration: self.link_duration(),
        }
    }

    /// Number of present nodes over time, as maximal constant steps.
    pub fn node_count_series(&self) -> Vec<(Interval, usize)> {
        Self::count_series(self.node_presence.iter())
    }

    /// Number of present links over time, as maximal constant steps.
    pub fn link_count_series(&self) -> Vec<(Interval, usize)> {
        Self::count_series(self.link_presence.iter())
    }

    fn count_series<'a>(
        presences: impl Iterator<Item = &'a IntervalSeq>,
    ) -> Vec<(Interval, usize)> {
        let mut deltas: HashMap<Time, i64> = HashMap::new();
        for presence in presences {
            for span in presence.iter() {
                *deltas.entry(span.start).or_default() += 1;
                *deltas.entry(span.end).or_default() -= 1;
            }
        }
        let mut times: Vec<Time> = deltas.keys().copied().collect();
        times.sort_unstable();
        let mut series = Vec::new();
        let mut count: i64 = 0;
        for pair in times.windows(2) {
            count += deltas[&pair[0]];
            series.push((Interval::new(pair[0], pair[1]), count as usize));
        }
        series
    }

    // ------------------------------------------------------------------
    // Substreams
    // ------------------------------------------------------------------

    /// The substream induced by a time window: presences clipped, links with
    /// no remaining presence dropped, weights/trips realigned.
    pub fn induced_by_time_window(&self, window: Interval) -> Result<StreamGraph> {
        let window = window
            .intersect(&self.times)
            .ok_or_else(|| Error::Configuration("window outside the time domain".into()))?;
        let node_presence: Vec<IntervalSeq> = self
            .node_presence
            .iter()
            .map(|p| p.clip(&window))
            .collect();
        let mut links = Vec::new();
        let mut link_presence = Vec::new();
        let mut weights = Vec::new();
        let mut trips = Vec::new();
        for (l, presence) in self.link_presence.iter().enumerate() {
            let mut spans = Vec::new();
            let mut w = Vec::new();
            let mut d = Vec::new();
            for (k, span) in presence.iter().enumerate() {
                if let Some(clipped) = span.intersect(&window) {
                    spans.push(clipped);
                    w.push(self.weight(l, k));
                    d.push(self.trip(l, k));
                }
            }
            if !spans.is_empty() {
                links.push(self.links[l]);
                link_presence.push(IntervalSeq::from(spans));
                weights.push(w);
                trips.push(d);
            }
        }
        debug!(window = %window, links = links.len(), "induced substream by time window");
        Ok(StreamGraph {
            times: window,
            node_presence,
            links,
            link_presence,
            weights: self.weights.as_ref().map(|_| weights),
            trips: self.trips.as_ref().map(|_| trips),
            labels: self.labels.clone(),
        })
    }

    /// The substream induced by a node subset. Nodes are re-indexed densely;
    /// returns the new stream and the old id of each new node.
    pub fn induced_by_nodes(&self, keep: &[NodeId]) -> Result<(StreamGraph, Vec<NodeId>)> {
        let mut old_of_new = Vec::with_capacity(keep.len());
        let mut new_of_old: HashMap<NodeId, NodeId> = HashMap::new();
        for &n in keep {
            if n as usize >= self.node_presence.len() {
                return Err(Error::UnknownNode(n));
            }
            if new_of_old.contains_key(&n) {
                continue;
            }
            new_of_old.insert(n, old_of_new.len() as NodeId);
            old_of_new.push(n);
        }
        let node_presence = old_of_new
            .iter()
            .map(|&n| self.node_presence[n as usize].clone())
            .collect();
        let mut links = Vec::new();
        let mut link_presence = Vec::new();
        let mut weights = Vec::new();
        let mut trips = Vec::new();
        for (l, link) in self.links.iter().enumerate() {
            if let (Some(&u), Some(&v)) = (new_of_old.get(&link.u), new_of_old.get(&link.v)) {
                links.push(Link::new(u, v));
                link_presence.push(self.link_presence[l].clone());
                weights.push(self.weights.as_ref().map_or_else(Vec::new, |w| w[l].clone()));
                trips.push(self.trips.as_ref().map_or_else(Vec::new, |t| t[l].clone()));
            }
        }
        let labels = self
            .labels
            .as_ref()
            .map(|ls| old_of_new.iter().map(|&n| ls[n as usize].clone()).collect());
        Ok((
            StreamGraph {
                times: self.times,
                node_presence,
                links,
                link_presence,
                weights: self.weights.as_ref().map(|_| weights),
                trips: self.trips.as_ref().map(|_| trips),
                labels,
            },
            old_of_new,
        ))
    }

    // ------------------------------------------------------------------
    // Mutation (exclusive writer)
    // ------------------------------------------------------------------

    /// Remove a link entirely.
    pub fn remove_link(&mut self, l: LinkId) -> Result<()> {
        if l >= self.links.len() {
            return Err(Error::UnknownLink(l));
        }
        self.links.remove(l);
        self.link_presence.remove(l);
        if let Some(w) = &mut self.weights {
            w.remove(l);
        }
        if let Some(t) = &mut self.trips {
            t.remove(l);
        }
        Ok(())
    }

    /// Remove all presence of a node and every incident link. The id space
    /// of nodes is preserved; the node simply becomes absent everywhere.
    pub fn remove_node(&mut self, n: NodeId) -> Result<()> {
        if n as usize >= self.node_presence.len() {
            return Err(Error::UnknownNode(n));
        }
        self.node_presence[n as usize] = IntervalSeq::new();
        let incident: Vec<LinkId> = self
            .links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.u == n || link.v == n)
            .map(|(l, _)| l)
            .collect();
        for l in incident.into_iter().rev() {
            self.remove_link(l)?;
        }
        Ok(())
    }

    /// Remove an interval from a node's presence, splitting spans that
    /// straddle it and trimming dependent link presence so integrity is
    /// preserved.
    pub fn remove_node_interval(&mut self, n: NodeId, cut: Interval) -> Result<()> {
        if n as usize >= self.node_presence.len() {
            return Err(Error::UnknownNode(n));
        }
        self.node_presence[n as usize].subtract(&cut);
        let incident: Vec<LinkId> = self
            .links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.u == n || link.v == n)
            .map(|(l, _)| l)
            .collect();
        for l in incident {
            self.remove_link_interval(l, cut)?;
        }
        Ok(())
    }

    /// Remove an interval from a link's presence, splitting spans that
    /// straddle it. Weights and trips follow their interval: a split span
    /// inherits the original values on both sides.
    pub fn remove_link_interval(&mut self, l: LinkId, cut: Interval) -> Result<()> {
        if l >= self.links.len() {
            return Err(Error::UnknownLink(l));
        }
        let old_spans: Vec<Interval> = self.link_presence[l].iter().copied().collect();
        let mut spans = Vec::new();
        let mut weights = Vec::new();
        let mut trips = Vec::new();
        for (k, span) in old_spans.iter().enumerate() {
            let mut pieces: SmallVec<[Interval; 2]> = SmallVec::new();
            if !span.overlaps(&cut) {
                pieces.push(*span);
            } else {
                if span.start < cut.start {
                    pieces.push(Interval::new(span.start, cut.start));
                }
                if cut.end < span.end {
                    pieces.push(Interval::new(cut.end, span.end));
                }
            }
            for piece in pieces {
                spans.push(piece);
                weights.push(self.weight(l, k));
                trips.push(self.trip(l, k));
            }
        }
        self.link_presence[l] = IntervalSeq::from(spans);
        if let Some(w) = &mut self.weights {
            w[l] = weights;
        }
        if let Some(t) = &mut self.trips {
            t[l] = trips;
        }
        Ok(())
    }
}

/// Summary statistics of a stream graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamStats {
    pub nb_nodes: usize,
    pub nb_links: usize,
    pub nb_segments: usize,
    pub duration: Time,
    pub card_w: Time,
    pub card_e: Time,
    pub coverage: f64,
    pub density: f64,
    pub uniformity: f64,
    pub node_duration: f64,
    pub link_duration: f64,
}

/// One link occurrence seen from a segment.
#[derive(Debug, Clone, Copy)]
pub struct LinkOccurrence {
    /// The occurrence interval of the link.
    pub interval: Interval,
    /// The peer segment the link attaches to.
    pub peer: SegmentId,
    /// The link carrying the occurrence.
    pub link: LinkId,
    /// Weight of this occurrence.
    pub weight: f64,
    /// Traversal duration of this occurrence.
    pub trip: Time,
}

/// Neighborhood-with-presence: the segment arena plus, for every segment,
/// its link occurrences. Adjacency lives in index lists keyed by dense
/// segment ids.
#[derive(Debug, Clone)]
pub struct Neighborhood {
    pub(crate) arena: SegmentArena,
    pub(crate) adj: Vec<SmallVec<[LinkOccurrence; 4]>>,
}

impl Neighborhood {
    /// The underlying segment arena.
    pub fn arena(&self) -> &SegmentArena {
        &self.arena
    }

    /// Link occurrences of one segment.
    pub fn neighbors(&self, s: SegmentId) -> &[LinkOccurrence] {
        &self.adj[s]
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.adj.len()
    }

    /// Whether the neighborhood is empty.
    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }
}

//! Deterministic event ordering.
//!
//! Every interval of presence contributes an arrival and a departure event.
//! The total order is: time ascending, then kind *descending*
//! (NodeStart, LinkStart, LinkEnd, NodeEnd). At a shared timestamp a link is
//! therefore never born before both endpoints are present and never survives
//! a node's departure — every consumer of the stream relies on this.

use crate::interval::Interval;
use crate::segment::SegmentId;
use crate::{NodeId, Time};
use std::cmp::Ordering;

/// Link index into the stream's link list.
pub type LinkId = usize;

/// Event kind, valued so that the kind tie-break is a descending integer
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum EventKind {
    NodeStart = 2,
    LinkStart = 1,
    LinkEnd = -1,
    NodeEnd = -2,
}

/// One arrival or departure in the stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A node occurrence `(t0, t1, n)` begins.
    NodeStart { interval: Interval, node: NodeId },
    /// A link occurrence `(t0, t1, u, v)` begins, carrying its weight and
    /// traversal duration (defaults 1.0 and 0).
    LinkStart {
        interval: Interval,
        link: LinkId,
        u: NodeId,
        v: NodeId,
        weight: f64,
        trip: Time,
    },
    /// A link occurrence ends at `time`.
    LinkEnd {
        time: Time,
        link: LinkId,
        u: NodeId,
        v: NodeId,
    },
    /// A node occurrence ends at `time`.
    NodeEnd { time: Time, node: NodeId },
}

impl Event {
    /// The instant the event fires.
    pub fn time(&self) -> Time {
        match self {
            Event::NodeStart { interval, .. } => interval.start,
            Event::LinkStart { interval, .. } => interval.start,
            Event::LinkEnd { time, .. } => *time,
            Event::NodeEnd { time, .. } => *time,
        }
    }

    /// The kind code used by the tie-break.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::NodeStart { .. } => EventKind::NodeStart,
            Event::LinkStart { .. } => EventKind::LinkStart,
            Event::LinkEnd { .. } => EventKind::LinkEnd,
            Event::NodeEnd { .. } => EventKind::NodeEnd,
        }
    }

    fn order_key(&self) -> (Time, i8, usize) {
        // Third component keeps the sort fully deterministic for identical
        // (time, kind) pairs without affecting the contract.
        let payload = match self {
            Event::NodeStart { node, .. } | Event::NodeEnd { node, .. } => *node as usize,
            Event::LinkStart { link, .. } | Event::LinkEnd { link, .. } => *link,
        };
        (self.time(), -(self.kind() as i8), payload)
    }
}

// Weights are payload, not identity: the order key ignores them.
impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

/// A link occurrence with both endpoints resolved to their containing
/// segments. The segment-level counterpart of [`Event::LinkStart`] /
/// [`Event::LinkEnd`], consumed by the component engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkEvent {
    Start {
        interval: Interval,
        link: LinkId,
        u: SegmentId,
        v: SegmentId,
        weight: f64,
        trip: Time,
    },
    End {
        time: Time,
        link: LinkId,
        u: SegmentId,
        v: SegmentId,
    },
}

impl LinkEvent {
    pub fn time(&self) -> Time {
        match self {
            LinkEvent::Start { interval, .. } => interval.start,
            LinkEvent::End { time, .. } => *time,
        }
    }

    fn order_key(&self) -> (Time, i8, usize) {
        match self {
            LinkEvent::Start { link, .. } => (self.time(), -1, *link),
            LinkEvent::End { link, .. } => (self.time(), 1, *link),
        }
    }
}

impl Eq for LinkEvent {}

impl PartialOrd for LinkEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LinkEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

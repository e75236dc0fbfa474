// Allow minor clippy style warnings at crate level
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::uninlined_format_args)]

//! Stream graph analysis.
//!
//! A stream graph is a graph whose nodes and links each exist over a finite
//! union of disjoint time intervals inside a shared time domain. This crate
//! turns that interval data into a deterministic event stream and computes:
//!
//! - the connected-component family: weak ([`algo::weak`]), weakly bounded,
//!   stable ([`algo::stable`]) and strong ([`algo::strong`]) components;
//! - the condensation DAG of strong clusters with its stable contraction,
//!   k-core and k-clique decompositions ([`algo::dag`]);
//! - the six time-respecting path metrics — foremost, shortest, fastest and
//!   their pairwise combinations ([`paths`]).
//!
//! # Example
//!
//! ```rust
//! use rivus::{StreamGraph, algo, paths};
//!
//! // Two nodes present over [0, 10), linked over [2, 5)
//! let sg = StreamGraph::from_parts(
//!     (0, 10),
//!     vec![vec![0, 10], vec![0, 10]],
//!     vec![(0, 1)],
//!     vec![vec![2, 5]],
//! )
//! .unwrap();
//! sg.check_integrity().unwrap();
//!
//! let wcc = algo::weak::weakly_connected_components(&sg).unwrap();
//! assert_eq!(wcc.len(), 1);
//!
//! // The link delivers when it ends
//! let arrival = paths::foremost(&sg, 0u32, 1u32, Some(0)).unwrap();
//! assert_eq!(arrival, Some(5));
//! ```
//!
//! # Model
//!
//! Presence intervals are `[t0, t1)` spans kept sorted, disjoint and
//! endpoint-merged ([`IntervalSeq`]). The atomic unit of most algorithms is
//! the [`SegmentedNode`] `(t0, t1, n)`: one maximal contiguous occurrence of
//! a node. Events are totally ordered by time, then kind — node arrivals
//! first, node departures last at a shared instant ([`event`]).
//!
//! The stream is immutable during analysis; the removal methods require
//! exclusive access and re-establish every invariant.

pub mod algo;
pub mod degree;
pub mod error;
pub mod event;
pub mod interval;
pub mod paths;
pub mod segment;
pub mod stream;

/// Timestamp in arbitrary integral units.
pub type Time = u64;

/// Dense node identifier.
pub type NodeId = u32;

pub use algo::dag::{max_clique_membership, CondensationDag, DagNode};
pub use algo::stable::StaticGraphAnalyzer;
pub use algo::union_find::UnionFind;
pub use algo::Component;
pub use error::{Error, Result};
pub use event::{Event, EventKind, LinkId};
pub use interval::{Interval, IntervalSeq};
pub use paths::Endpoint;
pub use segment::{SegmentArena, SegmentId, SegmentedNode};
pub use stream::{Link, LinkOccurrence, Neighborhood, StreamGraph, StreamStats};

// Re-export petgraph: the analyzer seam and snapshot views speak its types
pub use petgraph;

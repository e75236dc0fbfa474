//! Error types for stream graph operations.

use crate::interval::Interval;
use crate::{NodeId, Time};
use thiserror::Error;

/// Error type for stream graph construction and analysis.
///
/// Unreachability in path queries is *not* an error: those queries return
/// `None` per destination. Errors are reserved for structural problems that
/// invalidate a whole computation before it starts.
#[derive(Error, Debug)]
pub enum Error {
    /// A link interval escapes the presence of one of its endpoints, or a
    /// presence sequence is not sorted/disjoint. Fatal before any algorithm
    /// runs.
    #[error("integrity violated on link ({u}, {v}) over {interval}: {reason}")]
    Integrity {
        u: NodeId,
        v: NodeId,
        interval: Interval,
        reason: String,
    },

    /// Contradictory or misaligned inputs, rejected before computation.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Node id outside the stream's node set.
    #[error("node not found: {0}")]
    UnknownNode(NodeId),

    /// Link id outside the stream's link set.
    #[error("link not found: {0}")]
    UnknownLink(usize),

    /// A segment restriction that matches no presence interval of its node.
    #[error("no presence segment [{start}, {end}) for node {node}")]
    UnknownSegment {
        node: NodeId,
        start: Time,
        end: Time,
    },
}

/// Result type for stream graph operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Presence intervals.
//!
//! Nodes and links of a stream graph exist over a finite union of disjoint
//! time intervals. [`Interval`] is a single `[start, end)` span;
//! [`IntervalSeq`] is the canonical ordered union most of the crate operates
//! on.

use crate::error::{Error, Result};
use crate::Time;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single presence span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    /// Start time (inclusive).
    pub start: Time,
    /// End time (exclusive).
    pub end: Time,
}

impl Interval {
    /// Create a new interval. `start` must not exceed `end`.
    pub fn new(start: Time, end: Time) -> Self {
        debug_assert!(start <= end, "interval start {start} > end {end}");
        Self { start, end }
    }

    /// Duration of the span.
    pub fn duration(&self) -> Time {
        self.end.saturating_sub(self.start)
    }

    /// Whether `other` is fully contained in this span.
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether an instant falls inside the span. The end bound counts: a
    /// traveler arriving exactly when a segment closes is still delivered.
    pub fn contains_time(&self, t: Time) -> bool {
        self.start <= t && t <= self.end
    }

    /// Whether two spans overlap over a nonzero duration.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection of two spans, if nonempty.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Smallest span covering both.
    pub fn envelope(&self, other: &Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// An ordered union of disjoint presence intervals.
///
/// Invariant: sorted by start, non-overlapping, and no two intervals share an
/// endpoint — adjacent spans are pre-merged. All constructors either restore
/// or validate this invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSeq(Vec<Interval>);

impl IntervalSeq {
    /// An empty presence.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from a flattened `[t0, t1, t0, t1, ...]` list, restoring the
    /// invariant: spans are sorted and overlapping or adjacent spans merged.
    ///
    /// Rejects odd-length lists and reversed spans.
    pub fn from_flat(flat: &[Time]) -> Result<Self> {
        if flat.len() % 2 != 0 {
            return Err(Error::Configuration(format!(
                "flattened interval list has odd length {}",
                flat.len()
            )));
        }
        let mut spans = Vec::with_capacity(flat.len() / 2);
        for pair in flat.chunks_exact(2) {
            if pair[0] > pair[1] {
                return Err(Error::Configuration(format!(
                    "reversed interval [{}, {})",
                    pair[0], pair[1]
                )));
            }
            if pair[0] < pair[1] {
                spans.push(Interval::new(pair[0], pair[1]));
            }
        }
        spans.sort_unstable();
        let mut merged: Vec<Interval> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                // Merge overlap and shared endpoints alike
                Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
                _ => merged.push(span),
            }
        }
        Ok(Self(merged))
    }

    /// Build from a flattened list, validating the invariant instead of
    /// restoring it. Used by `check_integrity`-style paths where a
    /// non-canonical input is a hard error.
    pub fn try_from_flat(flat: &[Time]) -> Result<Self> {
        let restored = Self::from_flat(flat)?;
        let as_given: Vec<Time> = flat.to_vec();
        if restored.to_flat() != as_given {
            return Err(Error::Configuration(
                "interval list not sorted/disjoint with merged endpoints".into(),
            ));
        }
        Ok(restored)
    }

    /// Flatten back to the `[t0, t1, ...]` encoding.
    pub fn to_flat(&self) -> Vec<Time> {
        let mut flat = Vec::with_capacity(self.0.len() * 2);
        for span in &self.0 {
            flat.push(span.start);
            flat.push(span.end);
        }
        flat
    }

    /// Number of disjoint spans.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the presence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over spans in order.
    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.0.iter()
    }

    /// Total presence duration.
    pub fn total_duration(&self) -> Time {
        self.0.iter().map(Interval::duration).sum()
    }

    /// First instant of presence, if any.
    pub fn first_time(&self) -> Option<Time> {
        self.0.first().map(|s| s.start)
    }

    /// Last instant of presence, if any.
    pub fn last_time(&self) -> Option<Time> {
        self.0.last().map(|s| s.end)
    }

    /// Whether an instant falls inside any span.
    pub fn contains_time(&self, t: Time) -> bool {
        self.span_at(t).is_some()
    }

    /// The span covering an instant, if any.
    pub fn span_at(&self, t: Time) -> Option<Interval> {
        let idx = self.0.partition_point(|s| s.end < t);
        self.0.get(idx).filter(|s| s.contains_time(t)).copied()
    }

    /// The span fully containing `other`, if any. Spans are disjoint, so at
    /// most one qualifies.
    pub fn span_containing(&self, other: &Interval) -> Option<Interval> {
        let idx = self.0.partition_point(|s| s.end < other.start);
        self.0.get(idx).filter(|s| s.contains(other)).copied()
    }

    /// Index of the span fully containing `other`, if any.
    pub fn index_of_span_containing(&self, other: &Interval) -> Option<usize> {
        let idx = self.0.partition_point(|s| s.end < other.start);
        self.0.get(idx).filter(|s| s.contains(other)).map(|_| idx)
    }

    /// Remove `cut` from the presence, splitting spans that straddle it.
    /// Re-establishes the invariant.
    pub fn subtract(&mut self, cut: &Interval) {
        if cut.start >= cut.end {
            return;
        }
        let mut out = Vec::with_capacity(self.0.len() + 1);
        for span in &self.0 {
            if !span.overlaps(cut) {
                out.push(*span);
                continue;
            }
            if span.start < cut.start {
                out.push(Interval::new(span.start, cut.start));
            }
            if cut.end < span.end {
                out.push(Interval::new(cut.end, span.end));
            }
        }
        self.0 = out;
    }

    /// Restrict the presence to `window`, trimming straddling spans.
    pub fn clip(&self, window: &Interval) -> Self {
        Self(self.0.iter().filter_map(|s| s.intersect(window)).collect())
    }

    /// Sum of pairwise intersection durations with another presence.
    pub fn intersection_duration(&self, other: &Self) -> Time {
        let mut total = 0;
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            if let Some(x) = self.0[i].intersect(&other.0[j]) {
                total += x.duration();
            }
            if self.0[i].end <= other.0[j].end {
                i += 1;
            } else {
                j += 1;
            }
        }
        total
    }
}

impl From<Vec<Interval>> for IntervalSeq {
    fn from(mut spans: Vec<Interval>) -> Self {
        spans.sort_unstable();
        let mut merged: Vec<Interval> = Vec::with_capacity(spans.len());
        for span in spans {
            if span.start >= span.end {
                continue;
            }
            match merged.last_mut() {
                Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
                _ => merged.push(span),
            }
        }
        Self(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flat_restores_invariant() {
        let seq = IntervalSeq::from_flat(&[5, 8, 0, 3, 3, 5]).unwrap();
        // [0,3) and [3,5) share an endpoint and must be merged with [5,8)
        assert_eq!(seq.to_flat(), vec![0, 8]);
    }

    #[test]
    fn test_from_flat_rejects_odd_and_reversed() {
        assert!(IntervalSeq::from_flat(&[0, 1, 2]).is_err());
        assert!(IntervalSeq::from_flat(&[3, 1]).is_err());
    }

    #[test]
    fn test_try_from_flat_validates() {
        assert!(IntervalSeq::try_from_flat(&[0, 2, 5, 8]).is_ok());
        assert!(IntervalSeq::try_from_flat(&[0, 2, 2, 8]).is_err());
        assert!(IntervalSeq::try_from_flat(&[5, 8, 0, 2]).is_err());
    }

    #[test]
    fn test_span_containing() {
        let seq = IntervalSeq::from_flat(&[0, 4, 6, 10]).unwrap();
        assert_eq!(
            seq.span_containing(&Interval::new(7, 9)),
            Some(Interval::new(6, 10))
        );
        assert_eq!(seq.span_containing(&Interval::new(3, 7)), None);
    }

    #[test]
    fn test_subtract_splits() {
        let mut seq = IntervalSeq::from_flat(&[0, 10]).unwrap();
        seq.subtract(&Interval::new(3, 5));
        assert_eq!(seq.to_flat(), vec![0, 3, 5, 10]);

        seq.subtract(&Interval::new(0, 3));
        assert_eq!(seq.to_flat(), vec![5, 10]);
    }

    #[test]
    fn test_intersection_duration() {
        let a = IntervalSeq::from_flat(&[0, 5, 10, 20]).unwrap();
        let b = IntervalSeq::from_flat(&[3, 12]).unwrap();
        assert_eq!(a.intersection_duration(&b), 2 + 2);
    }

    #[test]
    fn test_span_at_boundaries() {
        let seq = IntervalSeq::from_flat(&[2, 5]).unwrap();
        assert!(seq.contains_time(2));
        assert!(seq.contains_time(5));
        assert!(!seq.contains_time(6));
        assert!(!seq.contains_time(1));
    }
}

//! Split interval map over package versions.
//!
//! Each stored segment is a disjoint half-open version interval tagged with the
//! set of values whose inserted intervals cover it. Inserting an interval that
//! partially overlaps existing segments splits them at the new boundaries.

use std::collections::BTreeSet;

use pakt_core::version::{PackageVersion, VersionInterval};

/// Sorted, disjoint version segments, each tagged with a non-empty value set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIntervalMap<T> {
    segments: Vec<(VersionInterval, BTreeSet<T>)>,
}

impl<T: Ord + Clone> SplitIntervalMap<T> {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Tag every version in `interval` with `value`.
    pub fn insert(&mut self, interval: VersionInterval, value: T) {
        if interval.is_empty() {
            return;
        }

        let mut bounds: Vec<PackageVersion> = Vec::with_capacity(self.segments.len() * 2 + 2);
        for (segment, _) in &self.segments {
            bounds.push(segment.closed_lower_bound);
            bounds.push(segment.open_upper_bound);
        }
        bounds.push(interval.closed_lower_bound);
        bounds.push(interval.open_upper_bound);
        bounds.sort();
        bounds.dedup();

        let mut segments = Vec::with_capacity(bounds.len());
        let mut existing = self.segments.iter().peekable();
        for pair in bounds.windows(2) {
            let piece = VersionInterval::new(pair[0], pair[1]);

            while existing
                .peek()
                .is_some_and(|(segment, _)| segment.open_upper_bound <= piece.closed_lower_bound)
            {
                existing.next();
            }

            // Every existing boundary is in `bounds`, so a piece lies either
            // wholly inside one existing segment or wholly inside a gap.
            let mut values = match existing.peek() {
                Some((segment, values)) if segment.closed_lower_bound <= piece.closed_lower_bound => {
                    values.clone()
                }
                _ => BTreeSet::new(),
            };
            if interval.closed_lower_bound <= piece.closed_lower_bound
                && piece.open_upper_bound <= interval.open_upper_bound
            {
                values.insert(value.clone());
            }

            if !values.is_empty() {
                segments.push((piece, values));
            }
        }

        self.segments = segments;
    }

    /// Segments in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = (&VersionInterval, &BTreeSet<T>)> {
        self.segments.iter().map(|(interval, values)| (interval, values))
    }

    /// Values tagging the segment that contains `version`.
    pub fn values_at(&self, version: &PackageVersion) -> Option<&BTreeSet<T>> {
        self.segments
            .iter()
            .find(|(interval, _)| interval.contains(version))
            .map(|(_, values)| values)
    }

    /// Maximal contiguous intervals whose segments carry at least `min_count` values.
    pub fn intervals_with_min_count(&self, min_count: usize) -> Vec<VersionInterval> {
        let mut result: Vec<VersionInterval> = Vec::new();
        for (interval, values) in &self.segments {
            if values.len() < min_count {
                continue;
            }
            match result.last_mut() {
                Some(last) if last.open_upper_bound == interval.closed_lower_bound => {
                    last.open_upper_bound = interval.open_upper_bound;
                }
                _ => result.push(*interval),
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl<T: Ord + Clone> Default for SplitIntervalMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

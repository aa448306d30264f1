use std::ops::Range;

/// Partitions `len` elements into contiguous, near-equal groups.
///
/// The number of groups is clamped to `len`, so every group is non-empty.
/// Group sizes differ by at most one element and the larger groups come
/// first: 5 elements in 3 groups yield `[0, 2)`, `[2, 4)`, `[4, 5)`.
///
/// Iterating yields `(group, range)` pairs in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupIndexer {
    len: usize,
    groups: usize,
    base: usize,
    remainder: usize,
    next_group: usize,
}

impl GroupIndexer {
    pub fn new(len: usize, groups: usize) -> Self {
        let groups = groups.min(len);
        let (base, remainder) = if groups == 0 {
            (0, 0)
        } else {
            (len / groups, len % groups)
        };
        Self {
            len,
            groups,
            base,
            remainder,
            next_group: 0,
        }
    }

    /// Number of groups after clamping.
    pub fn num_groups(&self) -> usize {
        self.groups
    }

    /// Total number of elements being partitioned.
    pub fn num_elements(&self) -> usize {
        self.len
    }

    /// Element range covered by `group`.
    ///
    /// Panics if `group >= num_groups()`.
    pub fn range(&self, group: usize) -> Range<usize> {
        assert!(
            group < self.groups,
            "group {group} out of range for {} groups",
            self.groups
        );
        let start = group * self.base + group.min(self.remainder);
        let size = self.base + usize::from(group < self.remainder);
        start..start + size
    }

    /// Collects every range, in group order.
    pub fn ranges(&self) -> Vec<Range<usize>> {
        (0..self.groups).map(|g| self.range(g)).collect()
    }
}

impl Iterator for GroupIndexer {
    type Item = (usize, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_group >= self.groups {
            return None;
        }
        let group = self.next_group;
        self.next_group += 1;
        Some((group, self.range(group)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.groups - self.next_group;
        (left, Some(left))
    }
}

impl ExactSizeIterator for GroupIndexer {}

/// Splits `items` into at most `groups` contiguous sub-slices.
pub fn split_slice<T>(items: &[T], groups: usize) -> Vec<&[T]> {
    GroupIndexer::new(items.len(), groups)
        .map(|(_, range)| &items[range])
        .collect()
}

use alloc::vec::Vec;

/// Collects row indexes for one batch instruction.
///
/// It enforces the host batch contract:
/// - Out-of-bounds indexes are ignored (and debug-asserted).
/// - Duplicates are ignored.
/// - Out-of-order indexes are ignored (and debug-asserted).
#[derive(Clone, Debug)]
pub struct IndexBatch {
    count: usize,
    last: Option<usize>,
    indexes: Vec<usize>,
}

impl IndexBatch {
    /// `count` is the length of the sequence the indexes address.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            last: None,
            indexes: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn push(&mut self, index: usize) {
        if index >= self.count {
            owarn!(index, count = self.count, "IndexBatch: out-of-bounds index");
            debug_assert!(
                index < self.count,
                "IndexBatch: out-of-bounds index (i={index}, count={})",
                self.count
            );
            return;
        }

        if let Some(prev) = self.last {
            if index == prev {
                return;
            }
            if index < prev {
                owarn!(
                    prev,
                    next = index,
                    "IndexBatch: indexes must be pushed in ascending order"
                );
                debug_assert!(
                    index > prev,
                    "IndexBatch: indexes must be pushed in ascending order (prev={prev}, next={index})"
                );
                return;
            }
        }

        self.last = Some(index);
        self.indexes.push(index);
    }

    pub fn push_range(&mut self, start_index: usize, end_index: usize) {
        let end = end_index.min(self.count);
        for i in start_index..end {
            self.push(i);
        }
    }

    pub fn finish(self) -> Vec<usize> {
        self.indexes
    }
}

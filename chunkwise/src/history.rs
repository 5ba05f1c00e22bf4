use std::collections::VecDeque;

/// Most-recent-first record of predicted labels, bounded by a capacity.
#[derive(Debug, Clone, Default)]
pub struct LabelHistory {
    labels: VecDeque<String>,
    capacity: usize,
}

impl LabelHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            labels: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Adds `label` as the most recent entry, dropping the oldest one when
    /// the capacity is exceeded.
    pub fn push<S>(&mut self, label: S)
    where
        S: Into<String>,
    {
        self.labels.push_front(label.into());
        self.labels.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    /// Iterates labels from the most recent.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

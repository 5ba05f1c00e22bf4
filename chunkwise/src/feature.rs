use core::fmt;

/// A row of token attributes. A row without attributes marks a break between
/// sequences.
pub type Row = Vec<String>;

/// Returns `true` if `row` is a break marker.
#[inline(always)]
pub fn is_break(row: &[String]) -> bool {
    row.is_empty()
}

/// Key of a single binary feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKey<'a> {
    /// The attribute `value` found in `column` of the row at `rel_position`
    /// from the target row.
    Attribute {
        value: &'a str,
        column: usize,
        rel_position: isize,
    },

    /// The label assigned to the row at `rel_position` (always negative).
    Label { value: &'a str, rel_position: isize },
}

impl<'a> FeatureKey<'a> {
    pub const fn attribute(value: &'a str, column: usize, rel_position: isize) -> Self {
        Self::Attribute {
            value,
            column,
            rel_position,
        }
    }

    pub const fn label(value: &'a str, rel_position: isize) -> Self {
        Self::Label {
            value,
            rel_position,
        }
    }
}

// Attribute keys end with `_<column>:<offset>` and label keys with
// `_label:<offset>`, so the two never collide.
impl fmt::Display for FeatureKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Attribute {
                value,
                column,
                rel_position,
            } => write!(f, "{value}_{column}:{rel_position}"),
            Self::Label {
                value,
                rel_position,
            } => write!(f, "{value}_label:{rel_position}"),
        }
    }
}

/// An entry of a sparse feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureEntry {
    pub index: u32,
    pub value: f64,
}

impl FeatureEntry {
    pub const fn new(index: u32, value: f64) -> Self {
        Self { index, value }
    }
}

/// A sparse feature vector and its label.
///
/// The label is empty when unknown. The same index may appear more than
/// once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    pub(crate) label: String,
    pub(crate) entries: Vec<FeatureEntry>,
}

impl FeatureVector {
    pub fn new<S>(label: S, entries: Vec<FeatureEntry>) -> Self
    where
        S: Into<String>,
    {
        Self {
            label: label.into(),
            entries,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets the indices sorted in ascending order, keeping duplicates.
    #[cfg(test)]
    pub(crate) fn sorted_indices(&self) -> Vec<u32> {
        let mut indices: Vec<_> = self.entries.iter().map(|e| e.index).collect();
        indices.sort_unstable();
        indices
    }
}

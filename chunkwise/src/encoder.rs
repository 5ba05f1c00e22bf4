//! Conversion of token rows into sparse feature vectors.

use bincode::{Decode, Encode};

use crate::artifact::{self, ModelLocation, ENCODER_SUFFIX};
use crate::dictionary::{self, FeatureDictionary, HashMapDictionary};
use crate::errors::Result;
use crate::feature::{is_break, FeatureEntry, FeatureKey, FeatureVector, Row};
use crate::history::LabelHistory;

/// Settings of a feature encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// The number of rows on each side of the target row used as context.
    pub window_size: usize,

    /// The number of preceding labels used as features.
    pub label_history_size: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            window_size: 2,
            label_history_size: 2,
        }
    }
}

/// Encodes rows into feature vectors.
///
/// During training the last attribute of every row is its label, and every
/// feature key seen is added to the dictionary. During inference rows carry
/// no label, the dictionary is only read, and label features come from the
/// labels reported through [`FeatureEncoder::add_result`].
pub trait FeatureEncoder {
    /// Gets the tag under which this implementation is registered.
    fn tag(&self) -> &'static str;

    fn config(&self) -> EncoderConfig;

    fn dictionary(&self) -> &dyn FeatureDictionary;

    /// Encodes the labeled row at `position`.
    ///
    /// # Returns
    ///
    /// The feature vector labeled with the row's own label, or `None` if the
    /// row is a break.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    fn encode_with_label(&mut self, rows: &[Row], position: usize) -> Option<FeatureVector>;

    /// Encodes the unlabeled row at `position`.
    ///
    /// A break clears the label history.
    ///
    /// # Returns
    ///
    /// The feature vector with an empty label, or `None` if the row is a
    /// break.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    fn encode_no_label(&mut self, rows: &[Row], position: usize) -> Option<FeatureVector>;

    /// Reports the label predicted for the most recently encoded row.
    fn add_result(&mut self, label: &str);

    fn clear_history(&mut self);
}

/// Header stored in the encoder file.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode)]
pub(crate) struct EncoderHeader {
    pub(crate) encoder: String,
    pub(crate) dictionary: String,
    pub(crate) window_size: usize,
    pub(crate) label_history_size: usize,
}

impl EncoderHeader {
    pub(crate) const fn config(&self) -> EncoderConfig {
        EncoderConfig {
            window_size: self.window_size,
            label_history_size: self.label_history_size,
        }
    }
}

/// Writes the encoder settings and its dictionary under `loc`.
pub fn save_encoder(encoder: &dyn FeatureEncoder, loc: ModelLocation) -> Result<()> {
    let config = encoder.config();
    let header = EncoderHeader {
        encoder: encoder.tag().to_string(),
        dictionary: encoder.dictionary().tag().to_string(),
        window_size: config.window_size,
        label_history_size: config.label_history_size,
    };
    artifact::write_artifact(&loc.path(ENCODER_SUFFIX), "encoder settings", &header)?;
    dictionary::save_table(encoder.dictionary(), loc)
}

pub(crate) fn read_header(loc: ModelLocation) -> Result<EncoderHeader> {
    artifact::read_artifact(&loc.path(ENCODER_SUFFIX), "encoder settings")
}

fn push_feature(
    dictionary: &mut dyn FeatureDictionary,
    key: FeatureKey,
    insert: bool,
    entries: &mut Vec<FeatureEntry>,
) {
    if let Some(index) = dictionary.lookup(&key.to_string(), insert) {
        entries.push(FeatureEntry::new(index, 1.0));
    }
}

/// Encoder using the attributes of the surrounding rows and the preceding
/// labels.
///
/// Context never crosses a break: the window stops at the first break in
/// each direction.
pub struct WindowEncoder {
    config: EncoderConfig,
    dictionary: Box<dyn FeatureDictionary>,
    history: LabelHistory,
}

impl Default for WindowEncoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default(), Box::new(HashMapDictionary::new()))
    }
}

impl WindowEncoder {
    pub const TAG: &'static str = "window";

    /// Creates a new encoder.
    ///
    /// # Arguments
    ///
    /// * `config` - Window and label history sizes.
    /// * `dictionary` - The feature dictionary, owned by the encoder from now
    ///   on.
    pub fn new(config: EncoderConfig, dictionary: Box<dyn FeatureDictionary>) -> Self {
        Self {
            config,
            dictionary,
            history: LabelHistory::new(config.label_history_size),
        }
    }

    /// Gets the current label history, most recent first.
    pub fn history(&self) -> &LabelHistory {
        &self.history
    }

    fn push_window_features(
        &mut self,
        rows: &[Row],
        position: usize,
        with_labels: bool,
        entries: &mut Vec<FeatureEntry>,
    ) {
        let window = self.config.window_size;
        let preceding = rows[..=position]
            .iter()
            .rev()
            .take(window + 1)
            .enumerate()
            .map(|(i, row)| (-(i as isize), row))
            .take_while(|(_, row)| !is_break(row));
        let following = rows[position + 1..]
            .iter()
            .take(window)
            .enumerate()
            .map(|(i, row)| (i as isize + 1, row))
            .take_while(|(_, row)| !is_break(row));
        for (rel_position, row) in preceding.chain(following) {
            let n_columns = if with_labels { row.len() - 1 } else { row.len() };
            for (column, value) in row[..n_columns].iter().enumerate() {
                push_feature(
                    self.dictionary.as_mut(),
                    FeatureKey::attribute(value, column, rel_position),
                    with_labels,
                    entries,
                );
            }
        }
    }
}

impl FeatureEncoder for WindowEncoder {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn config(&self) -> EncoderConfig {
        self.config
    }

    fn dictionary(&self) -> &dyn FeatureDictionary {
        self.dictionary.as_ref()
    }

    fn encode_with_label(&mut self, rows: &[Row], position: usize) -> Option<FeatureVector> {
        let row = &rows[position];
        let label = row.last()?;
        let mut entries = vec![];
        self.push_window_features(rows, position, true, &mut entries);

        // Labels are taken from the rows themselves.
        let preceding = rows[..position]
            .iter()
            .rev()
            .take(self.config.label_history_size)
            .enumerate()
            .take_while(|(_, row)| !is_break(row));
        for (i, row) in preceding {
            if let Some(prev_label) = row.last() {
                push_feature(
                    self.dictionary.as_mut(),
                    FeatureKey::label(prev_label, -(i as isize) - 1),
                    true,
                    &mut entries,
                );
            }
        }
        Some(FeatureVector::new(label.as_str(), entries))
    }

    fn encode_no_label(&mut self, rows: &[Row], position: usize) -> Option<FeatureVector> {
        if is_break(&rows[position]) {
            self.history.clear();
            return None;
        }
        let mut entries = vec![];
        self.push_window_features(rows, position, false, &mut entries);

        // Labels are taken from the predictions reported so far.
        for (i, label) in self.history.iter().enumerate() {
            push_feature(
                self.dictionary.as_mut(),
                FeatureKey::label(label, -(i as isize) - 1),
                false,
                &mut entries,
            );
        }
        Some(FeatureVector::new("", entries))
    }

    fn add_result(&mut self, label: &str) {
        self.history.push(label);
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }
}

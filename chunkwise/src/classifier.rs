//! The classifier capability consumed by the chunker.

use bincode::{Decode, Encode};
use hashbrown::HashMap;

use crate::artifact::{self, ModelLocation, CLASSIFIER_SUFFIX, LABEL_MAP_SUFFIX};
use crate::errors::{ChunkerError, Result};
use crate::feature::FeatureVector;

/// A multi-class classifier over sparse feature vectors.
pub trait Classifier {
    /// Gets the tag under which this implementation is registered.
    fn tag(&self) -> &'static str;

    /// Trains the classifier on a complete batch of labeled vectors,
    /// replacing any previous model.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::InvalidArgument`] will be returned if `examples` is
    /// empty or the underlying solver rejects it.
    fn train(&mut self, examples: Vec<FeatureVector>) -> Result<()>;

    /// Predicts the label of `vector`. The label of `vector` itself is
    /// ignored.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::InvalidArgument`] will be returned if no model has
    /// been trained or loaded.
    fn predict(&self, vector: &FeatureVector) -> Result<&str>;

    /// Writes the model files owned by the classifier under `loc`.
    fn save_model(&self, loc: ModelLocation) -> Result<()>;

    /// Replaces the model with the one stored under `loc`.
    fn load_model(&mut self, loc: ModelLocation) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode)]
pub(crate) struct ClassifierHeader {
    pub(crate) classifier: String,
}

/// Writes the classifier tag followed by the classifier's own files.
pub fn save_classifier(classifier: &dyn Classifier, loc: ModelLocation) -> Result<()> {
    let header = ClassifierHeader {
        classifier: classifier.tag().to_string(),
    };
    artifact::write_artifact(&loc.path(CLASSIFIER_SUFFIX), "classifier settings", &header)?;
    classifier.save_model(loc)
}

pub(crate) fn read_header(loc: ModelLocation) -> Result<ClassifierHeader> {
    artifact::read_artifact(&loc.path(CLASSIFIER_SUFFIX), "classifier settings")
}

/// Bidirectional mapping between string labels and the integer codes used by
/// numeric solvers.
///
/// Codes are assigned from 1 in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct LabelCodes {
    codes: HashMap<String, u32>,
    labels: Vec<String>,
}

impl LabelCodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the code of `label`, assigning a new one if necessary.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::InvalidArgument`] will be returned if the code space
    /// is exhausted.
    pub fn code(&mut self, label: &str) -> Result<u32> {
        if let Some(&code) = self.codes.get(label) {
            return Ok(code);
        }
        let code = u32::try_from(self.labels.len() + 1)
            .map_err(|_| ChunkerError::invalid_argument("label", "too many distinct labels"))?;
        self.labels.push(label.to_string());
        self.codes.insert(label.to_string(), code);
        Ok(code)
    }

    pub fn get_code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    /// Gets the label assigned to `code`.
    pub fn label(&self, code: u32) -> Option<&str> {
        let idx = usize::try_from(code).ok()?.checked_sub(1)?;
        self.labels.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Gets all `(label, code)` pairs in code order.
    pub fn entries(&self) -> Vec<(String, u32)> {
        self.labels
            .iter()
            .zip(1..)
            .map(|(label, code)| (label.clone(), code))
            .collect()
    }

    /// Creates label codes from `(label, code)` pairs.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::MalformedArtifact`] will be returned unless the codes
    /// are exactly `1..=entries.len()` with distinct labels.
    pub fn from_entries(mut entries: Vec<(String, u32)>) -> Result<Self> {
        entries.sort_unstable_by_key(|&(_, code)| code);
        let mut result = Self::new();
        for (expected, (label, code)) in (1..).zip(entries) {
            if code != expected {
                return Err(ChunkerError::malformed_artifact(format!(
                    "label code {code} is not contiguous"
                )));
            }
            if result.codes.insert(label.clone(), code).is_some() {
                return Err(ChunkerError::malformed_artifact(format!(
                    "label {label:?} appears twice"
                )));
            }
            result.labels.push(label);
        }
        Ok(result)
    }

    pub fn save(&self, loc: ModelLocation) -> Result<()> {
        artifact::write_artifact(&loc.path(LABEL_MAP_SUFFIX), "label map", &self.entries())
    }

    pub fn load(loc: ModelLocation) -> Result<Self> {
        Self::from_entries(artifact::read_artifact(
            &loc.path(LABEL_MAP_SUFFIX),
            "label map",
        )?)
    }
}

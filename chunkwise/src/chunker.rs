//! Sequence chunking on top of an encoder and a classifier.

use std::path::Path;

use crate::artifact::ModelLocation;
use crate::classifier::{self, Classifier};
use crate::conll::DataSource;
use crate::encoder::{self, FeatureEncoder, WindowEncoder};
use crate::errors::Result;
use crate::feature::Row;
use crate::linear::LinearClassifier;
use crate::registry::Registry;

/// Labels every row of a sequence of rows.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use chunkwise::Chunker;
///
/// let rows: Vec<Vec<String>> = vec![
///     vec!["He".into(), "PRP".into()],
///     vec!["reckons".into(), "VBZ".into()],
///     vec![],
/// ];
///
/// let mut chunker = Chunker::default();
/// chunker.load_model(Path::new("models"), "conll2000")?;
/// let labels = chunker.chunk(&rows)?;
/// assert_eq!(rows.len(), labels.len());
/// # Ok::<(), chunkwise::errors::ChunkerError>(())
/// ```
pub struct Chunker {
    encoder: Box<dyn FeatureEncoder>,
    classifier: Box<dyn Classifier>,
    registry: Registry,
}

impl Default for Chunker {
    /// Creates a chunker with a [`WindowEncoder`] of window size 2 and label
    /// history size 2 and an untrained [`LinearClassifier`].
    fn default() -> Self {
        Self::new(
            Box::new(WindowEncoder::default()),
            Box::new(LinearClassifier::default()),
        )
    }
}

impl Chunker {
    /// Creates a new chunker.
    ///
    /// # Arguments
    ///
    /// * `encoder` - Encoder converting rows into feature vectors.
    /// * `classifier` - Classifier predicting a label for each vector.
    pub fn new(encoder: Box<dyn FeatureEncoder>, classifier: Box<dyn Classifier>) -> Self {
        Self::with_registry(encoder, classifier, Registry::default())
    }

    /// Creates a new chunker that resolves stored models with `registry`.
    pub fn with_registry(
        encoder: Box<dyn FeatureEncoder>,
        classifier: Box<dyn Classifier>,
        registry: Registry,
    ) -> Self {
        Self {
            encoder,
            classifier,
            registry,
        }
    }

    pub fn encoder(&self) -> &dyn FeatureEncoder {
        self.encoder.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Trains the classifier on labeled rows.
    ///
    /// The last attribute of each non-break row is its label. Features seen
    /// here are added to the encoder's dictionary.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::InvalidArgument`](crate::errors::ChunkerError::InvalidArgument)
    /// will be returned if `rows` contains no labeled row.
    pub fn train(&mut self, rows: &[Row]) -> Result<()> {
        let examples: Vec<_> = (0..rows.len())
            .filter_map(|i| self.encoder.encode_with_label(rows, i))
            .collect();
        tracing::info!(
            n_rows = rows.len(),
            n_examples = examples.len(),
            n_features = self.encoder.dictionary().len(),
            "training"
        );
        self.classifier.train(examples)
    }

    /// Predicts a label for every row.
    ///
    /// The label history is cleared afterward, also when an error is
    /// returned.
    ///
    /// # Returns
    ///
    /// One label per row. Breaks get an empty label.
    pub fn chunk(&mut self, rows: &[Row]) -> Result<Vec<String>> {
        let mut labels = Vec::with_capacity(rows.len());
        let result = self.predict_rows(rows, &mut labels);
        self.encoder.clear_history();
        result?;
        Ok(labels)
    }

    fn predict_rows(&mut self, rows: &[Row], labels: &mut Vec<String>) -> Result<()> {
        for i in 0..rows.len() {
            match self.encoder.encode_no_label(rows, i) {
                Some(fv) => {
                    let label = self.classifier.predict(&fv)?;
                    self.encoder.add_result(label);
                    labels.push(label.to_string());
                }
                None => labels.push(String::new()),
            }
        }
        Ok(())
    }

    /// Trains on every row read from `source`.
    pub fn train_from(&mut self, source: &mut dyn DataSource) -> Result<()> {
        let rows = source.read_rows()?;
        self.train(&rows)
    }

    /// Labels every row read from `source`.
    ///
    /// # Returns
    ///
    /// The rows read and their labels.
    pub fn chunk_from(&mut self, source: &mut dyn DataSource) -> Result<(Vec<Row>, Vec<String>)> {
        let rows = source.read_rows()?;
        let labels = self.chunk(&rows)?;
        Ok((rows, labels))
    }

    /// Writes the model files `<dir>/<prefix>.*`.
    pub fn save_model(&self, dir: &Path, prefix: &str) -> Result<()> {
        let loc = ModelLocation::new(dir, prefix);
        classifier::save_classifier(self.classifier.as_ref(), loc)?;
        encoder::save_encoder(self.encoder.as_ref(), loc)?;
        tracing::info!(dir = %dir.display(), prefix, "saved model");
        Ok(())
    }

    /// Replaces the encoder and the classifier with the ones stored as
    /// `<dir>/<prefix>.*`.
    ///
    /// On error the chunker is left unchanged.
    pub fn load_model(&mut self, dir: &Path, prefix: &str) -> Result<()> {
        let loc = ModelLocation::new(dir, prefix);
        let classifier = self.registry.load_classifier(loc)?;
        let encoder = self.registry.load_encoder(loc)?;
        self.classifier = classifier;
        self.encoder = encoder;
        tracing::info!(dir = %dir.display(), prefix, "loaded model");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::artifact::tests::ScratchDir;
    use crate::artifact::{write_artifact, CLASSIFIER_SUFFIX, ENCODER_SUFFIX};
    use crate::classifier::ClassifierHeader;
    use crate::dictionary::HashMapDictionary;
    use crate::encoder::{EncoderConfig, EncoderHeader};
    use crate::errors::ChunkerError;
    use crate::feature::FeatureVector;

    fn rows(data: &[&[&str]]) -> Vec<Row> {
        data.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn memorizing_chunker() -> Chunker {
        Chunker::new(
            Box::new(WindowEncoder::new(
                EncoderConfig {
                    window_size: 0,
                    label_history_size: 0,
                },
                Box::new(HashMapDictionary::new()),
            )),
            Box::new(LinearClassifier::default()),
        )
    }

    fn numbers() -> Vec<Row> {
        rows(&[
            &["one", "1"],
            &["two", "2"],
            &["three", "3"],
            &["four", "1"],
            &["five", "2"],
        ])
    }

    fn words(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    /// Classifier that always predicts the same label and records how often
    /// it was trained.
    struct ConstantClassifier {
        label: String,
        n_examples: Rc<RefCell<Vec<usize>>>,
    }

    impl ConstantClassifier {
        fn boxed(label: &str) -> Box<Self> {
            Box::new(Self {
                label: label.to_string(),
                n_examples: Rc::new(RefCell::new(vec![])),
            })
        }
    }

    impl Classifier for ConstantClassifier {
        fn tag(&self) -> &'static str {
            "constant"
        }

        fn train(&mut self, examples: Vec<FeatureVector>) -> Result<()> {
            self.n_examples.borrow_mut().push(examples.len());
            Ok(())
        }

        fn predict(&self, _vector: &FeatureVector) -> Result<&str> {
            Ok(&self.label)
        }

        fn save_model(&self, _loc: ModelLocation) -> Result<()> {
            Ok(())
        }

        fn load_model(&mut self, _loc: ModelLocation) -> Result<()> {
            Ok(())
        }
    }

    /// Classifier that predicts `label` once and fails afterward.
    struct FailingClassifier {
        label: String,
        n_calls: Cell<usize>,
    }

    impl Classifier for FailingClassifier {
        fn tag(&self) -> &'static str {
            "failing"
        }

        fn train(&mut self, _examples: Vec<FeatureVector>) -> Result<()> {
            Ok(())
        }

        fn predict(&self, _vector: &FeatureVector) -> Result<&str> {
            self.n_calls.set(self.n_calls.get() + 1);
            if self.n_calls.get() > 1 {
                return Err(ChunkerError::invalid_argument("model", "broken"));
            }
            Ok(&self.label)
        }

        fn save_model(&self, _loc: ModelLocation) -> Result<()> {
            Ok(())
        }

        fn load_model(&mut self, _loc: ModelLocation) -> Result<()> {
            Ok(())
        }
    }

    #[cfg(feature = "train")]
    #[test]
    fn test_chunk_memorized_words() {
        let mut chunker = memorizing_chunker();
        chunker.train(&numbers()).unwrap();

        let labels = chunker
            .chunk(&rows(&[&["one"], &["two"], &["three"], &["four"], &["five"]]))
            .unwrap();

        assert_eq!(words(&["1", "2", "3", "1", "2"]), labels);
    }

    #[cfg(feature = "train")]
    #[test]
    fn test_save_load_memorized_words() {
        let dir = ScratchDir::new("chunker-save-load");
        let mut chunker = memorizing_chunker();
        chunker.train(&numbers()).unwrap();
        chunker.save_model(dir.path(), "numbers").unwrap();

        let mut loaded = Chunker::default();
        loaded.load_model(dir.path(), "numbers").unwrap();
        assert_eq!(words(&["3"]), loaded.chunk(&rows(&[&["three"]])).unwrap());
        assert_eq!(words(&["2"]), loaded.chunk(&rows(&[&["five"]])).unwrap());
        let labels = loaded
            .chunk(&rows(&[&["five"], &["four"], &[], &["one"], &["three"]]))
            .unwrap();
        assert_eq!(words(&["2", "1", "", "1", "3"]), labels);
        assert_eq!(0, loaded.encoder().config().window_size);
        assert_eq!("linear", loaded.classifier().tag());
    }

    #[test]
    fn test_chunk_output_length_and_breaks() {
        let mut chunker = Chunker::new(
            Box::new(WindowEncoder::default()),
            ConstantClassifier::boxed("B-NP"),
        );
        let data = rows(&[&[], &["a", "X"], &["b", "Y"], &[], &[], &["c", "Z"], &[]]);

        let labels = chunker.chunk(&data).unwrap();

        assert_eq!(
            words(&["", "B-NP", "B-NP", "", "", "B-NP", ""]),
            labels
        );
    }

    #[test]
    fn test_chunk_clears_history_at_end() {
        let mut chunker =
            Chunker::new(Box::new(WindowEncoder::default()), ConstantClassifier::boxed("I-NP"));
        chunker
            .train(&rows(&[&["a", "X", "I-NP"], &["a", "X", "I-NP"]]))
            .unwrap();

        chunker.chunk(&rows(&[&["a", "X"], &["b", "Y"]])).unwrap();
        let fv = chunker
            .encoder
            .encode_no_label(&rows(&[&["a", "X"]]), 0)
            .unwrap();

        // Only the two attributes of the row, "I-NP_label:-1" is not used.
        assert_eq!(2, fv.len());
    }

    #[test]
    fn test_chunk_error_clears_history() {
        let mut chunker = Chunker::new(
            Box::new(WindowEncoder::default()),
            Box::new(FailingClassifier {
                label: "B-NP".to_string(),
                n_calls: Cell::new(0),
            }),
        );
        chunker
            .train(&rows(&[&["a", "X", "B-NP"], &["a", "X", "B-NP"]]))
            .unwrap();

        let e = chunker
            .chunk(&rows(&[&["a", "X"], &["b", "Y"]]))
            .unwrap_err();
        let fv = chunker
            .encoder
            .encode_no_label(&rows(&[&["a", "X"]]), 0)
            .unwrap();

        assert!(matches!(e, ChunkerError::InvalidArgument(_)));
        // "B-NP_label:-1" is known but must not be used.
        assert_eq!(2, fv.len());
    }

    #[test]
    fn test_train_hands_over_one_batch() {
        let classifier = ConstantClassifier::boxed("O");
        let n_examples = Rc::clone(&classifier.n_examples);
        let mut chunker = Chunker::new(Box::new(WindowEncoder::default()), classifier);
        let data = rows(&[&["a", "X", "B-NP"], &[], &["b", "Y", "O"], &["c", "Z", "O"]]);

        chunker.train(&data).unwrap();

        assert_eq!(vec![3], *n_examples.borrow());
    }

    #[test]
    fn test_load_model_missing() {
        let dir = ScratchDir::new("chunker-load-missing");
        let mut chunker = Chunker::default();

        let e = chunker.load_model(dir.path(), "nothing").unwrap_err();

        match e {
            ChunkerError::NotFound(e) => {
                assert_eq!(dir.path().join("nothing.classifier"), e.path())
            }
            _ => panic!("expected a missing file, got {e}"),
        }
    }

    #[test]
    fn test_load_model_unknown_classifier() {
        let dir = ScratchDir::new("chunker-unknown-classifier");
        let loc = ModelLocation::new(dir.path(), "model");
        let header = ClassifierHeader {
            classifier: "maxent".to_string(),
        };
        write_artifact(&loc.path(CLASSIFIER_SUFFIX), "classifier settings", &header).unwrap();
        let mut chunker = Chunker::default();

        let e = chunker.load_model(dir.path(), "model").unwrap_err();

        match e {
            ChunkerError::UnknownImplementation(e) => assert_eq!("maxent", e.tag()),
            _ => panic!("expected an unknown implementation, got {e}"),
        }
    }

    #[cfg(feature = "train")]
    #[test]
    fn test_load_model_unknown_dictionary_keeps_state() {
        let dir = ScratchDir::new("chunker-unknown-dictionary");
        let mut chunker = memorizing_chunker();
        chunker.train(&numbers()).unwrap();
        chunker.save_model(dir.path(), "model").unwrap();
        let loc = ModelLocation::new(dir.path(), "model");
        let header = EncoderHeader {
            encoder: WindowEncoder::TAG.to_string(),
            dictionary: "trie".to_string(),
            window_size: 2,
            label_history_size: 2,
        };
        write_artifact(&loc.path(ENCODER_SUFFIX), "encoder settings", &header).unwrap();

        let e = chunker.load_model(dir.path(), "model").unwrap_err();

        assert!(matches!(e, ChunkerError::UnknownImplementation(_)));
        assert_eq!(0, chunker.encoder().config().window_size);
        assert_eq!(words(&["1"]), chunker.chunk(&rows(&[&["one"]])).unwrap());
    }
}

//! Linear multi-class classifier.

use bincode::{Decode, Encode};

use crate::artifact::{self, ModelLocation, LINEAR_MODEL_SUFFIX};
use crate::classifier::{Classifier, LabelCodes};
use crate::errors::{ChunkerError, Result};
use crate::feature::FeatureVector;
use crate::trainer::TrainParams;
use crate::utils::SerializableHashMap;

/// Weights of a one-vs-rest linear model.
///
/// `classes[i]` is the label code scored by `biases[i]` and by the `i`-th
/// weight of every feature. Feature ids are one-based; features without a
/// non-zero weight are omitted.
#[derive(Debug, Clone, Default, Decode, Encode)]
pub struct LinearModel {
    pub(crate) classes: Vec<u32>,
    pub(crate) biases: Vec<f64>,
    pub(crate) weights: SerializableHashMap<u32, Vec<f64>>,
}

impl LinearModel {
    /// Predicts the label code of a sparse vector of zero-based feature
    /// indices.
    ///
    /// Indices unknown to the model contribute nothing. Ties go to the class
    /// listed first.
    pub fn predict<I>(&self, features: I) -> Option<u32>
    where
        I: IntoIterator<Item = (u32, f64)>,
    {
        let mut scores = self.biases.clone();
        for (index, value) in features {
            if let Some(weights) = index.checked_add(1).and_then(|fid| self.weights.get(&fid)) {
                for (score, w) in scores.iter_mut().zip(weights) {
                    *score += w * value;
                }
            }
        }
        let mut best: Option<(usize, f64)> = None;
        for (i, &score) in scores.iter().enumerate() {
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }
        best.and_then(|(i, _)| self.classes.get(i).copied())
    }

    fn check(&self) -> Result<()> {
        let n_classes = self.classes.len();
        if self.biases.len() != n_classes {
            return Err(ChunkerError::malformed_artifact(format!(
                "{} biases for {} classes",
                self.biases.len(),
                n_classes
            )));
        }
        if let Some((fid, _)) = self.weights.iter().find(|(_, w)| w.len() != n_classes) {
            return Err(ChunkerError::malformed_artifact(format!(
                "feature {fid} does not have {n_classes} weights"
            )));
        }
        Ok(())
    }
}

/// Linear classifier trained with LIBLINEAR.
#[derive(Debug, Clone, Default)]
pub struct LinearClassifier {
    params: TrainParams,
    codes: LabelCodes,
    model: Option<LinearModel>,
}

impl LinearClassifier {
    pub const TAG: &'static str = "linear";

    pub fn new(params: TrainParams) -> Self {
        Self {
            params,
            codes: LabelCodes::new(),
            model: None,
        }
    }
}

impl Classifier for LinearClassifier {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    #[cfg(feature = "train")]
    fn train(&mut self, examples: Vec<FeatureVector>) -> Result<()> {
        if examples.is_empty() {
            return Err(ChunkerError::invalid_argument(
                "examples",
                "no labeled vectors to train on",
            ));
        }
        let mut codes = LabelCodes::new();
        let mut xs = Vec::with_capacity(examples.len());
        let mut ys = Vec::with_capacity(examples.len());
        for example in examples {
            ys.push(codes.code(example.label())?);
            xs.push(
                example
                    .entries()
                    .iter()
                    .map(|e| (e.index, e.value))
                    .collect(),
            );
        }
        tracing::debug!(n_labels = codes.len(), "assigned label codes");
        let model = crate::trainer::train_linear_model(xs, ys, self.params)?;
        self.codes = codes;
        self.model = Some(model);
        Ok(())
    }

    #[cfg(not(feature = "train"))]
    fn train(&mut self, _examples: Vec<FeatureVector>) -> Result<()> {
        Err(ChunkerError::invalid_argument(
            "examples",
            "training requires the `train` feature",
        ))
    }

    fn predict(&self, vector: &FeatureVector) -> Result<&str> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| ChunkerError::invalid_argument("model", "not trained or loaded"))?;
        let code = model
            .predict(vector.entries().iter().map(|e| (e.index, e.value)))
            .ok_or_else(|| ChunkerError::invalid_argument("model", "has no classes"))?;
        self.codes.label(code).ok_or_else(|| {
            ChunkerError::malformed_artifact(format!("label code {code} has no label"))
        })
    }

    fn save_model(&self, loc: ModelLocation) -> Result<()> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| ChunkerError::invalid_argument("model", "not trained or loaded"))?;
        artifact::write_artifact(&loc.path(LINEAR_MODEL_SUFFIX), "linear model", model)?;
        self.codes.save(loc)
    }

    fn load_model(&mut self, loc: ModelLocation) -> Result<()> {
        let model: LinearModel =
            artifact::read_artifact(&loc.path(LINEAR_MODEL_SUFFIX), "linear model")?;
        model.check()?;
        let codes = LabelCodes::load(loc)?;
        if let Some(code) = model.classes.iter().find(|&&c| codes.label(c).is_none()) {
            return Err(ChunkerError::malformed_artifact(format!(
                "label code {code} has no label"
            )));
        }
        self.codes = codes;
        self.model = Some(model);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::artifact::tests::ScratchDir;
    use crate::feature::FeatureEntry;

    fn handmade_model() -> LinearModel {
        let mut weights = SerializableHashMap::default();
        weights.insert(1, vec![1.0, -1.0]);
        weights.insert(2, vec![-1.0, 1.0]);
        LinearModel {
            classes: vec![2, 1],
            biases: vec![0.1, -0.1],
            weights,
        }
    }

    fn vector(indices: &[u32]) -> FeatureVector {
        FeatureVector::new(
            "",
            indices.iter().map(|&i| FeatureEntry::new(i, 1.0)).collect(),
        )
    }

    #[test]
    fn test_linear_model_predict() {
        let model = handmade_model();

        assert_eq!(Some(2), model.predict([(0, 1.0)]));
        assert_eq!(Some(1), model.predict([(1, 1.0)]));
        // Only the biases are left.
        assert_eq!(Some(2), model.predict([(7, 1.0)]));
        assert_eq!(Some(1), model.predict([(0, 1.0), (1, 1.0), (1, 1.0)]));
    }

    #[test]
    fn test_linear_model_no_classes() {
        assert_eq!(None, LinearModel::default().predict([(0, 1.0)]));
    }

    #[test]
    fn test_predict_untrained() {
        let classifier = LinearClassifier::default();

        let e = classifier.predict(&vector(&[0])).unwrap_err();

        assert_eq!(
            "InvalidArgumentError: model: not trained or loaded",
            e.to_string()
        );
    }

    #[test]
    fn test_save_load_model() {
        let dir = ScratchDir::new("linear-save-load");
        let loc = ModelLocation::new(dir.path(), "model");
        let mut codes = LabelCodes::new();
        codes.code("I-NP").unwrap();
        codes.code("B-NP").unwrap();
        let classifier = LinearClassifier {
            params: TrainParams::default(),
            codes,
            model: Some(handmade_model()),
        };

        classifier.save_model(loc).unwrap();
        let mut loaded = LinearClassifier::default();
        loaded.load_model(loc).unwrap();

        assert_eq!("B-NP", loaded.predict(&vector(&[0])).unwrap());
        assert_eq!("I-NP", loaded.predict(&vector(&[1])).unwrap());
    }

    #[test]
    fn test_load_model_rejects_inconsistent_weights() {
        let dir = ScratchDir::new("linear-inconsistent");
        let loc = ModelLocation::new(dir.path(), "model");
        let mut model = handmade_model();
        model.biases.pop();
        artifact::write_artifact(&loc.path(LINEAR_MODEL_SUFFIX), "linear model", &model)
            .unwrap();

        let e = LinearClassifier::default().load_model(loc).unwrap_err();

        assert!(matches!(e, ChunkerError::MalformedArtifact(_)));
    }

    #[test]
    fn test_save_untrained() {
        let dir = ScratchDir::new("linear-save-untrained");
        let loc = ModelLocation::new(dir.path(), "model");

        let e = LinearClassifier::default().save_model(loc).unwrap_err();

        assert!(matches!(e, ChunkerError::InvalidArgument(_)));
    }

    #[cfg(feature = "train")]
    #[test]
    fn test_train_empty() {
        let e = LinearClassifier::default().train(vec![]).unwrap_err();

        assert_eq!(
            "InvalidArgumentError: examples: no labeled vectors to train on",
            e.to_string()
        );
    }

    #[cfg(feature = "train")]
    #[test]
    fn test_train_predict() {
        let mut classifier = LinearClassifier::default();
        let examples = vec![
            FeatureVector::new("B-NP", vec![FeatureEntry::new(0, 1.0)]),
            FeatureVector::new("I-NP", vec![FeatureEntry::new(1, 1.0)]),
            FeatureVector::new("O", vec![FeatureEntry::new(2, 1.0)]),
        ];

        classifier.train(examples).unwrap();

        assert_eq!("B-NP", classifier.predict(&vector(&[0])).unwrap());
        assert_eq!("I-NP", classifier.predict(&vector(&[1])).unwrap());
        assert_eq!("O", classifier.predict(&vector(&[2])).unwrap());
        assert_eq!(3, classifier.codes.len());
    }
}

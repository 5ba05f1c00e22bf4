//! Resolution of persisted implementation tags.

use hashbrown::HashMap;

use crate::artifact::ModelLocation;
use crate::classifier::{self, Classifier};
use crate::dictionary::{self, FeatureDictionary, HashMapDictionary, IndexerDictionary};
use crate::encoder::{self, EncoderConfig, FeatureEncoder, WindowEncoder};
use crate::errors::{ChunkerError, Result};
use crate::linear::LinearClassifier;

pub type DictionaryFactory = fn() -> Box<dyn FeatureDictionary>;
pub type EncoderFactory = fn(EncoderConfig, Box<dyn FeatureDictionary>) -> Box<dyn FeatureEncoder>;
pub type ClassifierFactory = fn() -> Box<dyn Classifier>;

/// Maps implementation tags to constructors.
///
/// [`Registry::default()`] knows the built-in implementations:
///
/// | kind       | tags                    |
/// |------------|-------------------------|
/// | dictionary | `hashmap`, `indexer`    |
/// | encoder    | `window`                |
/// | classifier | `linear`                |
#[derive(Clone)]
pub struct Registry {
    dictionaries: HashMap<String, DictionaryFactory>,
    encoders: HashMap<String, EncoderFactory>,
    classifiers: HashMap<String, ClassifierFactory>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_dictionary(HashMapDictionary::TAG, || {
            Box::new(HashMapDictionary::new())
        });
        registry.register_dictionary(IndexerDictionary::TAG, || {
            Box::new(IndexerDictionary::new())
        });
        registry.register_encoder(WindowEncoder::TAG, |config, dictionary| {
            Box::new(WindowEncoder::new(config, dictionary))
        });
        registry.register_classifier(LinearClassifier::TAG, || {
            Box::new(LinearClassifier::default())
        });
        registry
    }
}

impl Registry {
    /// Creates a registry without any implementation.
    pub fn empty() -> Self {
        Self {
            dictionaries: HashMap::new(),
            encoders: HashMap::new(),
            classifiers: HashMap::new(),
        }
    }

    pub fn register_dictionary<S>(&mut self, tag: S, factory: DictionaryFactory)
    where
        S: Into<String>,
    {
        self.dictionaries.insert(tag.into(), factory);
    }

    pub fn register_encoder<S>(&mut self, tag: S, factory: EncoderFactory)
    where
        S: Into<String>,
    {
        self.encoders.insert(tag.into(), factory);
    }

    pub fn register_classifier<S>(&mut self, tag: S, factory: ClassifierFactory)
    where
        S: Into<String>,
    {
        self.classifiers.insert(tag.into(), factory);
    }

    /// Creates an empty dictionary registered as `tag`.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::UnknownImplementation`] will be returned if `tag` is
    /// not registered.
    pub fn dictionary(&self, tag: &str) -> Result<Box<dyn FeatureDictionary>> {
        self.dictionaries
            .get(tag)
            .map(|factory| factory())
            .ok_or_else(|| ChunkerError::unknown_implementation("dictionary", tag))
    }

    /// Creates an encoder registered as `tag`.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::UnknownImplementation`] will be returned if `tag` is
    /// not registered.
    pub fn encoder(
        &self,
        tag: &str,
        config: EncoderConfig,
        dictionary: Box<dyn FeatureDictionary>,
    ) -> Result<Box<dyn FeatureEncoder>> {
        self.encoders
            .get(tag)
            .map(|factory| factory(config, dictionary))
            .ok_or_else(|| ChunkerError::unknown_implementation("encoder", tag))
    }

    /// Creates an untrained classifier registered as `tag`.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::UnknownImplementation`] will be returned if `tag` is
    /// not registered.
    pub fn classifier(&self, tag: &str) -> Result<Box<dyn Classifier>> {
        self.classifiers
            .get(tag)
            .map(|factory| factory())
            .ok_or_else(|| ChunkerError::unknown_implementation("classifier", tag))
    }

    /// Reconstructs the encoder stored under `loc` together with its
    /// dictionary.
    pub fn load_encoder(&self, loc: ModelLocation) -> Result<Box<dyn FeatureEncoder>> {
        let header = encoder::read_header(loc)?;
        let mut dict = self.dictionary(&header.dictionary)?;
        dictionary::load_table(dict.as_mut(), loc)?;
        tracing::debug!(
            encoder = %header.encoder,
            dictionary = %header.dictionary,
            n_features = dict.len(),
            "loaded encoder"
        );
        self.encoder(&header.encoder, header.config(), dict)
    }

    /// Reconstructs the classifier stored under `loc`.
    pub fn load_classifier(&self, loc: ModelLocation) -> Result<Box<dyn Classifier>> {
        let header = classifier::read_header(loc)?;
        let mut classifier = self.classifier(&header.classifier)?;
        classifier.load_model(loc)?;
        tracing::debug!(classifier = %header.classifier, "loaded classifier");
        Ok(classifier)
    }
}

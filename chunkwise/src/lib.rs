#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Chunkwise
//!
//! Chunkwise is a text chunker that labels each token of a sentence with a
//! linear classifier over sparse window features.
//!
//! ## Examples
//!
//! ```no_run
//! use std::path::Path;
//!
//! use chunkwise::{Chunker, ConllReader};
//!
//! let mut chunker = Chunker::default();
//! chunker.load_model(Path::new("models"), "conll2000")?;
//!
//! let mut reader = ConllReader::new(std::io::stdin().lock());
//! let (rows, labels) = chunker.chunk_from(&mut reader)?;
//! for (row, label) in rows.iter().zip(labels) {
//!     if row.is_empty() {
//!         println!();
//!     } else {
//!         println!("{} {}", row.join(" "), label);
//!     }
//! }
//! # Ok::<(), chunkwise::errors::ChunkerError>(())
//! ```
//!
//! Training requires **crate feature** `train`. For more details, see
//! [`Chunker::train`].

pub mod errors;

mod artifact;
mod chunker;
mod classifier;
mod conll;
mod dictionary;
mod encoder;
mod feature;
mod history;
mod linear;
mod registry;
mod trainer;
mod utils;

pub use artifact::ModelLocation;
pub use chunker::Chunker;
pub use classifier::{save_classifier, Classifier, LabelCodes};
pub use conll::{ConllReader, DataSource, TextEncoding};
pub use dictionary::{FeatureDictionary, HashMapDictionary, IndexerDictionary};
pub use encoder::{save_encoder, EncoderConfig, FeatureEncoder, WindowEncoder};
pub use feature::{is_break, FeatureEntry, FeatureKey, FeatureVector, Row};
pub use history::LabelHistory;
pub use linear::{LinearClassifier, LinearModel};
pub use registry::{ClassifierFactory, DictionaryFactory, EncoderFactory, Registry};
pub use trainer::{SolverType, TrainParams};

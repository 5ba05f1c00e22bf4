//! Model files.
//!
//! Every model file is a bincode stream that starts with [`MAGIC`] and
//! [`FORMAT_VERSION`] followed by a single payload. Collections inside the
//! payload are written as an element count followed by that many records.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use bincode::{Decode, Encode};

use crate::errors::{ChunkerError, Result};

pub const MAGIC: &str = "chunkwise";
pub const FORMAT_VERSION: u32 = 1;

pub const CLASSIFIER_SUFFIX: &str = ".classifier";
pub const ENCODER_SUFFIX: &str = ".fvgen";
pub const DICTIONARY_SUFFIX: &str = ".feat-dict";
pub const LINEAR_MODEL_SUFFIX: &str = ".linear-model";
pub const LABEL_MAP_SUFFIX: &str = ".label-map";

/// Location of a model: a directory and a file name prefix shared by all of
/// its files.
#[derive(Clone, Copy, Debug)]
pub struct ModelLocation<'a> {
    dir: &'a Path,
    prefix: &'a str,
}

impl<'a> ModelLocation<'a> {
    pub const fn new(dir: &'a Path, prefix: &'a str) -> Self {
        Self { dir, prefix }
    }

    pub const fn dir(&self) -> &'a Path {
        self.dir
    }

    pub const fn prefix(&self) -> &'a str {
        self.prefix
    }

    /// Gets the path of the file with the given suffix.
    pub fn path(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, suffix))
    }
}

/// Writes `value` to `path`.
///
/// The file is synced before returning, so a failure to persist the data is
/// reported even when every write succeeded.
pub fn write_artifact<T>(path: &Path, what: &str, value: &T) -> Result<()>
where
    T: Encode,
{
    let config = bincode::config::standard();
    let mut bytes = bincode::encode_to_vec(MAGIC, config)?;
    bytes.extend(bincode::encode_to_vec(FORMAT_VERSION, config)?);
    bytes.extend(bincode::encode_to_vec(value, config)?);

    let mut f = File::create(path).map_err(|e| ChunkerError::from_open(what, path, e))?;
    f.write_all(&bytes).map_err(|e| {
        ChunkerError::io_failure(format!("failed to write the {what} {path:?}"), e)
    })?;
    f.sync_all().map_err(|e| {
        ChunkerError::io_failure(format!("failed to close the {what} {path:?}"), e)
    })?;
    Ok(())
}

/// Reads a value written by [`write_artifact`].
///
/// # Errors
///
/// * [`ChunkerError::NotFound`] if `path` does not exist.
/// * [`ChunkerError::IoFailure`] if the file cannot be read.
/// * [`ChunkerError::MalformedArtifact`] if the header does not match, the
///   data is truncated, or bytes remain after the payload.
pub fn read_artifact<T>(path: &Path, what: &str) -> Result<T>
where
    T: Decode,
{
    let bytes = fs::read(path).map_err(|e| ChunkerError::from_open(what, path, e))?;
    let config = bincode::config::standard();
    let malformed = |msg: &str| {
        ChunkerError::malformed_artifact(format!("the {what} {path:?} {msg}"))
    };

    let (magic, mut pos): (String, usize) =
        bincode::decode_from_slice(&bytes, config).map_err(|_| malformed("has no header"))?;
    if magic != MAGIC {
        return Err(malformed("is not a model file"));
    }
    let (version, len): (u32, usize) =
        bincode::decode_from_slice(&bytes[pos..], config).map_err(|_| malformed("has no version"))?;
    pos += len;
    if version != FORMAT_VERSION {
        return Err(malformed(&format!("has unsupported version {version}")));
    }
    let (value, len) = bincode::decode_from_slice(&bytes[pos..], config)?;
    pos += len;
    if pos != bytes.len() {
        return Err(malformed("has trailing bytes"));
    }
    Ok(value)
}

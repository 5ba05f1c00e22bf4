//! Definition of errors.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub type Result<T, E = ChunkerError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum ChunkerError {
    NotFound(NotFoundError),
    IoFailure(IoFailureError),
    UnknownImplementation(UnknownImplementationError),
    MalformedArtifact(MalformedArtifactError),
    InvalidArgument(InvalidArgumentError),
}

impl ChunkerError {
    pub(crate) fn not_found<S>(what: S, path: &Path, source: io::Error) -> Self
    where
        S: Into<String>,
    {
        Self::NotFound(NotFoundError {
            what: what.into(),
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn io_failure<S>(msg: S, source: io::Error) -> Self
    where
        S: Into<String>,
    {
        Self::IoFailure(IoFailureError {
            msg: msg.into(),
            source: Some(source),
        })
    }

    /// Maps a missing file to [`ChunkerError::NotFound`] and anything else to
    /// [`ChunkerError::IoFailure`].
    pub(crate) fn from_open(what: &str, path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::not_found(what, path, source)
        } else {
            Self::io_failure(format!("failed to access the {what} {path:?}"), source)
        }
    }

    pub(crate) fn unknown_implementation<S>(kind: &'static str, tag: S) -> Self
    where
        S: Into<String>,
    {
        Self::UnknownImplementation(UnknownImplementationError {
            kind,
            tag: tag.into(),
        })
    }

    pub(crate) fn malformed_artifact<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::MalformedArtifact(MalformedArtifactError {
            msg: msg.into(),
            source: None,
        })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }
}

impl fmt::Display for ChunkerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotFound(e) => e.fmt(f),
            Self::IoFailure(e) => e.fmt(f),
            Self::UnknownImplementation(e) => e.fmt(f),
            Self::MalformedArtifact(e) => e.fmt(f),
            Self::InvalidArgument(e) => e.fmt(f),
        }
    }
}

impl Error for ChunkerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(e) => Some(&e.source),
            Self::IoFailure(e) => e.source.as_ref().map(|e| e as &(dyn Error + 'static)),
            Self::MalformedArtifact(e) => e.source.as_ref().map(|e| e as &(dyn Error + 'static)),
            Self::UnknownImplementation(_) | Self::InvalidArgument(_) => None,
        }
    }
}

/// Error used when an expected file does not exist.
#[derive(Debug)]
pub struct NotFoundError {
    /// What the file was expected to hold.
    pub(crate) what: String,

    /// Path of the missing file.
    pub(crate) path: PathBuf,

    pub(crate) source: io::Error,
}

impl NotFoundError {
    /// Gets the path of the missing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NotFoundError: the {} {:?} was not found", self.what, self.path)
    }
}

impl Error for NotFoundError {}

/// Error used when reading, writing, or closing a file fails.
#[derive(Debug)]
pub struct IoFailureError {
    /// Error message.
    pub(crate) msg: String,

    pub(crate) source: Option<io::Error>,
}

impl fmt::Display for IoFailureError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(e) => write!(f, "IoFailureError: {}: {}", self.msg, e),
            None => write!(f, "IoFailureError: {}", self.msg),
        }
    }
}

impl Error for IoFailureError {}

/// Error used when a persisted implementation tag is not registered.
#[derive(Debug)]
pub struct UnknownImplementationError {
    /// Kind of the component, e.g. `"encoder"`.
    pub(crate) kind: &'static str,

    /// The unregistered tag.
    pub(crate) tag: String,
}

impl UnknownImplementationError {
    /// Gets the unregistered tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for UnknownImplementationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "UnknownImplementationError: no {} is registered as {:?}",
            self.kind, self.tag
        )
    }
}

impl Error for UnknownImplementationError {}

/// Error used when persisted data is truncated or inconsistent.
#[derive(Debug)]
pub struct MalformedArtifactError {
    /// Error message.
    pub(crate) msg: String,

    pub(crate) source: Option<bincode::error::DecodeError>,
}

impl fmt::Display for MalformedArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(e) => write!(f, "MalformedArtifactError: {}: {}", self.msg, e),
            None => write!(f, "MalformedArtifactError: {}", self.msg),
        }
    }
}

impl Error for MalformedArtifactError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

impl From<bincode::error::DecodeError> for ChunkerError {
    fn from(error: bincode::error::DecodeError) -> Self {
        Self::MalformedArtifact(MalformedArtifactError {
            msg: "failed to decode".to_string(),
            source: Some(error),
        })
    }
}

impl From<bincode::error::EncodeError> for ChunkerError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::IoFailure(IoFailureError {
            msg: format!("failed to encode: {error}"),
            source: None,
        })
    }
}

impl From<core::num::TryFromIntError> for ChunkerError {
    fn from(error: core::num::TryFromIntError) -> Self {
        Self::invalid_argument("index", error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_from_open() {
        let source = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e = ChunkerError::from_open("label map", Path::new("m.label-map"), source);

        assert!(matches!(e, ChunkerError::NotFound(_)));
        assert_eq!(
            "NotFoundError: the label map \"m.label-map\" was not found",
            e.to_string()
        );
        assert!(e.source().is_some());
    }

    #[test]
    fn test_io_failure_from_open() {
        let source = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let e = ChunkerError::from_open("label map", Path::new("m.label-map"), source);

        assert!(matches!(e, ChunkerError::IoFailure(_)));
        assert_eq!(
            "IoFailureError: failed to access the label map \"m.label-map\": denied",
            e.to_string()
        );
    }

    #[test]
    fn test_unknown_implementation_message() {
        let e = ChunkerError::unknown_implementation("encoder", "crf");

        assert_eq!(
            "UnknownImplementationError: no encoder is registered as \"crf\"",
            e.to_string()
        );
        assert!(e.source().is_none());
    }
}

//! Readers of row data.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::errors::{ChunkerError, Result};
use crate::feature::Row;

/// Source of rows for training or chunking.
pub trait DataSource {
    /// Reads all the remaining rows.
    fn read_rows(&mut self) -> Result<Vec<Row>>;
}

/// Character encoding of input text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,

    /// ISO-8859-1. Every byte is one character.
    Latin1,
}

impl FromStr for TextEncoding {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(Self::Latin1),
            _ => Err("Unsupported text encoding."),
        }
    }
}

impl TextEncoding {
    fn decode(self, bytes: Vec<u8>) -> std::result::Result<String, std::string::FromUtf8Error> {
        match self {
            Self::Utf8 => String::from_utf8(bytes),
            Self::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

/// Reader of the column format used by the CoNLL-2000 chunking task.
///
/// Each line is one row whose attributes are separated by whitespace, with
/// the label in the last column when the data is labeled. A line containing
/// only whitespace is a break.
pub struct ConllReader<R> {
    reader: R,
    encoding: TextEncoding,
    line_no: usize,
}

impl<R> ConllReader<R>
where
    R: BufRead,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            encoding: TextEncoding::default(),
            line_no: 0,
        }
    }

    /// Sets the encoding of the input. UTF-8 is used by default.
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Reads the next row, or `None` at the end of the input.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        let mut buf = vec![];
        let n = self
            .reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| ChunkerError::io_failure("failed to read a line", e))?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        let line = self.encoding.decode(buf).map_err(|e| {
            ChunkerError::io_failure(
                format!("line {} is not valid UTF-8", self.line_no),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        Ok(Some(line.split_whitespace().map(String::from).collect()))
    }
}

impl ConllReader<BufReader<File>> {
    /// Opens the file at `path`.
    ///
    /// # Errors
    ///
    /// [`ChunkerError::NotFound`] will be returned if the file does not
    /// exist.
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ChunkerError::from_open("data file", path, e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R> DataSource for ConllReader<R>
where
    R: BufRead,
{
    fn read_rows(&mut self) -> Result<Vec<Row>> {
        let mut rows = vec![];
        while let Some(row) = self.next_row()? {
            rows.push(row);
        }
        tracing::debug!(n_rows = rows.len(), "read rows");
        Ok(rows)
    }
}

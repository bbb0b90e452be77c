//! Error types for sheet enumeration

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`crate::enumerate_sheets`] and the archive reader.
///
/// Every variant carries the path of the workbook it came from so the host
/// can report which file failed without wrapping the error again.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt zip archive \"{}\": {reason}", path.display())]
    CorruptArchive { path: PathBuf, reason: String },

    #[error("unsupported compression method {method} for entry {entry} in \"{}\"", path.display())]
    UnsupportedFormat {
        path: PathBuf,
        entry: String,
        method: String,
    },

    #[error("entry {part} in \"{}\" exceeds the {limit} byte limit", path.display())]
    PartTooLarge {
        path: PathBuf,
        part: String,
        limit: u64,
    },

    #[error("cannot open entry {requested} in \"{}\" while {open} is still open", path.display())]
    EntryAlreadyOpen {
        path: PathBuf,
        open: String,
        requested: String,
    },

    #[error("no {part} found in xlsx file \"{}\"", path.display())]
    MissingPart { path: PathBuf, part: String },

    #[error("failed to parse {part} in \"{}\": {reason}", path.display())]
    Parse {
        path: PathBuf,
        part: String,
        reason: String,
    },

    #[error("no sheets found in xlsx file \"{}\" (is the file corrupt?)", path.display())]
    NoSheetsFound { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure raised by the XML part parsers.
///
/// The parsers only see bytes, so the enumerator attaches the file and part
/// name when converting to [`Error::Parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// The required container element never appeared in the document.
    #[error("no <{0}> element found")]
    MissingContainer(&'static str),
    #[error("{0}")]
    Malformed(String),
}

//! Random-access reader for the ZIP container of an XLSX file
//!
//! The central directory is indexed once when the archive is opened. Entries
//! are then located by exact name and inflated on demand, one at a time.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::result::ZipError;
use zip::{CompressionMethod, ZipArchive};

use crate::error::{Error, Result};

/// Default maximum uncompressed size accepted for a single entry (256 MiB).
pub const DEFAULT_MAX_PART_BYTES: u64 = 256 * 1024 * 1024;

/// Location and size information for one archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub method: CompressionMethod,
    /// Offset of the entry data within the archive
    pub data_offset: u64,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
}

/// Read state over the decompressed bytes of the currently open entry
#[derive(Debug)]
pub struct EntryCursor {
    info: EntryInfo,
    data: Vec<u8>,
    position: usize,
}

impl EntryCursor {
    pub fn info(&self) -> &EntryInfo {
        &self.info
    }

    /// All decompressed bytes of the entry, independent of the read position
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes not yet consumed through [`Read`]
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.position..]
    }
}

impl Read for EntryCursor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.remaining().read(buf)?;
        self.position += n;
        Ok(n)
    }
}

/// An opened ZIP container.
///
/// At most one entry is open at a time; [`Archive::close_entry`] must be
/// called before another entry can be opened.
pub struct Archive<R: Read + Seek = BufReader<File>> {
    path: PathBuf,
    zip: ZipArchive<R>,
    max_part_bytes: u64,
    current: Option<EntryCursor>,
}

impl Archive<BufReader<File>> {
    /// Open the ZIP file at `path` and read its central directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path, BufReader::new(file))
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Open a ZIP container from any seekable source.
    ///
    /// `path` is only used to label errors.
    pub fn from_reader<P: AsRef<Path>>(path: P, reader: R) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let zip = ZipArchive::new(reader).map_err(|err| archive_error(&path, "", err))?;
        debug!(path = %path.display(), entries = zip.len(), "opened zip archive");
        Ok(Self {
            path,
            zip,
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
            current: None,
        })
    }

    /// Set the maximum uncompressed size accepted for a single entry
    pub fn with_max_part_bytes(mut self, limit: u64) -> Self {
        self.max_part_bytes = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries in the central directory
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.is_empty()
    }

    /// Locate `name` and make its decompressed bytes available.
    ///
    /// Returns `Ok(false)` when the archive has no entry with exactly that
    /// name. The entry is inflated completely before this returns; a CRC
    /// mismatch or short read fails instead of exposing partial data.
    pub fn try_open_entry(&mut self, name: &str) -> Result<bool> {
        if let Some(open) = &self.current {
            return Err(Error::EntryAlreadyOpen {
                path: self.path.clone(),
                open: open.info.name.clone(),
                requested: name.to_string(),
            });
        }

        let mut file = match self.zip.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(false),
            Err(err) => return Err(archive_error(&self.path, name, err)),
        };

        let info = EntryInfo {
            name: name.to_string(),
            method: file.compression(),
            data_offset: file.data_start(),
            compressed_size: file.compressed_size(),
            uncompressed_size: file.size(),
        };

        if !matches!(
            info.method,
            CompressionMethod::Stored | CompressionMethod::Deflated
        ) {
            return Err(Error::UnsupportedFormat {
                path: self.path.clone(),
                entry: name.to_string(),
                method: format!("{:?}", info.method),
            });
        }

        let limit = self.max_part_bytes;
        if info.uncompressed_size > limit {
            return Err(Error::PartTooLarge {
                path: self.path.clone(),
                part: name.to_string(),
                limit,
            });
        }

        // Read one byte past the limit so forged size fields are caught too.
        let mut data = Vec::with_capacity(info.uncompressed_size as usize);
        (&mut file)
            .take(limit.saturating_add(1))
            .read_to_end(&mut data)
            .map_err(|err| Error::CorruptArchive {
                path: self.path.clone(),
                reason: format!("failed to inflate {name}: {err}"),
            })?;

        if data.len() as u64 > limit {
            return Err(Error::PartTooLarge {
                path: self.path.clone(),
                part: name.to_string(),
                limit,
            });
        }
        if data.len() as u64 != info.uncompressed_size {
            return Err(Error::CorruptArchive {
                path: self.path.clone(),
                reason: format!(
                    "{name} inflated to {} bytes but the header records {}",
                    data.len(),
                    info.uncompressed_size
                ),
            });
        }

        debug!(
            entry = name,
            method = ?info.method,
            compressed = info.compressed_size,
            uncompressed = info.uncompressed_size,
            "opened entry"
        );
        self.current = Some(EntryCursor {
            info,
            data,
            position: 0,
        });
        Ok(true)
    }

    /// The currently open entry, if any
    pub fn entry(&self) -> Option<&EntryCursor> {
        self.current.as_ref()
    }

    pub fn entry_mut(&mut self) -> Option<&mut EntryCursor> {
        self.current.as_mut()
    }

    /// Release the open entry. Does nothing when no entry is open.
    pub fn close_entry(&mut self) {
        if let Some(cursor) = self.current.take() {
            debug!(entry = %cursor.info.name, "closed entry");
        }
    }
}

fn archive_error(path: &Path, entry: &str, err: ZipError) -> Error {
    match err {
        ZipError::Io(source) => Error::Io {
            path: path.to_path_buf(),
            source,
        },
        ZipError::UnsupportedArchive(reason) => Error::UnsupportedFormat {
            path: path.to_path_buf(),
            entry: entry.to_string(),
            method: reason.to_string(),
        },
        other => Error::CorruptArchive {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

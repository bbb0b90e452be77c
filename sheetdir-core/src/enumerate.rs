//! Joins the workbook and relationship parts into the ordered sheet list

use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::archive::Archive;
use crate::config::{DuplicatePolicy, EnumeratorConfig};
use crate::error::{Error, Result, XmlError};
use crate::reader::{Relationship, SheetRecord, parse_relationships, parse_workbook, unescape};

pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// One worksheet in tab order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetEntry {
    pub name: String,
    /// 0-based position among the listed worksheets
    pub index: i64,
}

/// Lists the worksheets of XLSX files
#[derive(Debug, Clone, Default)]
pub struct SheetEnumerator {
    config: EnumeratorConfig,
}

impl SheetEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EnumeratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EnumeratorConfig {
        &self.config
    }

    /// Open the file at `path` and list its worksheets
    pub fn enumerate_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<SheetEntry>> {
        let mut archive = Archive::open(path)?.with_max_part_bytes(self.config.max_part_bytes);
        self.enumerate(&mut archive)
    }

    /// List the worksheets of an already opened archive.
    ///
    /// Fails with [`Error::NoSheetsFound`] rather than returning an empty list.
    pub fn enumerate<R: Read + Seek>(&self, archive: &mut Archive<R>) -> Result<Vec<SheetEntry>> {
        let sheets = match read_part(archive, WORKBOOK_PART, parse_workbook)? {
            Ok(sheets) => sheets,
            Err(XmlError::MissingContainer(element)) => {
                debug!(part = WORKBOOK_PART, element, "no sheet container");
                Vec::new()
            }
            Err(err) => return Err(parse_error(archive.path(), WORKBOOK_PART, err)),
        };
        let relationships = read_part(archive, WORKBOOK_RELS_PART, parse_relationships)?
            .map_err(|err| parse_error(archive.path(), WORKBOOK_RELS_PART, err))?;
        debug!(
            sheets = sheets.len(),
            relationships = relationships.len(),
            "parsed workbook parts"
        );

        let worksheet_ids = self.worksheet_ids(archive.path(), &relationships)?;
        let entries = select_sheets(sheets, &worksheet_ids);

        if entries.is_empty() {
            return Err(Error::NoSheetsFound {
                path: archive.path().to_path_buf(),
            });
        }
        Ok(entries)
    }

    /// Ids of the relationships whose type marks a worksheet
    fn worksheet_ids(
        &self,
        path: &Path,
        relationships: &[Relationship],
    ) -> Result<HashSet<String>> {
        let mut types: HashMap<&str, &str> = HashMap::new();
        for rel in relationships {
            if let Some(previous) = types.insert(&rel.id, &rel.rel_type) {
                match self.config.duplicate_relationships {
                    DuplicatePolicy::LastWins => {
                        warn!(
                            id = %rel.id,
                            previous,
                            replacement = %rel.rel_type,
                            "duplicate relationship id"
                        );
                    }
                    DuplicatePolicy::Reject => {
                        return Err(Error::Parse {
                            path: path.to_path_buf(),
                            part: WORKBOOK_RELS_PART.to_string(),
                            reason: format!("duplicate relationship id {}", rel.id),
                        });
                    }
                }
            }
        }

        let suffix = self.config.worksheet_type_suffix.as_str();
        let ids: HashSet<String> = types
            .into_iter()
            .filter(|(_, rel_type)| rel_type.ends_with(suffix))
            .map(|(id, _)| id.to_string())
            .collect();

        if ids.is_empty() {
            warn!(
                path = %path.display(),
                "no worksheet relationships found; listing every workbook sheet"
            );
        }
        Ok(ids)
    }
}

/// List the worksheets of the XLSX file at `path` with default settings
pub fn enumerate_sheets<P: AsRef<Path>>(path: P) -> Result<Vec<SheetEntry>> {
    SheetEnumerator::new().enumerate_file(path)
}

/// Keep worksheet records in document order and number them.
///
/// An empty id set means the relationships part named no worksheets at all;
/// every record is kept then instead of hiding the whole workbook.
fn select_sheets(sheets: Vec<SheetRecord>, worksheet_ids: &HashSet<String>) -> Vec<SheetEntry> {
    sheets
        .into_iter()
        .filter(|sheet| {
            worksheet_ids.is_empty() || worksheet_ids.contains(&sheet.relationship_id)
        })
        .enumerate()
        .map(|(index, sheet)| SheetEntry {
            name: unescape(&sheet.name).into_owned(),
            index: index as i64,
        })
        .collect()
}

/// Open a required part, run `parse` over its bytes and close it again.
///
/// The outer result carries archive failures, the inner one the parser's.
fn read_part<R, T, F>(
    archive: &mut Archive<R>,
    part: &str,
    parse: F,
) -> Result<std::result::Result<T, XmlError>>
where
    R: Read + Seek,
    F: FnOnce(&[u8]) -> std::result::Result<T, XmlError>,
{
    if !archive.try_open_entry(part)? {
        return Err(missing_part(archive.path(), part));
    }
    let parsed = archive.entry().map(|entry| parse(entry.bytes()));
    archive.close_entry();
    parsed.ok_or_else(|| missing_part(archive.path(), part))
}

fn missing_part(path: &Path, part: &str) -> Error {
    Error::MissingPart {
        path: path.to_path_buf(),
        part: part.to_string(),
    }
}

fn parse_error(path: &Path, part: &str, err: XmlError) -> Error {
    Error::Parse {
        path: path.to_path_buf(),
        part: part.to_string(),
        reason: err.to_string(),
    }
}

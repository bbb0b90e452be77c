//! sheetdir-core: list the worksheets of an XLSX file
//!
//! Reads only `xl/workbook.xml` and `xl/_rels/workbook.xml.rels` from the
//! archive and joins them by relationship id, so cell data is never touched.

pub mod archive;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod reader;
pub mod table;

pub use archive::Archive;
pub use config::{DuplicatePolicy, EnumeratorConfig};
pub use enumerate::{SheetEntry, SheetEnumerator, enumerate_sheets};
pub use error::{Error, Result};
pub use table::SheetTable;

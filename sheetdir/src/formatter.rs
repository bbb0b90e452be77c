//! Output formatters for sheet listings

use anyhow::Result;
use colored::*;
use serde::Serialize;
use serde_json::Value;
use sheetdir_core::SheetTable;
use sheetdir_core::table::COLUMNS;
use std::io::Write;
use std::path::Path;

/// Print one workbook's sheets as an indented, colored list
pub fn write_human<W: Write>(
    out: &mut W,
    file_path: &Path,
    table: &mut SheetTable,
) -> Result<()> {
    writeln!(out, "{}", file_path.display().to_string().bold())?;

    let total = table.remaining();
    while let Some(batch) = table.next_batch() {
        for entry in batch {
            writeln!(
                out,
                "  {} {}",
                format!("{:>3}", entry.index).bright_black(),
                entry.name.cyan()
            )?;
        }
    }

    let noun = if total == 1 { "sheet" } else { "sheets" };
    writeln!(out, "  {}", format!("{} {}", total, noun).green())?;
    writeln!(out)?;
    Ok(())
}

/// JSON document for one workbook
pub fn json_listing(file_path: &Path, table: &mut SheetTable) -> Value {
    let mut sheets = Vec::with_capacity(table.remaining());
    while let Some(batch) = table.next_batch() {
        sheets.extend(batch.iter().cloned());
    }

    serde_json::json!({
        "file": file_path.display().to_string(),
        "columns": COLUMNS,
        "sheets": sheets,
    })
}

/// Print every listing as a single pretty JSON array
pub fn write_json<W: Write>(out: &mut W, listings: &[Value]) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(listings)?)?;
    Ok(())
}

#[derive(Serialize)]
struct CsvRow<'a> {
    file: &'a str,
    sheet_name: &'a str,
    sheet_index: i64,
}

/// CSV writer with the header row already written
pub fn csv_writer<W: Write>(out: W) -> Result<csv::Writer<W>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(["file", COLUMNS[0], COLUMNS[1]])?;
    Ok(writer)
}

/// Append one workbook's sheets as CSV rows
pub fn write_csv<W: Write>(
    writer: &mut csv::Writer<W>,
    file_path: &Path,
    table: &mut SheetTable,
) -> Result<()> {
    let file = file_path.display().to_string();
    while let Some(batch) = table.next_batch() {
        for entry in batch {
            writer.serialize(CsvRow {
                file: &file,
                sheet_name: &entry.name,
                sheet_index: entry.index,
            })?;
        }
    }
    Ok(())
}

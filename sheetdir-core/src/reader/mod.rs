//! Narrow XML readers for the two workbook parts needed to list sheets

use quick_xml::Reader;
use quick_xml::events::BytesStart;

use crate::error::XmlError;

pub mod entities;
pub mod relationships;
pub mod workbook;

pub use entities::unescape;
pub use relationships::{Relationship, parse_relationships};
pub use workbook::{SheetRecord, parse_workbook};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Build a pull reader over `xml`, skipping a leading UTF-8 byte order mark
pub(crate) fn xml_reader(xml: &[u8]) -> Reader<&[u8]> {
    let xml = xml.strip_prefix(UTF8_BOM).unwrap_or(xml);
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    reader
}

pub(crate) fn syntax_error(reader: &Reader<&[u8]>, err: quick_xml::Error) -> XmlError {
    XmlError::Malformed(format!(
        "XML parsing error at byte {}: {}",
        reader.error_position(),
        err
    ))
}

/// Collect raw (still escaped) attribute values keyed by attribute local name.
///
/// Namespace prefixes are dropped, so `r:id` is reported as `id`.
pub(crate) fn raw_attributes(
    element: &BytesStart<'_>,
) -> Result<Vec<(Vec<u8>, String)>, XmlError> {
    let mut attrs = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed(format!("invalid attribute: {e}")))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| XmlError::Malformed(format!("attribute is not valid UTF-8: {e}")))?
            .to_string();
        attrs.push((attr.key.local_name().as_ref().to_vec(), value));
    }
    Ok(attrs)
}

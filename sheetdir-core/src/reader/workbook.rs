//! Workbook part (`xl/workbook.xml`) reader

use quick_xml::events::Event;

use super::{raw_attributes, syntax_error, xml_reader};
use crate::error::XmlError;

/// A `<sheet>` entry of the workbook, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRecord {
    /// Display name exactly as written, entities still escaped
    pub name: String,
    pub relationship_id: String,
}

/// Parse the `<sheet>` elements inside `<sheets>`, preserving document order.
///
/// The relationship id is read from the attribute whose local name is `id`
/// (normally `r:id`). Fails with [`XmlError::MissingContainer`] when the
/// document has no `<sheets>` element at all.
pub fn parse_workbook(xml: &[u8]) -> Result<Vec<SheetRecord>, XmlError> {
    let mut reader = xml_reader(xml);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    let mut found_container = false;
    let mut in_sheets = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"sheets" => {
                found_container = true;
                in_sheets = true;
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheets" => {
                found_container = true;
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if in_sheets && e.local_name().as_ref() == b"sheet" =>
            {
                let mut name = None;
                let mut relationship_id = None;
                for (key, value) in raw_attributes(&e)? {
                    match key.as_slice() {
                        b"name" => name = Some(value),
                        b"id" => relationship_id = Some(value),
                        _ => {}
                    }
                }

                match (name, relationship_id) {
                    (Some(name), Some(relationship_id)) => sheets.push(SheetRecord {
                        name,
                        relationship_id,
                    }),
                    _ => {
                        return Err(XmlError::Malformed(format!(
                            "<sheet> without name or relationship id at byte {}",
                            reader.buffer_position()
                        )));
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"sheets" => {
                in_sheets = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(syntax_error(&reader, e)),
            _ => {}
        }
        buf.clear();
    }

    if in_sheets {
        return Err(XmlError::Malformed(
            "<sheets> is not closed before end of document".to_string(),
        ));
    }
    if !found_container {
        return Err(XmlError::MissingContainer("sheets"));
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, rid: &str) -> SheetRecord {
        SheetRecord {
            name: name.to_string(),
            relationship_id: rid.to_string(),
        }
    }

    #[test]
    fn test_sheets_in_document_order() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<bookViews><workbookView activeTab="1"/></bookViews>
<sheets>
<sheet name="Zeta" sheetId="3" r:id="rId3"/>
<sheet name="Alpha" sheetId="1" r:id="rId1"/>
<sheet name="Mid" sheetId="2" state="hidden" r:id="rId2"/>
</sheets>
<definedNames><definedName name="Range1">Zeta!$A$1</definedName></definedNames>
</workbook>"#;

        let sheets = parse_workbook(xml).unwrap();
        assert_eq!(
            sheets,
            vec![
                record("Zeta", "rId3"),
                record("Alpha", "rId1"),
                record("Mid", "rId2")
            ]
        );
    }

    #[test]
    fn test_names_are_left_escaped() {
        let xml = br#"<workbook><sheets><sheet name="R&amp;D &#x41;" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
        let sheets = parse_workbook(xml).unwrap();
        assert_eq!(sheets[0].name, "R&amp;D &#x41;");
    }

    #[test]
    fn test_prefixed_elements_and_attributes() {
        let xml = br#"<x:workbook xmlns:x="main" xmlns:ns1="rels">
<x:sheets>
  <x:sheet ns1:id="rId7" name="Prefixed" sheetId="1"></x:sheet>
</x:sheets>
</x:workbook>"#;
        let sheets = parse_workbook(xml).unwrap();
        assert_eq!(sheets, vec![record("Prefixed", "rId7")]);
    }

    #[test]
    fn test_sheet_id_is_not_relationship_id() {
        let xml = br#"<workbook><sheets><sheet sheetId="1" name="NoRid"/></sheets></workbook>"#;
        assert!(matches!(parse_workbook(xml), Err(XmlError::Malformed(_))));
    }

    #[test]
    fn test_sheet_outside_container_is_ignored() {
        let xml = br#"<workbook>
<sheet name="Stray" r:id="rId9"/>
<sheets><sheet name="Real" r:id="rId1"/></sheets>
</workbook>"#;
        assert_eq!(parse_workbook(xml).unwrap(), vec![record("Real", "rId1")]);
    }

    #[test]
    fn test_empty_container() {
        assert!(parse_workbook(b"<workbook><sheets/></workbook>").unwrap().is_empty());
        assert!(
            parse_workbook(b"<workbook><sheets></sheets></workbook>")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_missing_container() {
        let result = parse_workbook(b"<workbook><bookViews/></workbook>");
        assert_eq!(result, Err(XmlError::MissingContainer("sheets")));
        assert_eq!(parse_workbook(b""), Err(XmlError::MissingContainer("sheets")));
    }

    #[test]
    fn test_unterminated_container() {
        let result = parse_workbook(br#"<workbook><sheets><sheet name="A" r:id="rId1"/>"#);
        assert!(matches!(result, Err(XmlError::Malformed(_))));
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let mut xml = b"\xEF\xBB\xBF".to_vec();
        xml.extend_from_slice(br#"<workbook><sheets><sheet name="A" r:id="rId1"/></sheets></workbook>"#);
        assert_eq!(parse_workbook(&xml).unwrap(), vec![record("A", "rId1")]);
    }
}

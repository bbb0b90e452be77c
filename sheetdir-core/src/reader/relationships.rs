//! Relationship part (`.rels`) reader

use quick_xml::events::Event;

use super::{raw_attributes, syntax_error, xml_reader};
use crate::error::XmlError;

/// One `<Relationship>` entry of a relationships part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    /// Relationship type URI, e.g. `.../relationships/worksheet`
    pub rel_type: String,
    pub target: String,
}

impl Relationship {
    pub fn has_type_suffix(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }
}

/// Parse every `Relationship` element of a `.rels` part, in document order.
///
/// Elements may be self-closing or paired and may carry a namespace prefix.
/// `Id` is required; a missing `Type` or `Target` is read as an empty string.
/// Attribute values are returned exactly as written in the document.
pub fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>, XmlError> {
    let mut reader = xml_reader(xml);
    let mut buf = Vec::new();
    let mut relationships = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut rel_type = String::new();
                let mut target = String::new();

                for (key, value) in raw_attributes(&e)? {
                    match key.as_slice() {
                        b"Id" => id = Some(value),
                        b"Type" => rel_type = value,
                        b"Target" => target = value,
                        _ => {}
                    }
                }

                let id = id.ok_or_else(|| {
                    XmlError::Malformed(format!(
                        "Relationship without Id attribute at byte {}",
                        reader.buffer_position()
                    ))
                })?;
                relationships.push(Relationship {
                    id,
                    rel_type,
                    target,
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(syntax_error(&reader, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

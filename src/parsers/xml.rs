//! Minimal XML element tree built on quick-xml.
//!
//! The .NET and Maven parsers need element values plus the byte offset of
//! each element's start tag. quick-xml's streaming reader reports positions
//! as it goes, so this module folds its events into a small tree that keeps
//! the offset on every node.

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::error::{ParseError, Result};

/// An XML element with its attributes, text and children
#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Local name (namespace prefix stripped)
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Concatenated character data directly inside this element
    pub text: String,
    pub children: Vec<Element>,
    /// Byte offset of the `<` that opens this element
    pub offset: usize,
}

impl Element {
    /// Attribute value by exact local name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of the first direct child with the given name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }

    /// Follows a path of direct child names
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// All descendants, in document order
    pub fn descendants(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        let mut stack: Vec<&Element> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            found.push(node);
            stack.extend(node.children.iter().rev());
        }
        found
    }

    /// All descendants with the given name, in document order
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        self.descendants()
            .into_iter()
            .filter(|node| node.name == name)
            .collect()
    }

    fn from_start(start: &BytesStart<'_>, offset: usize) -> Result<Self> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            attributes.push((key, decode_text(&attr.value)));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            offset,
            ..Default::default()
        })
    }
}

fn decode_text(raw: &[u8]) -> String {
    let raw = String::from_utf8_lossy(raw);
    match unescape(&raw) {
        Ok(text) => text.into_owned(),
        Err(_) => raw.into_owned(),
    }
}

/// Text for an entity or character reference inside element content.
///
/// Unknown entities are kept literally.
fn resolve_reference(reference: &BytesRef<'_>) -> String {
    if let Ok(Some(ch)) = reference.resolve_char_ref() {
        return ch.to_string();
    }
    let name = String::from_utf8_lossy(&**reference);
    match resolve_predefined_entity(&name) {
        Some(text) => text.to_string(),
        None => format!("&{name};"),
    }
}

/// Start of the tag whose event began at `position`.
///
/// quick-xml reports the position just before or just after the `<`
/// depending on the preceding event, so both are accepted.
fn tag_start(content: &str, position: usize) -> usize {
    let bytes = content.as_bytes();
    if bytes.get(position) == Some(&b'<') {
        position
    } else if position > 0 && bytes.get(position - 1) == Some(&b'<') {
        position - 1
    } else {
        content
            .get(position..)
            .and_then(|rest| rest.find('<'))
            .map_or(position, |rel| position + rel)
    }
}

/// Parses an XML document into a tree under a synthetic, unnamed root.
///
/// Syntax errors, mismatched end tags and unclosed elements are errors.
pub fn parse_document(content: &str) -> Result<Element> {
    let mut reader = Reader::from_str(content);
    let mut stack = vec![Element::default()];

    loop {
        let position = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(start) => {
                let offset = tag_start(content, position);
                stack.push(Element::from_start(&start, offset)?);
            }
            Event::Empty(start) => {
                let offset = tag_start(content, position);
                let element = Element::from_start(&start, offset)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Event::End(end) => {
                if stack.len() < 2 {
                    return Err(ParseError::UnclosedElement {
                        name: String::from_utf8_lossy(end.local_name().as_ref()).into_owned(),
                    });
                }
                if let Some(element) = stack.pop()
                    && let Some(parent) = stack.last_mut()
                {
                    parent.children.push(element);
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&decode_text(&text));
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&resolve_reference(&reference));
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() > 1 {
        let name = stack.pop().map(|e| e.name).unwrap_or_default();
        return Err(ParseError::UnclosedElement { name });
    }
    Ok(stack.pop().unwrap_or_default())
}

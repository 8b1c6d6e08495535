//! Minimal namespace-agnostic XML tree.
//!
//! DMN files come with `dmn:` prefixes, a default namespace, or no namespace at
//! all depending on the modeller that wrote them. Elements and attributes are
//! therefore stored under their local names only, and namespace declarations
//! are dropped.

use crate::error::ExtractError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub line: usize,
}

impl XmlElement {
    fn new(name: String, attributes: Vec<(String, String)>, line: usize) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
            line,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |e| e.name == name)
    }

    /// All elements of the subtree in document order, this one included.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(element) = stack.pop() {
            found.push(element);
            // reversed so the first child is visited next
            let children: Vec<&XmlElement> = element.elements().collect();
            stack.extend(children.into_iter().rev());
        }
        found
    }

    /// Concatenated text of the whole subtree.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(self, &mut text);
        text
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Text(text) => out.push_str(text),
            XmlNode::Element(inner) => collect_text(inner, out),
        }
    }
}

/// Translate a byte offset into a 1-based (line, column) pair.
fn line_and_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = match before.iter().rposition(|&b| b == b'\n') {
        Some(newline) => offset - newline,
        None => offset + 1,
    };
    (line, column)
}

fn syntax_error(source: &str, offset: usize, message: impl Into<String>) -> ExtractError {
    let (line, column) = line_and_column(source, offset);
    ExtractError::Syntax {
        message: message.into(),
        line,
        column,
    }
}

fn read_start(source: &str, offset: usize, start: &BytesStart<'_>) -> Result<XmlElement, ExtractError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| syntax_error(source, offset, e.to_string()))?;
        let raw_key = attribute.key.as_ref();
        if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
            continue;
        }
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| syntax_error(source, offset, e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    let (line, _) = line_and_column(source, offset);
    Ok(XmlElement::new(name, attributes, line))
}

/// Parse raw bytes into a tree, enforcing well-formedness.
pub fn parse(bytes: &[u8]) -> Result<XmlElement, ExtractError> {
    let source = std::str::from_utf8(bytes)?;
    // a leading BOM is legal but not part of the markup
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let mut reader = Reader::from_str(source);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let offset = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| syntax_error(source, reader.buffer_position(), e.to_string()))?;

        match event {
            Event::Start(start) => {
                if root.is_some() {
                    let (line, column) = line_and_column(source, offset);
                    return Err(ExtractError::TrailingContent { line, column });
                }
                stack.push(read_start(source, offset, &start)?);
            }
            Event::Empty(start) => {
                if root.is_some() {
                    let (line, column) = line_and_column(source, offset);
                    return Err(ExtractError::TrailingContent { line, column });
                }
                let element = read_start(source, offset, &start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.local_name().as_ref()).into_owned();
                let element = match stack.pop() {
                    Some(element) if element.name == name => element,
                    Some(element) => {
                        return Err(syntax_error(
                            source,
                            offset,
                            format!("expected </{}>, found </{}>", element.name, name),
                        ))
                    }
                    None => {
                        return Err(syntax_error(
                            source,
                            offset,
                            format!("closing tag </{name}> has no matching opening tag"),
                        ))
                    }
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(element)),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| syntax_error(source, offset, e.to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None if root.is_some() => {
                        let (line, column) = line_and_column(source, offset);
                        return Err(ExtractError::TrailingContent { line, column });
                    }
                    None => {
                        return Err(syntax_error(
                            source,
                            offset,
                            "text content before the root element",
                        ))
                    }
                }
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                let text = std::str::from_utf8(&raw)?.to_string();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Text(text)),
                    None => {
                        return Err(syntax_error(source, offset, "CDATA section outside the root element"))
                    }
                }
            }
            Event::Eof => break,
            // declarations, comments, processing instructions and doctypes carry nothing we analyze
            _ => {}
        }
    }

    if let Some(unclosed) = stack.pop() {
        return Err(ExtractError::UnclosedElement {
            name: unclosed.name,
            line: unclosed.line,
        });
    }
    root.ok_or(ExtractError::MissingRoot)
}

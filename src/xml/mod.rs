//! # XML Element Tree
//!
//! A minimal DOM built from quick-xml events: each element carries its tag
//! name, attributes, and ordered child nodes (elements and text). The parser
//! in [`crate::parser`] walks this tree; nothing here knows about widgets.
//!
//! Comments, processing instructions and the XML declaration are skipped.
//! Text is kept verbatim (entity-unescaped); whitespace handling is the
//! widget parser's business.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::QuireError;

/// An ordered child of an element.
#[derive(Debug, Clone)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// A parsed XML element.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value with a default for missing attributes.
    pub fn attr_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.attr(name).unwrap_or(default)
    }

    /// Iterate the element children, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let XmlNode::Text(t) = node {
                out.push_str(t);
            }
        }
        out
    }
}

/// Parse an XML string into its root element.
pub fn parse(input: &str) -> Result<XmlElement, QuireError> {
    let mut reader = Reader::from_str(input);

    // The stack holds the chain of open elements; the root lands in `done`
    // when its end tag closes the last open element.
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut done: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if done.is_some() {
                    return Err(QuireError::Parse(
                        "multiple root elements in document".to_string(),
                    ));
                }
                stack.push(element_from_start(&e)?);
            }
            Event::Empty(e) => {
                if done.is_some() {
                    return Err(QuireError::Parse(
                        "multiple root elements in document".to_string(),
                    ));
                }
                let element = element_from_start(&e)?;
                attach(&mut stack, &mut done, element);
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    QuireError::Parse("unexpected closing tag".to_string())
                })?;
                attach(&mut stack, &mut done, element);
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| QuireError::Parse(format!("malformed XML text: {}", e)))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(text.into_owned()));
                }
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(QuireError::Parse("unclosed element in document".to_string()));
    }

    done.ok_or_else(|| QuireError::Parse("document has no root element".to_string()))
}

fn element_from_start(
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<XmlElement, QuireError> {
    let mut element = XmlElement::new(&String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| QuireError::Parse(format!("malformed XML attribute: {}", e)))?
            .into_owned();
        element.attrs.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut Vec<XmlElement>, done: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => *done = Some(element),
    }
}

//! Reading and writing XML trees
//!
//! Thin wrappers over `xmltree` that fix the output format used for every SSP
//! document: pretty-printed UTF-8 with an XML declaration and the canonical
//! namespace prefixes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;
use ::xml::name::OwnedName;
use ::xml::reader::{EventReader, ParserConfig, XmlEvent};
use xmltree::{EmitterConfig, Element, XMLNode};

use crate::error::{Result, SspError};
use crate::namespace::register_namespaces;

/// Default indentation for serialized documents
pub const DEFAULT_INDENT: &str = "  ";

/// Parse the XML document at `path` into an element tree
pub fn parse_file(path: &Path) -> Result<Element> {
    let file = File::open(path).map_err(|e| SspError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let root = parse(BufReader::new(file)).map_err(|reason| SspError::Read {
        path: path.to_path_buf(),
        reason,
    })?;
    debug!(path = %path.display(), root = %root.name, "Parsed XML document");
    Ok(root)
}

/// Build an element tree from `source`.
///
/// Prefixed attributes such as `xsi:schemaLocation` are keyed by their
/// qualified name, so they are written back with the prefix. Unprefixed
/// attributes are keyed by their local name.
pub fn parse<R: Read>(source: R) -> std::result::Result<Element, String> {
    let config = ParserConfig::new().ignore_comments(false);
    let mut open: Vec<Element> = Vec::new();

    for event in EventReader::new_with_config(source, config) {
        match event.map_err(|e| e.to_string())? {
            XmlEvent::StartElement {
                name,
                attributes,
                namespace,
            } => {
                let mut element = Element::new(&name.local_name);
                element.prefix = name.prefix;
                element.namespace = name.namespace;
                if !namespace.is_essentially_empty() {
                    element.namespaces = Some(namespace);
                }
                for attribute in attributes {
                    element
                        .attributes
                        .insert(attribute_key(attribute.name), attribute.value);
                }
                open.push(element);
            }
            XmlEvent::EndElement { .. } => {
                let element = open
                    .pop()
                    .ok_or_else(|| "unbalanced end tag".to_string())?;
                match open.last_mut() {
                    Some(parent) => parent.children.push(XMLNode::Element(element)),
                    None => return Ok(element),
                }
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) => {
                if let Some(parent) = open.last_mut() {
                    parent.children.push(XMLNode::Text(text));
                }
            }
            XmlEvent::Comment(comment) => {
                if let Some(parent) = open.last_mut() {
                    parent.children.push(XMLNode::Comment(comment));
                }
            }
            XmlEvent::ProcessingInstruction { name, data } => {
                if let Some(parent) = open.last_mut() {
                    parent
                        .children
                        .push(XMLNode::ProcessingInstruction(name, data));
                }
            }
            _ => {}
        }
    }

    Err("document has no root element".to_string())
}

fn attribute_key(name: OwnedName) -> String {
    match name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local_name),
        None => name.local_name,
    }
}

/// Serialize `root` as a complete document
pub fn to_bytes(root: &Element) -> Result<Vec<u8>> {
    to_bytes_with_indent(root, DEFAULT_INDENT)
}

/// Serialize `root` as a complete document using the given indentation
pub fn to_bytes_with_indent(root: &Element, indent: &str) -> Result<Vec<u8>> {
    let mut root = root.clone();
    register_namespaces(&mut root);

    let config = EmitterConfig::new()
        .perform_indent(true)
        .indent_string(indent.to_string())
        .write_document_declaration(true);

    let mut buffer = Vec::new();
    root.write_with_config(&mut buffer, config)
        .map_err(|e| SspError::Serialize(e.to_string()))?;
    Ok(buffer)
}

/// Serialize `root` as a complete document into a string
pub fn to_string(root: &Element) -> Result<String> {
    let bytes = to_bytes(root)?;
    String::from_utf8(bytes).map_err(|e| SspError::Serialize(e.to_string()))
}

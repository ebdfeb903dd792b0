//! XML Reshaping Module
//!
//! This module reads an XML document into a lightweight element tree and
//! reshapes it into either a generic JSON object or a CSV table. CDATA
//! sections are flattened into ordinary text before reshaping.

use crate::convert::ConvertError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

/// One parsed XML element: name, attributes, child elements, merged text
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

/// Parse an XML document into its root element
///
/// Declarations, comments, and processing instructions are ignored; CDATA
/// content is merged into the surrounding element's text.
fn parse_document(xml: &str) -> Result<Element, ConvertError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(cdata) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or(ConvertError::NoRoot)
}

/// Attach a completed element to its parent, or record it as the root
fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            root.get_or_insert(element);
        }
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, ConvertError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            attribute.unescape_value()?.into_owned(),
        ));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

/// Reshape an XML document into a JSON object wrapping the root element
///
/// Attributes are keyed with an `@` prefix, repeated child names collect
/// into arrays, and mixed text lands under `#text`. Leaf elements render as
/// plain strings.
pub fn xml_to_json(xml: &str) -> Result<Value, ConvertError> {
    let root = parse_document(xml)?;

    let mut wrapper = Map::new();
    wrapper.insert(root.name.clone(), element_value(&root));
    Ok(Value::Object(wrapper))
}

fn element_value(element: &Element) -> Value {
    if element.attributes.is_empty() && element.children.is_empty() {
        return Value::String(element.text.clone());
    }

    let mut map = Map::new();
    for (name, value) in &element.attributes {
        map.insert(format!("@{}", name), Value::String(value.clone()));
    }

    for child in &element.children {
        let value = element_value(child);
        match map.get_mut(&child.name) {
            // Second and later occurrences of a name collect into an array
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(child.name.clone(), value);
            }
        }
    }

    if !element.text.is_empty() {
        map.insert("#text".to_string(), Value::String(element.text.clone()));
    }

    Value::Object(map)
}

/// Reshape an XML document into a CSV table
///
/// Children of the root element are the rows; the first row's child element
/// names form the header line, and each row's child element text values form
/// its cells.
pub fn xml_to_csv(xml: &str) -> Result<String, ConvertError> {
    let root = parse_document(xml)?;

    let mut out = String::new();
    let mut header_row = true;
    for row in &root.children {
        if header_row {
            let headers: Vec<&str> = row.children.iter().map(|cell| cell.name.as_str()).collect();
            out.push_str(&headers.join(","));
            out.push_str("\r\n");
            header_row = false;
        }

        let cells: Vec<&str> = row.children.iter().map(|cell| cell.text.as_str()).collect();
        out.push_str(&cells.join(","));
        out.push_str("\r\n");
    }

    Ok(out)
}

//! # Design Tree
//!
//! The abstract shape a design file is reduced to before `Load`: named
//! elements with string attributes, child elements, and the line/column the
//! element started at. The layout tree only ever sees this shape; whether it
//! came from XML or JSON is decided here.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::{DesignError, QuireError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignElement {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<DesignElement>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl DesignElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Builder helper, mostly for tests and programmatic designs.
    pub fn attr(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, child: DesignElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<DesignElement>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Build a `DesignError` positioned at this element.
    pub fn error(&self, message: impl Into<String>) -> DesignError {
        DesignError::new(message, self.line, self.column)
    }

    pub fn required(&self, key: &str) -> Result<&str, DesignError> {
        self.get(key)
            .ok_or_else(|| self.error(format!("<{}> requires attribute '{}'", self.name, key)))
    }

    pub fn get_i32(&self, key: &str) -> Result<Option<i32>, DesignError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<i32>().map(Some).map_err(|_| {
                self.error(format!("attribute '{}' must be an integer, got '{}'", key, raw))
            }),
        }
    }

    pub fn get_u32(&self, key: &str) -> Result<Option<u32>, DesignError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<u32>().map(Some).map_err(|_| {
                self.error(format!(
                    "attribute '{}' must be a non-negative integer, got '{}'",
                    key, raw
                ))
            }),
        }
    }

    pub fn get_f32(&self, key: &str) -> Result<Option<f32>, DesignError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<f32>().map(Some).map_err(|_| {
                self.error(format!("attribute '{}' must be a number, got '{}'", key, raw))
            }),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, DesignError> {
        match self.get(key).map(str::trim) {
            None => Ok(None),
            Some("true") | Some("1") | Some("yes") => Ok(Some(true)),
            Some("false") | Some("0") | Some("no") => Ok(Some(false)),
            Some(raw) => Err(self.error(format!(
                "attribute '{}' must be a boolean, got '{}'",
                key, raw
            ))),
        }
    }

    pub fn flag(&self, key: &str) -> Result<bool, DesignError> {
        Ok(self.get_bool(key)?.unwrap_or(false))
    }

    pub fn find(&self, name: &str) -> Option<&DesignElement> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Parse a design tree from its JSON form.
pub fn from_json(json: &str) -> Result<DesignElement, QuireError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a design tree from XML. Text content between elements is ignored;
/// everything the layout needs lives in attributes.
pub fn from_xml(xml: &str) -> Result<DesignElement, QuireError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<DesignElement> = Vec::new();
    let mut root: Option<DesignElement> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(|e| {
            let (line, column) = line_column(xml, reader.error_position() as usize);
            QuireError::Xml {
                message: e.to_string(),
                line,
                column,
            }
        })?;
        match event {
            Event::Start(e) => {
                stack.push(element_from_start(xml, offset, &e)?);
            }
            Event::Empty(e) => {
                let element = element_from_start(xml, offset, &e)?;
                attach(&mut stack, &mut root, element);
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

    root.ok_or_else(|| QuireError::Xml {
        message: "document has no root element".to_string(),
        line: 1,
        column: 1,
    })
}

fn attach(stack: &mut [DesignElement], root: &mut Option<DesignElement>, element: DesignElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn element_from_start(
    xml: &str,
    offset: usize,
    e: &BytesStart<'_>,
) -> Result<DesignElement, QuireError> {
    // `offset` points just before the '<', skip leading whitespace between tags
    let start = xml[offset..]
        .find('<')
        .map(|i| offset + i)
        .unwrap_or(offset);
    let (line, column) = line_column(xml, start);
    let mut element = DesignElement {
        name: String::from_utf8_lossy(e.name().as_ref()).to_string(),
        line,
        column,
        ..Default::default()
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|err| QuireError::Xml {
            message: err.to_string(),
            line,
            column,
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| QuireError::Xml {
                message: err.to_string(),
                line,
                column,
            })?
            .to_string();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

/// 1-based line and column of a byte offset.
fn line_column(text: &str, offset: usize) -> (u32, u32) {
    let offset = offset.min(text.len());
    let before = &text[..offset];
    let line = before.matches('\n').count() as u32 + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() as u32 + 1,
        None => before.chars().count() as u32 + 1,
    };
    (line, column)
}

//! Minimal element tree built from a quick-xml event stream.
//!
//! Manifest decoders walk this tree instead of matching events directly,
//! which keeps the deeply nested SCORM 2004 sequencing structures readable.
//! Names are split into prefix and local name; lookups go by local name so
//! that documents using unusual namespace prefixes still decode.

use super::escape::{resolve_entity, unescape_xml};
use crate::common::error::ParseError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// An XML attribute with its name split at the colon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub name: String,
    pub value: String,
}

/// An XML element and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub prefix: Option<String>,
    pub name: String,
    /// Namespace URI the prefix (or default namespace) is bound to
    pub namespace: Option<String>,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlElement>,
    /// Direct text content, entity references resolved
    pub text: String,
}

/// Position and description of a well-formedness failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlError {
    pub position: u64,
    pub message: String,
}

impl XmlError {
    /// Attach the file path and turn into a parser error.
    pub fn into_parse_error(self, path: &str) -> ParseError {
        ParseError::Xml {
            path: path.to_string(),
            position: self.position,
            message: self.message,
        }
    }
}

fn split_name(raw: &[u8]) -> (Option<String>, String) {
    let qualified = String::from_utf8_lossy(raw);
    match qualified.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, qualified.into_owned()),
    }
}

impl XmlElement {
    /// Name including the prefix, as written in the document.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }

    /// Whether the local name matches, ignoring ASCII case.
    #[inline]
    pub fn is(&self, local: &str) -> bool {
        self.name.eq_ignore_ascii_case(local)
    }

    /// Whether the element's namespace URI contains `fragment`.
    ///
    /// Used to tell `imsss:objectives` from `adlseq:objectives` without
    /// trusting the prefix a document happens to use.
    pub fn in_namespace(&self, fragment: &str) -> bool {
        self.namespace.as_deref().is_some_and(|ns| ns.contains(fragment))
    }

    /// Attribute value by local name. Namespace declarations are never returned.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.prefix.as_deref() != Some("xmlns") && a.name == local)
            .map(|a| a.value.as_str())
    }

    /// Attribute value by local name, ignoring ASCII case.
    ///
    /// SCORM 1.2 writes `adlcp:scormtype` while SCORM 2004 writes
    /// `adlcp:scormType`; both spellings occur in the wild for either version.
    pub fn attr_ignore_case(&self, local: &str) -> Option<&str> {
        self.attr(local).or_else(|| {
            self.attributes
                .iter()
                .find(|a| a.prefix.as_deref() != Some("xmlns") && a.name.eq_ignore_ascii_case(local))
                .map(|a| a.value.as_str())
        })
    }

    /// Attribute value by prefix and local name (`xml:base`, `xml:lang`).
    pub fn attr_qualified(&self, prefix: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.prefix.as_deref() == Some(prefix) && a.name == local)
            .map(|a| a.value.as_str())
    }

    /// Namespace declarations on this element as `(prefix, uri)` pairs.
    /// The default namespace has an empty prefix.
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().filter_map(|a| match a.prefix.as_deref() {
            Some("xmlns") => Some((a.name.as_str(), a.value.as_str())),
            None if a.name == "xmlns" => Some(("", a.value.as_str())),
            _ => None,
        })
    }

    /// First child with the given local name (ASCII case-insensitive).
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.is(local))
    }

    /// All children with the given local name (ASCII case-insensitive).
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.is(local))
    }

    /// Trimmed direct text, `None` when empty.
    pub fn trimmed_text(&self) -> Option<String> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Trimmed text of the first child with the given local name.
    pub fn child_text(&self, local: &str) -> Option<String> {
        self.child(local).and_then(XmlElement::trimmed_text)
    }

    /// Direct text as written, `None` when empty or whitespace only.
    pub fn raw_text(&self) -> Option<String> {
        (!self.text.trim().is_empty()).then(|| self.text.clone())
    }

    /// Verbatim text of the first child with the given local name.
    pub fn child_raw_text(&self, local: &str) -> Option<String> {
        self.child(local).and_then(XmlElement::raw_text)
    }

    /// Depth-first search for a descendant by local name.
    pub fn descendant(&self, local: &str) -> Option<&XmlElement> {
        for child in &self.children {
            if child.is(local) {
                return Some(child);
            }
            if let Some(found) = child.descendant(local) {
                return Some(found);
            }
        }
        None
    }

    fn from_start(
        start: &BytesStart<'_>,
        position: u64,
        ancestors: &[XmlElement],
    ) -> Result<Self, XmlError> {
        let (prefix, name) = split_name(start.name().as_ref());
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError {
                position,
                message: format!("invalid attribute on <{}>: {}", name, e),
            })?;
            let (attr_prefix, attr_name) = split_name(attr.key.as_ref());
            attributes.push(XmlAttribute {
                prefix: attr_prefix,
                name: attr_name,
                value: unescape_xml(&String::from_utf8_lossy(&attr.value)),
            });
        }
        let mut element = Self {
            prefix,
            name,
            namespace: None,
            attributes,
            children: Vec::new(),
            text: String::new(),
        };
        element.namespace = element.resolve_namespace(ancestors);
        Ok(element)
    }

    fn resolve_namespace(&self, ancestors: &[XmlElement]) -> Option<String> {
        let wanted = self.prefix.as_deref().unwrap_or("");
        std::iter::once(self)
            .chain(ancestors.iter().rev())
            .find_map(|el| {
                el.namespace_declarations()
                    .find(|(prefix, _)| *prefix == wanted)
                    .map(|(_, uri)| uri)
            })
            .filter(|uri| !uri.is_empty())
            .map(str::to_string)
    }
}

/// Parse a whole document into its root element.
///
/// DOCTYPE declarations are skipped and never interpreted, so neither
/// internal nor external entities are expanded.
pub fn parse_document(text: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let element = XmlElement::from_start(e, position, &stack)?;
                stack.push(element);
            },
            Ok(Event::Empty(ref e)) => {
                let element = XmlElement::from_start(e, position, &stack)?;
                attach(&mut stack, &mut root, element, position)?;
            },
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| XmlError {
                    position,
                    message: "closing tag without matching opening tag".to_string(),
                })?;
                attach(&mut stack, &mut root, element, position)?;
            },
            Ok(Event::Text(ref t)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&unescape_xml(&String::from_utf8_lossy(t)));
                }
            },
            Ok(Event::CData(ref c)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(c));
                }
            },
            Ok(Event::GeneralRef(ref r)) => {
                if let Some(current) = stack.last_mut() {
                    let name = String::from_utf8_lossy(r);
                    match resolve_entity(&name) {
                        Some(ch) => current.text.push(ch),
                        None => {
                            current.text.push('&');
                            current.text.push_str(&name);
                            current.text.push(';');
                        },
                    }
                }
            },
            Ok(Event::DocType(_)) => {
                tracing::debug!("skipping DOCTYPE declaration; entities are not expanded");
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XmlError {
                    position: reader.error_position() as u64,
                    message: e.to_string(),
                });
            },
            Ok(_) => {},
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError {
            position: reader.buffer_position() as u64,
            message: format!("unexpected end of document inside <{}>", open.qualified_name()),
        });
    }
    root.ok_or_else(|| XmlError {
        position: 0,
        message: "document has no root element".to_string(),
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    position: u64,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        },
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        },
        None => Err(XmlError {
            position,
            message: "multiple root elements".to_string(),
        }),
    }
}

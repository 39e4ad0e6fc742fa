//! Event-driven conversion of XML text into `XmlObject` trees
//!
//! The mapper walks the quick-xml event stream and builds one node per
//! element. Attributes become a name/value map, child elements become fields
//! keyed by tag name (a repeated tag promotes the field to an ordered
//! sequence), and non-whitespace text becomes the node's `text` value.
//! Contiguous character data (text, CDATA, and resolved entity references)
//! forms one text segment; segments are delimited by child elements.
//! The returned tree wraps the document itself, so the root element shows
//! up as a child field of the result.

use std::collections::BTreeMap;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

/// A child field of an [`XmlObject`]: a single node, or an ordered sequence
/// when the same tag name occurs more than once under one parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum XmlMember {
    /// The tag appeared exactly once.
    One(XmlObject),
    /// The tag appeared two or more times, in document order.
    Many(Vec<XmlObject>),
}

/// A generic parsed XML element.
///
/// Serializes with child tags flattened to top-level fields, so a document
/// `<feed><updated>t</updated></feed>` renders as
/// `{"feed":{"updated":{"text":"t"}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XmlObject {
    /// Attribute name to value, present only when the element has attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Direct non-whitespace text content. When an element mixes text and
    /// child elements, the last non-whitespace segment wins; this matches
    /// the upstream payload consumers and is pinned by tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Child elements keyed by tag name.
    #[serde(flatten)]
    pub children: BTreeMap<String, XmlMember>,
}

/// A non-fatal problem encountered while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDiagnostic {
    /// Human-readable description of the problem.
    pub message: String,
    /// Byte offset into the input where the problem was detected.
    pub position: u64,
}

/// The outcome of a parse: a best-effort tree plus collected diagnostics.
///
/// Diagnostics never abort a request; callers log them and keep whatever
/// the parser could recover.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// The document node; the root element is a child field of this node.
    pub root: XmlObject,
    /// Problems encountered while parsing, empty for well-formed input.
    pub diagnostics: Vec<XmlDiagnostic>,
}

impl XmlObject {
    /// Returns the child for `name`. For a repeated tag this is the first
    /// node in document order.
    pub fn get(&self, name: &str) -> Option<&XmlObject> {
        match self.children.get(name)? {
            XmlMember::One(node) => Some(node),
            XmlMember::Many(nodes) => nodes.first(),
        }
    }

    /// Walks a chain of child tag names.
    pub fn at(&self, path: &[&str]) -> Option<&XmlObject> {
        path.iter().try_fold(self, |node, segment| node.get(segment))
    }

    /// The text content at the end of a chain of child tag names.
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.at(path)?.text.as_deref()
    }

    /// Depth-first search for the first text value anywhere in the tree.
    ///
    /// Used to unwrap single-payload containers such as SOAP response
    /// envelopes, where exactly one leaf carries the result string.
    pub fn descendant_text(&self) -> Option<&str> {
        if let Some(text) = self.text.as_deref() {
            return Some(text);
        }
        for member in self.children.values() {
            match member {
                XmlMember::One(node) => {
                    if let Some(text) = node.descendant_text() {
                        return Some(text);
                    }
                }
                XmlMember::Many(nodes) => {
                    for node in nodes {
                        if let Some(text) = node.descendant_text() {
                            return Some(text);
                        }
                    }
                }
            }
        }
        None
    }

    /// Attaches a completed child node under `name`, promoting the field to
    /// a sequence on the second occurrence of the same tag.
    fn attach(&mut self, name: String, node: XmlObject) {
        match self.children.remove(&name) {
            None => {
                self.children.insert(name, XmlMember::One(node));
            }
            Some(XmlMember::One(first)) => {
                self.children.insert(name, XmlMember::Many(vec![first, node]));
            }
            Some(XmlMember::Many(mut nodes)) => {
                nodes.push(node);
                self.children.insert(name, XmlMember::Many(nodes));
            }
        }
    }
}

/// Parses XML text into a generic object tree.
///
/// Never fails outright: reader errors are recorded as diagnostics and the
/// tree built so far is returned. An empty document yields an empty root.
pub fn parse(xml_text: &str) -> ParsedDocument {
    let mut reader = Reader::from_str(xml_text);
    let mut diagnostics = Vec::new();

    // Stack of (tag name, node under construction, text run in progress);
    // index 0 is the document. A run is the contiguous character data since
    // the last child element; it is committed whenever a child boundary is
    // reached, so the last non-whitespace run wins.
    let mut stack: Vec<(String, XmlObject, String)> =
        vec![(String::new(), XmlObject::default(), String::new())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let mut node = XmlObject::default();
                collect_attributes(&start, &mut node, &mut diagnostics, reader.buffer_position());
                if let Some((_, parent, run)) = stack.last_mut() {
                    commit_text(parent, run);
                }
                stack.push((name, node, String::new()));
            }
            Ok(Event::Empty(start)) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                let mut node = XmlObject::default();
                collect_attributes(&start, &mut node, &mut diagnostics, reader.buffer_position());
                if let Some((_, parent, run)) = stack.last_mut() {
                    commit_text(parent, run);
                    parent.attach(name, node);
                }
            }
            Ok(Event::End(_)) => {
                // The reader rejects mismatched end tags, so a pop here
                // always pairs with the Start that pushed it.
                if stack.len() > 1 {
                    if let Some((name, mut node, mut run)) = stack.pop() {
                        commit_text(&mut node, &mut run);
                        if let Some((_, parent, _)) = stack.last_mut() {
                            parent.attach(name, node);
                        }
                    }
                }
            }
            Ok(Event::Text(text)) => {
                let value = match text.unescape() {
                    Ok(value) => value.into_owned(),
                    Err(error) => {
                        diagnostics.push(XmlDiagnostic {
                            message: format!("bad text content: {}", error),
                            position: reader.buffer_position(),
                        });
                        String::from_utf8_lossy(text.as_ref()).into_owned()
                    }
                };
                if let Some((_, _, run)) = stack.last_mut() {
                    run.push_str(&value);
                }
            }
            Ok(Event::CData(cdata)) => {
                let value = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                if let Some((_, _, run)) = stack.last_mut() {
                    run.push_str(&value);
                }
            }
            Ok(Event::GeneralRef(reference)) => {
                let name = String::from_utf8_lossy(&reference).into_owned();
                if let Some((_, _, run)) = stack.last_mut() {
                    match resolve_reference(&name) {
                        Some(resolved) => run.push_str(&resolved),
                        None => {
                            diagnostics.push(XmlDiagnostic {
                                message: format!("unresolvable entity reference: &{};", name),
                                position: reader.buffer_position(),
                            });
                            run.push('&');
                            run.push_str(&name);
                            run.push(';');
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declarations, comments, processing instructions
            Err(error) => {
                diagnostics.push(XmlDiagnostic {
                    message: error.to_string(),
                    position: reader.error_position(),
                });
                break;
            }
        }
    }

    // On malformed input, unclosed elements may remain; fold them into
    // their parents so the caller still sees what was recovered.
    while stack.len() > 1 {
        if let Some((name, mut node, mut run)) = stack.pop() {
            commit_text(&mut node, &mut run);
            if let Some((_, parent, _)) = stack.last_mut() {
                parent.attach(name, node);
            }
        }
    }

    let root = stack.pop().map(|(_, node, _)| node).unwrap_or_default();
    ParsedDocument { root, diagnostics }
}

/// Ends the current text run: a non-whitespace run replaces the node's
/// `text`, a whitespace-only run is dropped.
fn commit_text(node: &mut XmlObject, run: &mut String) {
    if !run.trim().is_empty() {
        node.text = Some(std::mem::take(run));
    } else {
        run.clear();
    }
}

/// Resolves the content of a `&...;` reference: predefined entities and
/// decimal or hexadecimal character references. Anything else is unknown.
fn resolve_reference(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    resolve_predefined_entity(name).map(str::to_owned)
}

fn collect_attributes(
    start: &quick_xml::events::BytesStart<'_>,
    node: &mut XmlObject,
    diagnostics: &mut Vec<XmlDiagnostic>,
    position: u64,
) {
    for attribute in start.attributes() {
        match attribute {
            Ok(attribute) => {
                let name = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
                let value = match attribute.unescape_value() {
                    Ok(value) => value.into_owned(),
                    Err(error) => {
                        diagnostics.push(XmlDiagnostic {
                            message: format!("bad attribute value: {}", error),
                            position,
                        });
                        String::from_utf8_lossy(&attribute.value).into_owned()
                    }
                };
                node.attributes.insert(name, value);
            }
            Err(error) => {
                diagnostics.push(XmlDiagnostic {
                    message: format!("bad attribute: {}", error),
                    position,
                });
            }
        }
    }
}

//! Generic XML to object mapping
//!
//! This module converts raw XML documents from the upstream weather services
//! into a generic nested object representation that serializes naturally to
//! JSON. Malformed input degrades to a best-effort tree plus diagnostics
//! rather than a hard failure.

mod object;

pub use object::{parse, ParsedDocument, XmlDiagnostic, XmlMember, XmlObject};

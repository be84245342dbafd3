//! Structured error types for the quire rendering engine.
//!
//! Four variants cover the real error sources: malformed or structurally
//! invalid XML input, image/QR data that cannot be decoded, shape violations
//! detected during layout, and renderer contract failures.
//!
//! Errors are surfaced, never recovered: the first failure aborts the stage
//! that produced it and there are no partial outputs.

use std::fmt;

/// The unified error type returned by all public quire API functions.
#[derive(Debug)]
pub enum QuireError {
    /// The XML input is malformed or violates the document schema
    /// (unknown widget tag, table with `padding`, misplaced header/footer).
    Parse(String),
    /// Image or QR data could not be decoded or generated.
    Image(String),
    /// The widget tree violates a layout invariant, e.g. a table row with
    /// fewer cells than the table's column count.
    Layout(String),
    /// A renderer contract was violated while writing the PDF.
    Render(String),
}

impl fmt::Display for QuireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuireError::Parse(msg) => write!(f, "parse error: {}", msg),
            QuireError::Image(msg) => write!(f, "image error: {}", msg),
            QuireError::Layout(msg) => write!(f, "layout error: {}", msg),
            QuireError::Render(msg) => write!(f, "render error: {}", msg),
        }
    }
}

impl std::error::Error for QuireError {}

impl From<quick_xml::Error> for QuireError {
    fn from(e: quick_xml::Error) -> Self {
        QuireError::Parse(format!("malformed XML: {}", e))
    }
}

impl From<quick_xml::events::attributes::AttrError> for QuireError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        QuireError::Parse(format!("malformed XML attribute: {}", e))
    }
}

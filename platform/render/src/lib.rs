//! Document rendering primitive.
//!
//! Templates draw onto a [`Canvas`], a cursor-based page surface measured in
//! millimetres from the top-left corner, in the style of classic cell-based
//! PDF writers. The canvas produces an inspectable [`Document`] which
//! [`Document::to_pdf`] encodes into a PDF byte stream.

mod chrome;
mod layout;
mod metrics;
mod pdf;

pub use chrome::{Issuer, StandardChrome};
pub use layout::{
    A4_HEIGHT_MM, A4_WIDTH_MM, Align, Canvas, Cell, Document, Element, FontStyle, Page,
    NoChrome, PageChrome, Rgb,
};

/// Content type of every rendered document.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

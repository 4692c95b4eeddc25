//! Markup tree, serialization and whitespace handling

pub mod dom;
pub mod whitespace;

pub use dom::{
    html_to_text, is_document, parse, parse_document, parse_in, serialize, Document, Element,
    Unit, FRAGMENT_CONTEXT,
};
pub use whitespace::normalize;

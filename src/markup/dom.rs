//! Owned markup tree used by the translation engine
//!
//! Fragments are parsed by html5ever in an element context and converted into
//! [`Unit`] values, which serialize deterministically so the serialized text can
//! be used as a cache key. Whole pages go through [`parse_document`] instead.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document as parse_html_document, parse_fragment};
use html5ever::{LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

/// Context for fragments of unknown origin: `<template>` accepts any start
/// tag, including table parts such as `<tr>` or `<td>`
pub const FRAGMENT_CONTEXT: &str = "template";

/// Elements whose text children are written without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// A node of a parsed fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Element(Element),
    Text(String),
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Unit>,
}

impl Element {
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Remove and return all attributes
    pub fn take_attrs(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.attrs)
    }

    /// Opening tag with attributes, e.g. `<a href="/x">`
    pub fn start_tag(&self) -> String {
        let mut out = String::new();
        self.write_open(&mut out);
        out.push('>');
        out
    }

    fn write_open(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
    }

    fn write_html(&self, out: &mut String) {
        self.write_open(out);
        if self.is_void() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');

        let raw = RAW_TEXT_ELEMENTS.contains(&self.name.as_str());
        for child in &self.children {
            match child {
                Unit::Text(text) if raw => out.push_str(text),
                _ => child.write_html(out),
            }
        }

        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl Unit {
    /// Serialize this unit
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Unit::Element(element) => element.write_html(out),
            Unit::Text(text) => out.push_str(&escape_text(text)),
        }
    }

    /// Length of the serialization in chars
    pub fn char_len(&self) -> usize {
        self.to_html().chars().count()
    }

    /// Concatenated text of this unit and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Unit::Text(text) => out.push_str(text),
            Unit::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Parse an HTML fragment that may start with any element
pub fn parse(html: &str) -> Vec<Unit> {
    parse_in(html, FRAGMENT_CONTEXT)
}

/// Parse an HTML fragment as the content of a `context` element
pub fn parse_in(html: &str, context: &str) -> Vec<Unit> {
    let context = QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(context));
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new()).one(html);

    // The fragment parser nests everything under a synthetic <html> root.
    let document = dom.document.children.borrow();
    match document.first() {
        Some(root) => convert_children(root),
        None => Vec::new(),
    }
}

/// A whole HTML page: optional doctype plus the `<html>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub doctype: Option<String>,
    pub root: Element,
}

impl Document {
    pub fn to_html(&self) -> String {
        let mut out = self.doctype.clone().unwrap_or_default();
        self.root.write_html(&mut out);
        out
    }

    /// Direct child of `<html>` named `name`, i.e. `head` or `body`
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.root.children.iter_mut().find_map(|unit| match unit {
            Unit::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }
}

/// Whether `html` is a full page rather than a fragment
pub fn is_document(html: &str) -> bool {
    let head = html.trim_start();
    let head = head.get(..head.len().min(16)).unwrap_or(head).to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

/// Parse a full HTML page; the parser supplies missing `<head>`/`<body>`
pub fn parse_document(html: &str) -> Document {
    let dom = parse_html_document(RcDom::default(), ParseOpts::default()).one(html);

    let mut doctype = None;
    let mut root = None;
    for child in dom.document.children.borrow().iter() {
        match &child.data {
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => doctype = Some(doctype_html(name, public_id, system_id)),
            NodeData::Element { .. } => {
                if let Some(Unit::Element(element)) = convert(child) {
                    root = Some(element);
                }
            }
            _ => {}
        }
    }

    Document {
        doctype,
        root: root.unwrap_or_else(|| Element {
            name: "html".to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }),
    }
}

fn doctype_html(name: &str, public_id: &str, system_id: &str) -> String {
    let mut out = format!("<!DOCTYPE {}", name);
    if !public_id.is_empty() {
        out.push_str(&format!(" PUBLIC \"{}\"", public_id));
        if !system_id.is_empty() {
            out.push_str(&format!(" \"{}\"", system_id));
        }
    } else if !system_id.is_empty() {
        out.push_str(&format!(" SYSTEM \"{}\"", system_id));
    }
    out.push('>');
    out
}

fn convert_children(handle: &Handle) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();
    for child in handle.children.borrow().iter() {
        match convert(child) {
            // Dropped comments can leave two text nodes side by side
            Some(Unit::Text(text)) => match units.last_mut() {
                Some(Unit::Text(prev)) => prev.push_str(&text),
                _ => units.push(Unit::Text(text)),
            },
            Some(unit) => units.push(unit),
            None => {}
        }
    }
    units
}

fn convert(handle: &Handle) -> Option<Unit> {
    match &handle.data {
        NodeData::Text { contents } => Some(Unit::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| {
                    let name = match &attr.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    };
                    (name, attr.value.to_string())
                })
                .collect();
            Some(Unit::Element(Element {
                name: name.local.to_string(),
                attrs,
                children: convert_children(handle),
            }))
        }
        _ => None,
    }
}

/// Serialize a sequence of sibling units
pub fn serialize(units: &[Unit]) -> String {
    let mut out = String::new();
    for unit in units {
        unit.write_html(&mut out);
    }
    out
}

/// Plain text of an HTML fragment with whitespace runs collapsed
pub fn html_to_text(html: &str) -> String {
    let text: String = parse(html).iter().map(Unit::text_content).collect();
    collapse_whitespace(&text)
}

/// Trim and collapse every whitespace run into one space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let html = r#"<p class="intro">Hello <b>world</b></p>"#;
        let units = parse(html);
        assert_eq!(units.len(), 1);
        assert_eq!(serialize(&units), html);
    }

    #[test]
    fn test_parse_mixed_siblings() {
        let units = parse("Hi <i>there</i> friend");
        assert_eq!(units.len(), 3);
        assert_eq!(units[0], Unit::Text("Hi ".to_string()));
        assert!(matches!(&units[1], Unit::Element(e) if e.name == "i"));
        assert_eq!(units[2], Unit::Text(" friend".to_string()));
    }

    #[test]
    fn test_parse_in_table_context() {
        let row = "<tr><td>a</td><td>b</td></tr>";
        assert_eq!(serialize(&parse_in(row, "tbody")), row);
        assert_eq!(serialize(&parse_in(row, "body")), "ab");
    }

    #[test]
    fn test_parse_keeps_table_parts() {
        let row = "<tr><td>a</td><td>b</td></tr>";
        assert_eq!(serialize(&parse(row)), row);

        let cell = r#"<td class="c">x</td>"#;
        assert_eq!(serialize(&parse(cell)), cell);

        let item = "<li>one</li><li>two</li>";
        assert_eq!(serialize(&parse(item)), item);
    }

    #[test]
    fn test_is_document() {
        assert!(is_document("  <!DOCTYPE html><html></html>"));
        assert!(is_document("<HTML lang=\"en\"><body></body></HTML>"));
        assert!(!is_document("<p>Hello</p>"));
        assert!(!is_document("plain text"));
    }

    #[test]
    fn test_parse_document_keeps_skeleton() {
        let html = concat!(
            r#"<!DOCTYPE html><html lang="en"><head><title>Hi</title></head>"#,
            r#"<body class="x"><p>Hello</p></body></html>"#
        );
        let mut document = parse_document(html);

        assert_eq!(document.doctype.as_deref(), Some("<!DOCTYPE html>"));
        assert_eq!(document.root.attrs, vec![("lang".to_string(), "en".to_string())]);
        assert!(document.section_mut("head").is_some());
        assert_eq!(document.to_html(), html);
    }

    #[test]
    fn test_parse_document_adds_missing_sections() {
        let document = parse_document("<!doctype html><p>Hi</p>");
        assert_eq!(
            document.to_html(),
            "<!DOCTYPE html><html><head></head><body><p>Hi</p></body></html>"
        );
    }

    #[test]
    fn test_void_elements() {
        let units = parse("a<br>b<img src=\"x.png\">");
        assert_eq!(serialize(&units), "a<br/>b<img src=\"x.png\"/>");
        assert!(matches!(&units[1], Unit::Element(e) if e.children.is_empty()));
    }

    #[test]
    fn test_comments_are_dropped_and_text_merged() {
        let units = parse("one <!-- note --> two");
        assert_eq!(units, vec![Unit::Text("one  two".to_string())]);
    }

    #[test]
    fn test_escaping() {
        let units = parse(r#"<a title="x &quot;y&quot;">1 &lt; 2 &amp; 3</a>"#);
        assert_eq!(
            serialize(&units),
            r#"<a title="x &quot;y&quot;">1 &lt; 2 &amp; 3</a>"#
        );
        assert_eq!(units[0].text_content(), "1 < 2 & 3");
    }

    #[test]
    fn test_script_is_raw() {
        let html = "<script>if (a < b) {}</script>";
        assert_eq!(serialize(&parse(html)), html);
    }

    #[test]
    fn test_char_len_counts_chars() {
        let unit = Unit::Text("日本語".to_string());
        assert_eq!(unit.char_len(), 3);
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(
            html_to_text("<div>  Hello\n <b>big</b>   world </div>"),
            "Hello big world"
        );
        assert_eq!(html_to_text("<br/>"), "");
    }

    #[test]
    fn test_take_attrs() {
        let mut units = parse(r#"<span id="a" lang="en">x</span>"#);
        let Unit::Element(element) = &mut units[0] else {
            panic!("expected element");
        };
        let attrs = element.take_attrs();
        assert_eq!(
            attrs,
            vec![
                ("id".to_string(), "a".to_string()),
                ("lang".to_string(), "en".to_string())
            ]
        );
        assert_eq!(units[0].to_html(), "<span>x</span>");
    }
}

//! Whitespace normalization of translated fragments
//!
//! Text nodes are collapsed, and a single leading or trailing space is kept
//! only where it renders, i.e. next to an inline sibling.
//!
//! Ref: https://medium.com/@patrickbrosset/when-does-white-space-matter-in-html-b90e8a7cdd33

use crate::markup::dom::{collapse_whitespace, Unit};

const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "b", "bdo", "big", "br", "button", "cite", "code", "dfn", "em",
    "i", "img", "input", "kbd", "label", "map", "object", "q", "samp", "script", "select",
    "small", "span", "strong", "sub", "sup", "textarea", "tt", "var",
];

/// Elements whose whitespace is significant and left alone
const PRESERVE_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style"];

fn is_inline(unit: Option<&Unit>) -> bool {
    matches!(unit, Some(Unit::Element(e)) if INLINE_ELEMENTS.contains(&e.name.as_str()))
}

/// Normalize every text node below `units`, dropping the ones left empty
pub fn normalize(units: &mut Vec<Unit>) {
    let replacements: Vec<Option<String>> = units
        .iter()
        .enumerate()
        .map(|(i, unit)| match unit {
            Unit::Text(text) => {
                let prev = i.checked_sub(1).and_then(|j| units.get(j));
                Some(normalize_text(
                    text,
                    is_inline(prev),
                    is_inline(units.get(i + 1)),
                ))
            }
            Unit::Element(_) => None,
        })
        .collect();

    let old = std::mem::take(units);
    for (unit, replacement) in old.into_iter().zip(replacements) {
        match unit {
            Unit::Text(_) => {
                if let Some(text) = replacement.filter(|t| !t.is_empty()) {
                    units.push(Unit::Text(text));
                }
            }
            Unit::Element(mut element) => {
                if !PRESERVE_ELEMENTS.contains(&element.name.as_str()) {
                    normalize(&mut element.children);
                }
                units.push(Unit::Element(element));
            }
        }
    }
}

/// Give `translated` the outer whitespace of `source`, as a single space per side
pub fn pad_like(source: &str, translated: String) -> String {
    let lead = source.starts_with(char::is_whitespace);
    let trail = source.ends_with(char::is_whitespace);
    if !lead && !trail {
        return translated;
    }
    format!(
        "{}{}{}",
        if lead { " " } else { "" },
        translated,
        if trail { " " } else { "" }
    )
}

fn normalize_text(text: &str, prev_inline: bool, next_inline: bool) -> String {
    let collapsed = collapse_whitespace(text);
    let mut lo = "";
    let mut hi = "";
    let mut edge = false;

    if !text.is_empty() {
        edge = !(prev_inline && next_inline);
        if text.starts_with(char::is_whitespace) && prev_inline {
            lo = " ";
        }
        if text.ends_with(char::is_whitespace)
            && (!collapsed.is_empty() || lo.is_empty())
            && next_inline
        {
            hi = " ";
        }
    }
    if edge && collapsed.is_empty() {
        lo = "";
        hi = "";
    }

    format!("{}{}{}", lo, collapsed, hi)
}

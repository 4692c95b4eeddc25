use tracing::debug;

use crate::core::errors::Result;
use crate::engine::ChunkTranslator;
use crate::markup::whitespace::pad_like;
use crate::markup::{normalize, parse_in, serialize, Element, Unit};

impl ChunkTranslator<'_> {
    /// Translate one unit, splitting it along its children when it is too large.
    ///
    /// `context` names the parent element; translated markup is re-parsed as
    /// content of that element so table rows, list items etc. survive.
    pub(crate) fn translate_unit(&self, unit: &Unit, context: &str) -> Result<String> {
        let serialized = unit.to_html();
        let key = serialized.trim();
        if key.is_empty() {
            return Ok(String::new());
        }

        let translated = match self.cache.lookup(self.pair, key)? {
            Some(hit) => hit,
            None => {
                let translated = match unit {
                    Unit::Element(element) if element.children.is_empty() => key.to_string(),
                    Unit::Element(_) if key.chars().count() <= self.block_size() => {
                        let raw = self.backend.translate_markup(key, self.pair)?;
                        normalized(&raw, context)
                    }
                    Unit::Element(element) => self.translate_children(element)?,
                    Unit::Text(_) => self.backend.translate_markup(key, self.pair)?,
                };
                self.cache.store(self.pair, key, &translated)?;
                translated
            }
        };

        Ok(match unit {
            Unit::Text(_) => pad_like(&serialized, translated),
            Unit::Element(_) => translated,
        })
    }

    fn translate_children(&self, element: &Element) -> Result<String> {
        debug!(
            "<{}> exceeds {} chars, translating {} children separately",
            element.name,
            self.block_size(),
            element.children.len()
        );

        let mut children = Vec::with_capacity(element.children.len());
        for child in &element.children {
            match child {
                // spacing between siblings; the normalizer decides if it renders
                Unit::Text(text) if text.trim().is_empty() => {
                    children.push(Unit::Text(" ".to_string()))
                }
                _ => {
                    let translated = self.translate_unit(child, &element.name)?;
                    children.extend(parse_in(&translated, &element.name));
                }
            }
        }
        normalize(&mut children);

        let merged = Unit::Element(Element {
            name: element.name.clone(),
            attrs: element.attrs.clone(),
            children,
        });
        Ok(merged.to_html())
    }
}

fn normalized(html: &str, context: &str) -> String {
    let mut units = parse_in(html, context);
    normalize(&mut units);
    serialize(&units)
}

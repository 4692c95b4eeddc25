//! Size-bounded, cache-first dispatch of text and markup to a backend
//!
//! [`ChunkTranslator`] never hands the backend a payload longer than
//! [`TranslationBackend::max_block_size`]: plain text is packed line by line
//! into batches, markup is split along the tree until every piece fits.

mod adapter;
mod walker;

use crate::cache::CacheStore;
use crate::core::client::TranslationBackend;
use crate::core::models::LangPair;
use crate::markup::{Unit, FRAGMENT_CONTEXT};

/// Translates one text for one language pair through a backend
pub struct ChunkTranslator<'a> {
    backend: &'a dyn TranslationBackend,
    cache: &'a CacheStore,
    pair: &'a LangPair,
    context: &'a str,
}

impl<'a> ChunkTranslator<'a> {
    pub fn new(backend: &'a dyn TranslationBackend, cache: &'a CacheStore, pair: &'a LangPair) -> Self {
        Self {
            backend,
            cache,
            pair,
            context: FRAGMENT_CONTEXT,
        }
    }

    /// Treat markup as the content of a `context` element
    pub fn in_context(mut self, context: &'a str) -> Self {
        self.context = context;
        self
    }

    fn block_size(&self) -> usize {
        self.backend.max_block_size()
    }
}

/// A markup unit fits when it can be sent whole or split into pieces that fit
pub fn fits(unit: &Unit, block_size: usize) -> bool {
    match unit {
        Unit::Element(element) if element.children.is_empty() => true,
        Unit::Element(element) => {
            unit.char_len() <= block_size
                || element.children.iter().all(|child| fits(child, block_size))
        }
        Unit::Text(_) => unit.char_len() <= block_size,
    }
}

/// Plain text fits when every line leaves room for the separator
pub fn fits_plain(text: &str, block_size: usize) -> bool {
    text.split('\n').all(|line| line.chars().count() + 2 <= block_size)
}

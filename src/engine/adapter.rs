use tracing::debug;

use crate::core::errors::{Result, TranslationError};
use crate::engine::{fits, fits_plain, ChunkTranslator};
use crate::markup::{parse_in, Unit};

impl ChunkTranslator<'_> {
    /// Translate `text`, either as plain text or as an HTML fragment
    pub fn translate(&self, text: &str, is_plain: bool) -> Result<String> {
        if self.backend.is_disabled() {
            return Err(TranslationError::Disabled);
        }

        if is_plain {
            self.translate_plain(text)
        } else {
            self.translate_markup(text)
        }
    }

    fn translate_plain(&self, text: &str) -> Result<String> {
        let block_size = self.block_size();
        if !fits_plain(text, block_size) {
            return Err(TranslationError::SizeExceeded {
                limit: block_size,
                text: text.to_string(),
            });
        }

        let mut translated = Vec::new();
        let mut pieces: Vec<&str> = Vec::new();
        let mut count = 0;
        for piece in text.split('\n') {
            // in case of "\r\n"
            let piece = piece.trim();
            let extra = piece.chars().count() + 1;
            if count + extra > block_size {
                translated.push(self.translate_batch(&pieces.join("\n"))?);
                pieces.clear();
                count = 0;
            }
            count += extra;
            pieces.push(piece);
        }
        translated.push(self.translate_batch(&pieces.join("\n"))?);

        Ok(translated.join("\n"))
    }

    fn translate_batch(&self, batch: &str) -> Result<String> {
        let batch = batch.trim();
        if batch.is_empty() {
            return Ok(String::new());
        }
        if let Some(hit) = self.cache.lookup(self.pair, batch)? {
            return Ok(hit);
        }
        debug!(
            "{}: translating {} chars of plain text",
            self.backend.name(),
            batch.chars().count()
        );
        self.backend.translate_plain(batch, self.pair)
    }

    fn translate_markup(&self, text: &str) -> Result<String> {
        let units = parse_in(text, self.context);
        if let Some(unit) = units.iter().find(|unit| !fits(unit, self.block_size())) {
            return Err(TranslationError::SizeExceeded {
                limit: self.block_size(),
                text: unit.to_html(),
            });
        }

        units
            .iter()
            .map(|unit| match unit {
                Unit::Text(text) if text.trim().is_empty() => Ok(" ".to_string()),
                _ => self.translate_unit(unit, self.context),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::CacheStore;
    use crate::core::errors::TranslationError;
    use crate::core::models::LangPair;
    use crate::engine::ChunkTranslator;
    use crate::testing::{Mode, MockBackend};

    fn pair() -> LangPair {
        LangPair::new("en", "fr").unwrap()
    }

    #[test]
    fn test_disabled_backend_fails_fast() {
        let backend = MockBackend::disabled();
        let cache = CacheStore::in_memory();
        let pair = pair();
        let engine = ChunkTranslator::new(&backend, &cache, &pair);

        assert!(matches!(
            engine.translate("hello", true),
            Err(TranslationError::Disabled)
        ));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_plain_lines_are_batched() {
        let backend = MockBackend::new(12);
        let cache = CacheStore::in_memory();
        let pair = pair();
        let engine = ChunkTranslator::new(&backend, &cache, &pair);

        let result = engine.translate("aaaa\nbbbb\ncccc\r\ndd", true).unwrap();

        assert_eq!(result, "AAAA\nBBBB\nCCCC\nDD");
        assert_eq!(
            backend.calls(),
            vec![
                (Mode::Plain, "aaaa\nbbbb".to_string()),
                (Mode::Plain, "cccc\ndd".to_string()),
            ]
        );
        assert!(backend.payloads().iter().all(|p| p.chars().count() <= 12));
    }

    #[test]
    fn test_plain_line_too_long() {
        let backend = MockBackend::new(10);
        let cache = CacheStore::in_memory();
        let pair = pair();
        let engine = ChunkTranslator::new(&backend, &cache, &pair);

        assert!(matches!(
            engine.translate("short\nthis line is too long", true),
            Err(TranslationError::SizeExceeded { limit: 10, .. })
        ));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_plain_batch_uses_cache() {
        let backend = MockBackend::new(100);
        let cache = CacheStore::in_memory();
        let pair = pair();
        cache.store(&pair, "bonjour", "hello (cached)").unwrap();
        let engine = ChunkTranslator::new(&backend, &cache, &pair);

        assert_eq!(engine.translate("bonjour", true).unwrap(), "hello (cached)");
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_markup_leaf_too_long() {
        let backend = MockBackend::new(20);
        let cache = CacheStore::in_memory();
        let pair = pair();
        let engine = ChunkTranslator::new(&backend, &cache, &pair);

        let html = "<div><p>ok</p><p>this text node is far too long</p></div>";
        assert!(matches!(
            engine.translate(html, false),
            Err(TranslationError::SizeExceeded { limit: 20, .. })
        ));
        assert!(backend.calls().is_empty());
    }
}

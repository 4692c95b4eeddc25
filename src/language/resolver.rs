//! Source-language resolution for a single unit

use tracing::debug;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{is_supported, Resolution};
use crate::language::detector::LanguageDetector;
use crate::language::suggestion::SuggestionTable;
use crate::markup::html_to_text;

/// Default minimum confidence of the top detection candidate
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Resolves the source language through the suggestion table, then detection
pub struct LanguageResolver {
    suggestions: SuggestionTable,
    detector: Box<dyn LanguageDetector>,
    threshold: f64,
}

impl LanguageResolver {
    pub fn new(
        suggestions: SuggestionTable,
        detector: Box<dyn LanguageDetector>,
        threshold: f64,
    ) -> Self {
        Self {
            suggestions,
            detector,
            threshold,
        }
    }

    /// Resolve the language of `text`, which may contain markup
    pub fn resolve(&self, text: &str) -> Result<Resolution> {
        let text = text.trim();

        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return Ok(Resolution::Skip),
            (Some(c), None) if c.is_ascii() => return Ok(Resolution::PassThrough),
            _ => {}
        }

        if let Some(suggestion) = self.suggestions.get(text) {
            debug!("Recognise {:?} as {:?}", text, suggestion);
            return Ok(suggestion.clone().into());
        }

        let plain = html_to_text(text).to_lowercase();
        if plain.is_empty() {
            // markup without any text, e.g. a lone <img/>
            return Ok(Resolution::Skip);
        }

        let candidates = self.detector.detect(&plain);
        match candidates.first() {
            Some(top) if top.reliable && top.confidence > self.threshold => {
                if !is_supported(&top.language) {
                    return Err(TranslationError::UnsupportedLanguage {
                        lang: top.language.clone(),
                        text: text.to_string(),
                    });
                }
                debug!(
                    "Detected {:?} as {} ({:.2})",
                    text, top.language, top.confidence
                );
                Ok(Resolution::Language(top.language.clone()))
            }
            _ => Err(TranslationError::AmbiguousLanguage {
                text: text.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Suggestion;
    use crate::testing::FixedDetector;

    fn resolver(detector: FixedDetector) -> LanguageResolver {
        let suggestions = SuggestionTable::from_entries([
            ("Acme Corp", Suggestion::Language("en".to_string())),
            ("(ad)", Suggestion::Skip),
            ("OK", Suggestion::PassThrough),
        ]);
        LanguageResolver::new(suggestions, Box::new(detector), DEFAULT_THRESHOLD)
    }

    #[test]
    fn test_trivial_text() {
        let r = resolver(FixedDetector::new("de", 0.99));
        assert_eq!(r.resolve("  ").unwrap(), Resolution::Skip);
        assert_eq!(r.resolve("a").unwrap(), Resolution::PassThrough);
    }

    #[test]
    fn test_suggestion_beats_detector() {
        let r = resolver(FixedDetector::new("de", 0.99));
        assert_eq!(
            r.resolve("Acme Corp").unwrap(),
            Resolution::Language("en".to_string())
        );
        assert_eq!(r.resolve("(ad)").unwrap(), Resolution::Skip);
        assert_eq!(r.resolve(" OK ").unwrap(), Resolution::PassThrough);
    }

    #[test]
    fn test_confident_detection() {
        let r = resolver(FixedDetector::new("fr", 0.95));
        assert_eq!(
            r.resolve("<p>Bonjour tout le monde</p>").unwrap(),
            Resolution::Language("fr".to_string())
        );
    }

    #[test]
    fn test_detector_sees_plain_lowercase_text() {
        let detector = FixedDetector::new("en", 0.95);
        let seen = detector.seen();
        let r = resolver(detector);
        r.resolve("<b>Hello</b>   WORLD").unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["hello world".to_string()]);
    }

    #[test]
    fn test_low_confidence_is_ambiguous() {
        let r = resolver(FixedDetector::new("en", 0.8));
        assert!(matches!(
            r.resolve("Hello there"),
            Err(TranslationError::AmbiguousLanguage { .. })
        ));
    }

    #[test]
    fn test_unreliable_is_ambiguous() {
        let r = resolver(FixedDetector::unreliable("en", 0.99));
        assert!(matches!(
            r.resolve("Hello there"),
            Err(TranslationError::AmbiguousLanguage { .. })
        ));
    }

    #[test]
    fn test_unsupported_detection() {
        let r = resolver(FixedDetector::new("ita", 0.99));
        assert!(matches!(
            r.resolve("Buongiorno a tutti"),
            Err(TranslationError::UnsupportedLanguage { .. })
        ));
    }

    #[test]
    fn test_markup_without_text_is_skipped() {
        let r = resolver(FixedDetector::new("en", 0.99));
        assert_eq!(r.resolve("<img src=\"a.png\"/>").unwrap(), Resolution::Skip);
    }
}

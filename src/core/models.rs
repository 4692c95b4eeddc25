//! Core data models for translation

use std::fmt;

use crate::core::errors::{Result, TranslationError};

/// Languages the translator accepts as source or target
pub const LANGUAGES: &[&str] = &[
    "ar", "zh", "en", "ko", "pt", "es", "de", "da", "fr", "fi", "sv", "he", "nl", "ru", "th",
    "ja",
];

/// Source languages whose ASCII-only snippets are left untranslated
pub const CJK_LANGUAGES: &[&str] = &["ja", "zh"];

/// Check whether a language code is in [`LANGUAGES`]
pub fn is_supported(lang: &str) -> bool {
    LANGUAGES.contains(&lang)
}

/// Check whether a language code is one of the CJK source languages
pub fn is_cjk(lang: &str) -> bool {
    CJK_LANGUAGES.contains(&lang)
}

/// True when every non-whitespace char of `text` is ASCII
pub fn is_ascii_only(text: &str) -> bool {
    text.chars().filter(|c| !c.is_whitespace()).all(|c| c.is_ascii())
}

/// Ordered pair of supported languages; names one cache table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LangPair {
    pub from: String,
    pub to: String,
}

impl LangPair {
    /// Build a pair, rejecting languages outside [`LANGUAGES`]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Result<Self> {
        let pair = Self {
            from: from.into(),
            to: to.into(),
        };
        for lang in [&pair.from, &pair.to] {
            if !is_supported(lang) {
                return Err(TranslationError::UnsupportedLanguage {
                    lang: lang.clone(),
                    text: format!("{} -> {}", pair.from, pair.to),
                });
            }
        }
        Ok(pair)
    }

    /// Name of the persistent table holding this pair
    pub fn table_name(&self) -> String {
        format!("{}_{}", self.from, self.to)
    }
}

impl fmt::Display for LangPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.from, self.to)
    }
}

/// Entry of the language suggestion table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Treat the string as written in this language
    Language(String),
    /// Emit nothing for this string
    Skip,
    /// Emit the string unchanged
    PassThrough,
}

impl Suggestion {
    pub const SKIP_TOKEN: &'static str = "X";
    pub const PASS_THROUGH_TOKEN: &'static str = "=";

    /// Parse a suggestion-file token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            Self::SKIP_TOKEN => Some(Suggestion::Skip),
            Self::PASS_THROUGH_TOKEN => Some(Suggestion::PassThrough),
            lang if is_supported(lang) => Some(Suggestion::Language(lang.to_string())),
            _ => None,
        }
    }
}

/// Outcome of source-language resolution for one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Translate from this language
    Language(String),
    /// Produce empty output
    Skip,
    /// Produce the source unchanged
    PassThrough,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Language(lang) => write!(f, "{}", lang),
            Resolution::Skip => write!(f, "{}", Suggestion::SKIP_TOKEN),
            Resolution::PassThrough => write!(f, "{}", Suggestion::PASS_THROUGH_TOKEN),
        }
    }
}

impl From<Suggestion> for Resolution {
    fn from(suggestion: Suggestion) -> Self {
        match suggestion {
            Suggestion::Language(lang) => Resolution::Language(lang),
            Suggestion::Skip => Resolution::Skip,
            Suggestion::PassThrough => Resolution::PassThrough,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_pair_table_name() {
        let pair = LangPair::new("ja", "en").unwrap();
        assert_eq!(pair.table_name(), "ja_en");
        assert_eq!(pair.to_string(), "ja_en");
    }

    #[test]
    fn test_lang_pair_rejects_unknown_language() {
        assert!(LangPair::new("xx", "en").is_err());
        assert!(LangPair::new("en", "klingon").is_err());
    }

    #[test]
    fn test_suggestion_tokens() {
        assert_eq!(Suggestion::from_token("X"), Some(Suggestion::Skip));
        assert_eq!(Suggestion::from_token("="), Some(Suggestion::PassThrough));
        assert_eq!(
            Suggestion::from_token("fr"),
            Some(Suggestion::Language("fr".to_string()))
        );
        assert_eq!(Suggestion::from_token("xx"), None);
    }

    #[test]
    fn test_ascii_only_ignores_whitespace() {
        assert!(is_ascii_only("Hello World\n\t"));
        assert!(is_ascii_only("  "));
        assert!(!is_ascii_only("日本 語"));
    }
}

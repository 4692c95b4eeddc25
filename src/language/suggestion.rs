//! Exact-match language suggestion dictionary
//!
//! Each line of the suggestion file reads `<token> "<source string>"`, where
//! the token is a supported language code, `X` (emit nothing) or `=` (emit the
//! source unchanged).

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::Suggestion;

/// Immutable override table consulted before language detection
#[derive(Debug, Clone, Default)]
pub struct SuggestionTable {
    entries: HashMap<String, Suggestion>,
}

impl SuggestionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the suggestion file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TranslationError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let table = Self::parse(&content)?;
        info!(
            "{} items in the language suggestion dictionary",
            table.len()
        );
        Ok(table)
    }

    /// Parse suggestion-file content
    pub fn parse(content: &str) -> Result<Self> {
        let line_re = Regex::new(r#"^(\S+)\s+"(.*)"$"#).map_err(|e| TranslationError::Config {
            message: e.to_string(),
        })?;

        let mut entries = HashMap::new();
        for (i, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let caps = line_re
                .captures(line)
                .ok_or_else(|| TranslationError::Suggestion {
                    line: i + 1,
                    message: format!("expected <language> \"<text>\": {}", line),
                })?;

            let suggestion =
                Suggestion::from_token(&caps[1]).ok_or_else(|| TranslationError::Suggestion {
                    line: i + 1,
                    message: format!("invalid language: {}", &caps[1]),
                })?;

            entries.insert(caps[2].to_string(), suggestion);
        }

        Ok(Self { entries })
    }

    /// Build a table from in-memory entries
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Suggestion)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Suggestion for exactly this text
    pub fn get(&self, text: &str) -> Option<&Suggestion> {
        self.entries.get(text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

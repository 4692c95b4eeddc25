//! Test doubles for the external collaborators

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::core::client::TranslationBackend;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::LangPair;
use crate::language::detector::{Detection, LanguageDetector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Plain,
    Markup,
}

/// Backend that upper-cases text outside of tags and records every payload
pub struct MockBackend {
    max_block_size: usize,
    disabled: bool,
    fixed: HashMap<String, String>,
    calls: Mutex<Vec<(Mode, String)>>,
}

impl MockBackend {
    pub fn new(max_block_size: usize) -> Self {
        Self {
            max_block_size,
            disabled: false,
            fixed: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::new(5000)
        }
    }

    /// Answer `source` with `target`; an empty target makes the call fail
    pub fn with_translation(mut self, source: &str, target: &str) -> Self {
        self.fixed.insert(source.to_string(), target.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(Mode, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn payloads(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, text)| text).collect()
    }

    fn answer(&self, mode: Mode, text: &str) -> Result<String> {
        self.calls.lock().unwrap().push((mode, text.to_string()));
        let translated = match self.fixed.get(text) {
            Some(target) => target.clone(),
            None => upper_outside_tags(text),
        };
        if translated.trim().is_empty() {
            return Err(TranslationError::EmptyTranslation {
                text: text.to_string(),
            });
        }
        Ok(translated)
    }
}

pub fn upper_outside_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(c);
            }
            '>' => {
                in_tag = false;
                out.push(c);
            }
            _ if in_tag => out.push(c),
            _ => out.extend(c.to_uppercase()),
        }
    }
    out
}

impl TranslationBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    fn translate_plain(&self, text: &str, _pair: &LangPair) -> Result<String> {
        self.answer(Mode::Plain, text)
    }

    fn translate_markup(&self, text: &str, _pair: &LangPair) -> Result<String> {
        self.answer(Mode::Markup, text)
    }
}

/// Detector that always reports the same candidate
pub struct FixedDetector {
    candidate: Detection,
    seen: Arc<Mutex<Vec<String>>>,
}

impl FixedDetector {
    pub fn new(language: &str, confidence: f64) -> Self {
        Self {
            candidate: Detection {
                language: language.to_string(),
                confidence,
                reliable: true,
            },
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unreliable(language: &str, confidence: f64) -> Self {
        let mut detector = Self::new(language, confidence);
        detector.candidate.reliable = false;
        detector
    }

    /// Texts the detector was asked about
    pub fn seen(&self) -> Arc<Mutex<Vec<String>>> {
        self.seen.clone()
    }
}

impl LanguageDetector for FixedDetector {
    fn detect(&self, text: &str) -> Vec<Detection> {
        self.seen.lock().unwrap().push(text.to_string());
        vec![self.candidate.clone()]
    }
}

//! Entry point tying the cache, the language resolver and the backend together

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheStore, RedbStore};
use crate::core::client::{NiutransClient, TranslationBackend};
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{is_ascii_only, is_cjk, is_supported, LangPair, Resolution};
use crate::engine::{fits, fits_plain, ChunkTranslator};
use crate::language::{
    LanguageResolver, ScriptConverter, SuggestionTable, WhatlangDetector, ZhConverter,
};
use crate::markup::dom::escape_text;
use crate::markup::whitespace::pad_like;
use crate::markup::{
    parse, parse_document, parse_in, serialize, Element, Unit, FRAGMENT_CONTEXT,
};

/// Translates HTML fragments and plain text between the supported languages.
///
/// Safe to share between threads; every finished unit is cached per
/// language pair and reused on the next request.
pub struct Translator {
    backend: Arc<dyn TranslationBackend>,
    cache: CacheStore,
    resolver: LanguageResolver,
    converter: Box<dyn ScriptConverter>,
    dummy: bool,
}

impl Translator {
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        cache: CacheStore,
        resolver: LanguageResolver,
    ) -> Self {
        let dummy = backend.is_disabled();
        if dummy {
            warn!("{} backend is disabled, texts are returned untranslated", backend.name());
        }
        Self {
            backend,
            cache,
            resolver,
            converter: Box::new(ZhConverter),
            dummy,
        }
    }

    pub fn with_converter(mut self, converter: Box<dyn ScriptConverter>) -> Self {
        self.converter = converter;
        self
    }

    /// Build the NiuTrans-backed translator with redb caches under `cache_dir`
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        let backend = Arc::new(NiutransClient::new(config)?);
        let cache = CacheStore::new(
            Box::new(RedbStore::new(config.cache_path())),
            Box::new(RedbStore::new(config.backup_cache_path())),
        );

        let suggestion_path = config.suggestion_path();
        let suggestions = if suggestion_path.exists() {
            SuggestionTable::load(&suggestion_path)?
        } else {
            warn!(
                "No suggestion file at {}, relying on detection only",
                suggestion_path.display()
            );
            SuggestionTable::new()
        };
        let resolver = LanguageResolver::new(
            suggestions,
            Box::new(WhatlangDetector::new()),
            config.detection_threshold,
        );

        Ok(Self::new(backend, cache, resolver))
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Translate an HTML fragment into `to_lang`.
    ///
    /// Without a usable `from_lang` the source language is resolved per
    /// top-level piece, so mixed-language fragments work.
    pub fn translate(&self, src_text: &str, to_lang: &str, from_lang: Option<&str>) -> Result<String> {
        if self.dummy {
            return Ok(src_text.to_string());
        }
        if from_lang.is_some_and(is_cjk) && is_ascii_only(src_text) {
            return Ok(src_text.to_string());
        }

        let units = parse(src_text);
        let text: String = units.iter().map(Unit::text_content).collect();
        if text.trim().is_empty() {
            return Ok(src_text.to_string());
        }

        if let Some(from) = from_lang.filter(|lang| is_supported(lang)) {
            let pair = LangPair::new(from, to_lang)?;
            if let Some(hit) = self.cache.lookup(&pair, src_text.trim())? {
                return Ok(hit);
            }
        }

        let (children, context, mut output, tail) = match into_single_root(units) {
            Ok(root) => {
                let head = raw_start_tag(src_text, &root).unwrap_or_else(|| root.start_tag());
                let tail = format!("</{}>", root.name);
                (root.children, root.name, head, tail)
            }
            Err(units) => (units, FRAGMENT_CONTEXT.to_string(), String::new(), String::new()),
        };

        let pieces = self.detach(children)?;
        for piece in pieces {
            let (source, attrs, is_plain) = match piece {
                Piece::Space => {
                    output.push(' ');
                    continue;
                }
                Piece::Text(text) => (text, Vec::new(), true),
                Piece::Markup(html, attrs) => (html, attrs, false),
            };

            let translated = self.translate_unit(&source, from_lang, to_lang, is_plain, &context)?;
            if translated.is_empty() {
                continue;
            }

            if is_plain {
                output.push_str(&pad_like(&source, escape_text(&translated)));
            } else if attrs.is_empty() {
                output.push_str(&translated);
            } else {
                output.push_str(&reattach(&translated, attrs, &context));
            }
        }
        output.push_str(&tail);

        Ok(output)
    }

    /// Translate a full HTML page.
    ///
    /// The doctype and the `<html>`, `<head>` and `<body>` tags are kept with
    /// their attributes; the `<title>` and the body content are translated.
    pub fn translate_document(&self, src_text: &str, to_lang: &str, from_lang: Option<&str>) -> Result<String> {
        if self.dummy {
            return Ok(src_text.to_string());
        }

        let mut document = parse_document(src_text);
        if let Some(head) = document.section_mut("head") {
            for unit in head.children.iter_mut() {
                if let Unit::Element(title) = unit {
                    if title.name == "title" {
                        let text: String = title.children.iter().map(Unit::text_content).collect();
                        let translated = self.translate_text(&text, to_lang, from_lang)?;
                        title.children = vec![Unit::Text(translated)];
                    }
                }
            }
        }
        if let Some(body) = document.section_mut("body") {
            let content = serialize(&body.children);
            let translated = self.translate(&content, to_lang, from_lang)?;
            body.children = parse_in(&translated, "body");
        }

        Ok(document.to_html())
    }

    /// Split top-level units into dispatchable pieces, rejecting any that
    /// cannot be sent within the block size
    fn detach(&self, units: Vec<Unit>) -> Result<Vec<Piece>> {
        let block_size = self.backend.max_block_size();
        let mut pieces = Vec::with_capacity(units.len());
        for unit in units {
            let piece = match unit {
                Unit::Text(text) if text.trim().is_empty() => Piece::Space,
                Unit::Text(text) => {
                    if !fits_plain(text.trim(), block_size) {
                        return Err(TranslationError::SizeExceeded {
                            limit: block_size,
                            text,
                        });
                    }
                    Piece::Text(text)
                }
                Unit::Element(mut element) => {
                    let attrs = element.take_attrs();
                    let unit = Unit::Element(element);
                    if !fits(&unit, block_size) {
                        return Err(TranslationError::SizeExceeded {
                            limit: block_size,
                            text: unit.to_html(),
                        });
                    }
                    Piece::Markup(unit.to_html(), attrs)
                }
            };
            pieces.push(piece);
        }
        Ok(pieces)
    }

    /// Translate plain text, keeping its line structure
    pub fn translate_text(&self, text: &str, to_lang: &str, from_lang: Option<&str>) -> Result<String> {
        if self.dummy || text.trim().is_empty() {
            return Ok(text.to_string());
        }
        if from_lang.is_some_and(is_cjk) && is_ascii_only(text) {
            return Ok(text.to_string());
        }
        self.translate_unit(text, from_lang, to_lang, true, FRAGMENT_CONTEXT)
    }

    /// Record a reviewed translation that overrides anything cached for it
    pub fn suggest(&self, from_lang: &str, to_lang: &str, src_text: &str, target: &str) -> Result<()> {
        let pair = LangPair::new(from_lang, to_lang)?;
        self.cache.suggest(&pair, src_text.trim(), target)
    }

    /// Source language of `text` as the translator would resolve it
    pub fn resolve_language(&self, text: &str) -> Result<Resolution> {
        self.resolver.resolve(text)
    }

    /// Persist every cache generation touched since the last flush
    pub fn flush(&self) -> Result<usize> {
        self.cache.flush()
    }

    fn translate_unit(
        &self,
        src_text: &str,
        from_lang: Option<&str>,
        to_lang: &str,
        is_plain: bool,
        context: &str,
    ) -> Result<String> {
        if !is_supported(to_lang) {
            return Err(TranslationError::UnsupportedLanguage {
                lang: to_lang.to_string(),
                text: src_text.to_string(),
            });
        }

        let src_text = src_text.trim();
        let mut chars = src_text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return Ok(String::new()),
            (Some(c), None) if c.is_ascii() => return Ok(src_text.to_string()),
            _ => {}
        }

        let from_lang = match from_lang.filter(|lang| is_supported(lang)) {
            Some(lang) => lang.to_string(),
            None => match self.resolver.resolve(src_text)? {
                Resolution::Skip => return Ok(String::new()),
                Resolution::PassThrough => return Ok(src_text.to_string()),
                Resolution::Language(lang) => lang,
            },
        };
        if is_cjk(&from_lang) && is_ascii_only(src_text) {
            return Ok(src_text.to_string());
        }

        let src_text = if from_lang == "zh" {
            self.converter.to_simplified(src_text)
        } else {
            src_text.to_string()
        };
        if from_lang == to_lang {
            return Ok(src_text);
        }

        let pair = LangPair::new(from_lang, to_lang)?;
        if let Some(hit) = self.cache.lookup(&pair, &src_text)? {
            return Ok(hit);
        }

        debug!("Translating {} chars ({})", src_text.chars().count(), pair);
        let translated = ChunkTranslator::new(self.backend.as_ref(), &self.cache, &pair)
            .in_context(context)
            .translate(&src_text, is_plain)?;
        if translated.is_empty() {
            return Err(TranslationError::EmptyTranslation { text: src_text });
        }
        self.cache.store(&pair, &src_text, &translated)?;

        Ok(translated)
    }
}

/// Top-level unit ready for dispatch
enum Piece {
    Space,
    Text(String),
    Markup(String, Vec<(String, String)>),
}

fn into_single_root(mut units: Vec<Unit>) -> std::result::Result<Element, Vec<Unit>> {
    match units.pop() {
        Some(Unit::Element(root)) if units.is_empty() => Ok(root),
        Some(last) => {
            units.push(last);
            Err(units)
        }
        None => Err(units),
    }
}

/// Opening tag of `root` exactly as written in `src`, quotes respected
fn raw_start_tag(src: &str, root: &Element) -> Option<String> {
    let lower = mask_comments(&src.to_ascii_lowercase());
    let open = format!("<{}", root.name);
    let start = lower.match_indices(&open).map(|(i, _)| i).find(|&i| {
        matches!(
            lower[i + open.len()..].chars().next(),
            Some('>' | '/' | ' ' | '\t' | '\n' | '\r' | '\x0c')
        )
    })?;
    let mut quote = None;
    for (i, c) in src[start..].char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if q == c => quote = None,
            (None, '>') => return Some(src[start..start + i + 1].to_string()),
            _ => {}
        }
    }
    None
}

/// Blank out `<!-- -->` spans, keeping byte offsets
fn mask_comments(html: &str) -> String {
    let mut masked = html.to_string();
    let mut from = 0;
    while let Some(start) = masked[from..].find("<!--").map(|i| from + i) {
        let end = masked[start + 4..]
            .find("-->")
            .map_or(masked.len(), |i| start + 4 + i + 3);
        masked.replace_range(start..end, &" ".repeat(end - start));
        from = end;
    }
    masked
}

/// Put `attrs` back on the first element of a translated fragment
fn reattach(html: &str, attrs: Vec<(String, String)>, context: &str) -> String {
    let mut units = parse_in(html, context);
    if let Some(Unit::Element(element)) = units.iter_mut().find(|u| matches!(u, Unit::Element(_))) {
        element.attrs = attrs;
    }
    serialize(&units)
}

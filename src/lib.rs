//! NiuTrans Translator - HTML-aware, cached machine translation
//!
//! This library splits HTML fragments and plain text into pieces the NiuTrans
//! API accepts, resolves the source language per piece and keeps every result
//! in a two-generation persistent cache.

#![forbid(unsafe_code)]

pub mod cache;
pub mod cli;
pub mod core;
pub mod engine;
pub mod language;
pub mod markup;
pub mod translator;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types for convenience
pub use core::{
    client::{NiutransClient, TranslationBackend},
    config::TranslatorConfig,
    errors::{Result, TranslationError},
    models::{LangPair, Resolution, Suggestion},
};

pub use cache::CacheStore;
pub use translator::Translator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

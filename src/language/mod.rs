//! Source-language resolution

pub mod detector;
pub mod resolver;
pub mod script;
pub mod suggestion;

pub use detector::{Detection, LanguageDetector, WhatlangDetector};
pub use resolver::LanguageResolver;
pub use script::{ScriptConverter, ZhConverter};
pub use suggestion::SuggestionTable;

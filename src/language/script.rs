//! Chinese script conversion

use zhconv::{zhconv, Variant};

/// Converts Chinese text to the script the backend expects
pub trait ScriptConverter: Send + Sync {
    fn to_simplified(&self, text: &str) -> String;
}

/// Traditional → simplified conversion backed by zhconv
#[derive(Debug, Default, Clone, Copy)]
pub struct ZhConverter;

impl ScriptConverter for ZhConverter {
    fn to_simplified(&self, text: &str) -> String {
        zhconv(text, Variant::ZhHans)
    }
}

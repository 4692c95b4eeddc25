//! Blocking NiuTrans client and the backend capability trait

use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::LangPair;
use crate::core::retry::Retrier;

/// A translation provider as seen by the chunking engine.
///
/// Implementations only translate a single block; splitting, caching and
/// size checks happen in [`crate::engine::ChunkTranslator`].
pub trait TranslationBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// A disabled backend fails every call without I/O
    fn is_disabled(&self) -> bool;

    /// Largest block, in chars, accepted by one call
    fn max_block_size(&self) -> usize;

    /// Translate one batch of plain text
    fn translate_plain(&self, text: &str, pair: &LangPair) -> Result<String>;

    /// Translate one markup block
    fn translate_markup(&self, text: &str, pair: &LangPair) -> Result<String>;
}

/// Response body of both NiuTrans endpoints
#[derive(Debug, Deserialize)]
struct NiutransResponse {
    #[serde(default)]
    tgt_text: Option<String>,
    #[serde(default)]
    error_code: Option<serde_json::Value>,
    #[serde(default)]
    error_msg: Option<String>,
}

/// NiuTrans HTTP client
pub struct NiutransClient {
    client: reqwest::blocking::Client,
    api_key: String,
    api_url: String,
    xml_api_url: String,
    max_block_size: usize,
    retrier: Retrier,
}

impl fmt::Debug for NiutransClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NiutransClient")
            .field("api_url", &self.api_url)
            .field("xml_api_url", &self.xml_api_url)
            .field("disabled", &self.is_disabled())
            .field("max_block_size", &self.max_block_size)
            .finish()
    }
}

impl NiutransClient {
    /// Create a new client
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let retrier = Retrier::new(config.max_retries, config.retry_delay());
        Self::with_retrier(config, retrier)
    }

    /// Create a client with a custom retry policy
    pub fn with_retrier(config: &TranslatorConfig, retrier: Retrier) -> Result<Self> {
        if config.api_key.is_empty() {
            warn!("apikey being empty, dummy translator is used.");
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            xml_api_url: config.xml_api_url.clone(),
            max_block_size: config.max_block_size,
            retrier,
        })
    }

    fn translate_base(&self, api_url: &str, src_text: &str, pair: &LangPair) -> Result<String> {
        let src_text = src_text.trim();
        if src_text.is_empty() {
            return Ok(String::new());
        }

        let form = [
            ("src_text", src_text),
            ("from", pair.from.as_str()),
            ("to", pair.to.as_str()),
            ("apikey", self.api_key.as_str()),
        ];

        let body = self.retrier.run(|| self.send_request(api_url, &form))?;
        let data: NiutransResponse =
            serde_json::from_str(&body).map_err(|e| TranslationError::InvalidResponse {
                message: format!("{}: {}", e, body),
            })?;

        parse_response(data, src_text)
    }

    /// Send actual HTTP request
    fn send_request(&self, api_url: &str, form: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .post(api_url)
            .form(&form)
            .send()
            .map_err(classify_request_error)?;

        response.text().map_err(classify_request_error)
    }
}

fn classify_request_error(e: reqwest::Error) -> TranslationError {
    if e.is_connect() || e.is_timeout() {
        TranslationError::Network {
            message: e.to_string(),
        }
    } else {
        TranslationError::Http(e)
    }
}

fn parse_response(data: NiutransResponse, src_text: &str) -> Result<String> {
    if let Some(code) = data.error_code {
        let code = match code {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        return Err(TranslationError::Backend {
            code,
            message: data.error_msg.unwrap_or_default(),
            text: src_text.to_string(),
        });
    }

    let tgt_text = data.tgt_text.unwrap_or_default().trim().to_string();
    if tgt_text.is_empty() {
        return Err(TranslationError::EmptyTranslation {
            text: src_text.to_string(),
        });
    }

    debug!("NiuTrans translated {} chars", src_text.chars().count());
    Ok(tgt_text)
}

impl TranslationBackend for NiutransClient {
    fn name(&self) -> &str {
        "niutrans"
    }

    fn is_disabled(&self) -> bool {
        self.api_key.is_empty()
    }

    fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    fn translate_plain(&self, text: &str, pair: &LangPair) -> Result<String> {
        self.translate_base(&self.api_url, text, pair)
    }

    fn translate_markup(&self, text: &str, pair: &LangPair) -> Result<String> {
        self.translate_base(&self.xml_api_url, text, pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn response(json: &str) -> NiutransResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_success() {
        let data = response(r#"{"tgt_text": " Hello \n", "from": "zh", "to": "en"}"#);
        assert_eq!(parse_response(data, "你好").unwrap(), "Hello");
    }

    #[test]
    fn test_parse_error_code() {
        let data = response(r#"{"error_code": "13001", "error_msg": "apikey error"}"#);
        match parse_response(data, "你好") {
            Err(TranslationError::Backend { code, message, .. }) => {
                assert_eq!(code, "13001");
                assert_eq!(message, "apikey error");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_numeric_error_code() {
        let data = response(r#"{"error_code": 10001, "error_msg": "bad"}"#);
        match parse_response(data, "x") {
            Err(TranslationError::Backend { code, .. }) => assert_eq!(code, "10001"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_target() {
        let data = response(r#"{"tgt_text": "   "}"#);
        assert!(matches!(
            parse_response(data, "你好"),
            Err(TranslationError::EmptyTranslation { .. })
        ));
    }

    #[test]
    fn test_client_without_key_is_disabled() {
        let client = NiutransClient::new(&TranslatorConfig::default()).unwrap();
        assert!(client.is_disabled());
        assert_eq!(client.max_block_size(), 5000);
    }

    #[test]
    fn test_unreachable_server_exhausts_retries() {
        let delays = Arc::new(Mutex::new(Vec::new()));
        let recorded = delays.clone();
        let retrier = Retrier::with_sleeper(
            4,
            Duration::from_secs(10),
            Arc::new(move |d| recorded.lock().unwrap().push(d)),
        );
        let config = TranslatorConfig {
            api_key: "key".to_string(),
            api_url: "http://127.0.0.1:9/translation".to_string(),
            ..Default::default()
        };
        let client = NiutransClient::with_retrier(&config, retrier).unwrap();
        let pair = LangPair::new("en", "zh").unwrap();

        let result = client.translate_plain("Hello", &pair);

        assert!(matches!(result, Err(TranslationError::Network { .. })));
        assert_eq!(
            *delays.lock().unwrap(),
            vec![
                Duration::from_secs(10),
                Duration::from_secs(20),
                Duration::from_secs(30),
                Duration::from_secs(40),
            ]
        );
    }

    #[test]
    fn test_blank_source_skips_request() {
        let config = TranslatorConfig {
            api_key: "key".to_string(),
            api_url: "http://127.0.0.1:9/unreachable".to_string(),
            ..Default::default()
        };
        let client = NiutransClient::new(&config).unwrap();
        let pair = LangPair::new("en", "zh").unwrap();
        assert_eq!(client.translate_plain("  \n ", &pair).unwrap(), "");
    }
}

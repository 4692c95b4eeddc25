//! Statistical language detection

use whatlang::{Detector, Lang};

/// How many candidates a detector is asked for
pub const MAX_CANDIDATES: usize = 3;

/// One candidate language reported by a detector
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub language: String,
    pub confidence: f64,
    pub reliable: bool,
}

/// Statistical language detector
pub trait LanguageDetector: Send + Sync {
    /// Most likely languages of `text`, best first, at most [`MAX_CANDIDATES`]
    fn detect(&self, text: &str) -> Vec<Detection>;
}

/// Trigram detector backed by whatlang
pub struct WhatlangDetector {
    detector: Detector,
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self {
            detector: Detector::new(),
        }
    }
}

fn language_code(lang: Lang) -> &'static str {
    match lang {
        Lang::Ara => "ar",
        Lang::Cmn => "zh",
        Lang::Eng => "en",
        Lang::Kor => "ko",
        Lang::Por => "pt",
        Lang::Spa => "es",
        Lang::Deu => "de",
        Lang::Dan => "da",
        Lang::Fra => "fr",
        Lang::Fin => "fi",
        Lang::Swe => "sv",
        Lang::Heb => "he",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        Lang::Tha => "th",
        Lang::Jpn => "ja",
        other => other.code(),
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Vec<Detection> {
        self.detector
            .detect(text)
            .map(|info| Detection {
                language: language_code(info.lang()).to_string(),
                confidence: info.confidence(),
                reliable: info.is_reliable(),
            })
            .into_iter()
            .take(MAX_CANDIDATES)
            .collect()
    }
}

//! Text canonicalization, language identification, and tokenization.
//!
//! Pipeline: collapse whitespace → strip zero-width characters →
//! lowercase → identify language → tokenize (and Porter-stem English).

use rust_stemmers::{Algorithm, Stemmer};

/// Shortest sample we attempt language identification on.
const MIN_DETECT_CHARS: usize = 10;

/// Canonicalized text ready for matching.
///
/// `stems` is populated only when the text identifies as English; for any
/// other (or undetermined) language, tokens are plain whitespace splits
/// and matching degrades to substring/regex checks on `plain`.
#[derive(Debug, Clone)]
pub struct NormalizedText {
    /// ISO-639-3-like code, `"und"` when undetermined.
    pub language: String,
    pub plain: String,
    pub tokens: Vec<String>,
    pub stems: Vec<String>,
}

/// Collapse runs of whitespace, strip zero-width/BOM characters, trim.
pub fn normalize_basic(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Best-effort ISO-639-3 language code; `"und"` for short or
/// unidentifiable input.
pub fn detect_language(text: &str) -> String {
    if text.chars().count() < MIN_DETECT_CHARS {
        return "und".to_string();
    }
    match whatlang::detect(text) {
        Some(info) => info.lang().code().to_string(),
        None => "und".to_string(),
    }
}

/// Canonicalize `text` for matching.
pub fn normalize(text: &str) -> NormalizedText {
    let plain = normalize_basic(text).to_lowercase();
    let language = detect_language(&plain);

    if language == "eng" {
        let cleaned: String = plain
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '\'' {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        let tokens: Vec<String> = cleaned
            .split_whitespace()
            .map(|t| t.to_string())
            .collect();
        let stemmer = Stemmer::create(Algorithm::English);
        let stems = tokens.iter().map(|t| stemmer.stem(t).into_owned()).collect();
        return NormalizedText {
            language,
            plain,
            tokens,
            stems,
        };
    }

    NormalizedText {
        language,
        tokens: plain.split_whitespace().map(|t| t.to_string()).collect(),
        stems: Vec::new(),
        plain,
    }
}

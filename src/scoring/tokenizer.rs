use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+|[\r\n]+").unwrap());
static WORD_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-z']+\b").unwrap());

/// A transcript split into sentences and lowercase word tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub normalized: String,
    pub lowered: String,
    pub sentences: Vec<String>,
    pub tokens: Vec<String>,
    pub sentence_tokens: Vec<Vec<String>>,
}

impl Transcript {
    pub fn parse(text: &str) -> Self {
        let normalized = normalize_whitespace(text);
        let lowered = normalized.to_lowercase();
        let sentences = split_sentences(text);
        let tokens = word_tokens(&lowered);
        let sentence_tokens = sentences
            .iter()
            .map(|s| word_tokens(&s.to_lowercase()))
            .collect();

        Self {
            normalized,
            lowered,
            sentences,
            tokens,
            sentence_tokens,
        }
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Splits on runs of terminal punctuation or line breaks. Text without any
/// usable fragment becomes a single sentence; blank text has none.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    let sentences: Vec<String> = SENTENCE_BREAK
        .split(text)
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.is_empty() {
        vec![normalized]
    } else {
        sentences
    }
}

/// Lowercase alphabetic tokens (letters and apostrophes).
pub fn word_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

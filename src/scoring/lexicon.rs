use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::settings::{Lexicon, Settings};

pub const DEFAULT_FILLERS: &[&str] = &[
    "um", "uh", "erm", "hmm", "like", "you know", "i mean", "sort of", "kind of", "well",
];

pub const DEFAULT_SUBJECTS: &[&str] = &[
    "i", "you", "he", "she", "we", "they", "it", "my", "our", "their", "people", "someone",
    "everyone",
];

pub const DEFAULT_VERB_STEMS: &[&str] = &[
    "am", "is", "are", "was", "were", "do", "did", "does", "have", "has", "had", "like", "love",
    "want", "need", "go", "went", "say", "said", "talk", "talked", "work", "worked", "study",
    "studied", "live", "lived", "travel", "traveled", "enjoy", "enjoyed", "think", "thought",
    "feel", "felt", "can", "could", "will", "would", "should",
];

pub const DEFAULT_CONNECTORS: &[&str] = &[
    "and", "but", "so", "because", "since", "when", "while", "if", "although", "though",
    "before", "after", "that", "which", "who", "where", "however", "therefore", "meanwhile",
];

pub const DEFAULT_TIME_MARKERS: &[&str] = &[
    "yesterday",
    "last",
    "ago",
    "when i was",
    "before",
    "after",
    "tomorrow",
    "next",
    "future",
    "plan",
    "will",
    "would",
    "could",
];

static VERB_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(ed|ing)$").unwrap());

static BUILTIN_FILLERS: LazyLock<Vec<FillerPattern>> = LazyLock::new(|| {
    DEFAULT_FILLERS
        .iter()
        .map(|f| FillerPattern::new(f).unwrap())
        .collect()
});

/// A filler phrase with its whole-word matcher.
#[derive(Debug, Clone)]
pub struct FillerPattern {
    pub phrase: String,
    pattern: Regex,
}

impl FillerPattern {
    fn new(phrase: &str) -> Result<Self> {
        let phrase = phrase.trim().to_lowercase();
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&phrase)))
            .with_context(|| format!("invalid filler phrase '{phrase}'"))?;
        Ok(Self { phrase, pattern })
    }

    pub fn count_in(&self, lowered: &str) -> usize {
        self.pattern.find_iter(lowered).count()
    }
}

/// Read-only lookup tables built once from [`Lexicon`] settings.
#[derive(Debug, Clone)]
pub struct CompiledLexicon {
    fillers: Vec<FillerPattern>,
    subjects: HashSet<String>,
    verb_stems: HashSet<String>,
    connectors: HashSet<String>,
    time_markers: Vec<String>,
}

fn word_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| w.trim().to_lowercase()).collect()
}

impl CompiledLexicon {
    pub fn compile(lexicon: &Lexicon) -> Result<Self> {
        let fillers = lexicon
            .fillers
            .iter()
            .map(|f| FillerPattern::new(f))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::with_fillers(fillers, lexicon))
    }

    /// Tables for the built-in word lists; cannot fail.
    pub fn builtin() -> Self {
        Self::with_fillers(BUILTIN_FILLERS.clone(), &Settings::default().lexicon)
    }

    fn with_fillers(fillers: Vec<FillerPattern>, lexicon: &Lexicon) -> Self {
        Self {
            fillers,
            subjects: word_set(&lexicon.subjects),
            verb_stems: word_set(&lexicon.verb_stems),
            connectors: word_set(&lexicon.connectors),
            time_markers: lexicon
                .time_markers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn fillers(&self) -> &[FillerPattern] {
        &self.fillers
    }

    /// Sum of whole-word filler matches, counted separately per filler.
    pub fn count_fillers(&self, lowered: &str) -> usize {
        self.fillers.iter().map(|f| f.count_in(lowered)).sum()
    }

    pub fn is_subject(&self, word: &str) -> bool {
        self.subjects.contains(word)
    }

    pub fn is_verb(&self, word: &str) -> bool {
        self.verb_stems.contains(word) || VERB_SUFFIX.is_match(word)
    }

    pub fn is_connector(&self, word: &str) -> bool {
        self.connectors.contains(word)
    }

    /// Literal substring hits; markers may match inside longer words and
    /// across sentence boundaries.
    pub fn count_time_markers(&self, lowered: &str) -> usize {
        self.time_markers
            .iter()
            .map(|marker| lowered.matches(marker.as_str()).count())
            .sum()
    }
}

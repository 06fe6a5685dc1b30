use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::lexicon::CompiledLexicon;
use super::tokenizer::Transcript;

pub const FILLER_FLUENCY_FACTOR: f64 = 3.0;
pub const MIN_COMPLETE_SENTENCE_WORDS: usize = 3;
pub const CONNECTORS_PER_SENTENCE: f64 = 1.5;
pub const REPETITION_FREE_RATIO: f64 = 0.18;
pub const REPETITION_SCALE: f64 = 2.0;

pub const COMPLEXITY_CONNECTOR_WEIGHT: f64 = 0.55;
pub const COMPLEXITY_LENGTH_WEIGHT: f64 = 0.35;
pub const COMPLEXITY_TENSE_WEIGHT: f64 = 0.10;
pub const COMPLEXITY_FULL_LENGTH: f64 = 18.0;

pub const GRAMMAR_INCOMPLETE_WEIGHT: f64 = 0.6;
pub const GRAMMAR_FILLER_WEIGHT: f64 = 0.25;
pub const GRAMMAR_OVERREACH_COMPLEXITY: f64 = 0.68;
pub const GRAMMAR_OVERREACH_PENALTY: f64 = 0.05;

pub const CONTINUITY_CONNECTOR_WEIGHT: f64 = 0.6;
pub const CONTINUITY_TENSE_WEIGHT: f64 = 0.4;

pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Surface metrics for one transcript. Scores are in [0, 1]; the average
/// sentence length is a plain word count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureSet {
    pub word_count: usize,
    pub sentence_count: usize,
    pub average_sentence_length: f64,

    pub filler_count: usize,
    pub filler_rate: f64,
    pub fluency_score: f64,

    pub complete_sentence_count: usize,
    pub sentence_completion_rate: f64,

    pub connector_count: usize,
    pub connector_density: f64,

    pub max_word_frequency_ratio: f64,
    pub repetition_penalty: f64,

    pub time_marker_hits: usize,
    pub sentence_complexity: f64,

    pub unique_word_count: usize,
    pub lexical_variety: f64,

    pub grammar_accuracy: f64,
    pub continuity_score: f64,
}

impl FeatureSet {
    /// Time markers per sentence, capped at one.
    pub fn tense_contribution(&self) -> f64 {
        clamp01(self.time_marker_hits as f64 / self.sentence_count.max(1) as f64)
    }

    pub fn length_contribution(&self) -> f64 {
        clamp01(self.average_sentence_length / COMPLEXITY_FULL_LENGTH)
    }

    pub fn has_time_shift(&self) -> bool {
        self.time_marker_hits >= 1
    }
}

pub fn extract_features(transcript: &Transcript, lexicon: &CompiledLexicon) -> FeatureSet {
    let word_count = transcript.word_count();
    let sentence_count = transcript.sentence_count();
    let average_sentence_length = if sentence_count == 0 {
        word_count as f64
    } else {
        word_count as f64 / sentence_count as f64
    };

    let filler_count = lexicon.count_fillers(&transcript.lowered);
    let filler_rate = clamp01(ratio(filler_count, word_count));
    let fluency_score = fluency_from_filler_rate(filler_rate);

    let complete_sentence_count = transcript
        .sentence_tokens
        .iter()
        .filter(|words| is_complete_sentence(words, lexicon))
        .count();
    let sentence_completion_rate = ratio(complete_sentence_count, sentence_count);

    let connector_count = transcript
        .tokens
        .iter()
        .filter(|w| lexicon.is_connector(w))
        .count();
    let connector_density = if sentence_count == 0 {
        0.0
    } else {
        clamp01(connector_count as f64 / (sentence_count as f64 * CONNECTORS_PER_SENTENCE))
    };

    let max_word_frequency_ratio = max_word_frequency_ratio(&transcript.tokens);
    let repetition_penalty = if word_count == 0 {
        0.0
    } else {
        clamp01((max_word_frequency_ratio - REPETITION_FREE_RATIO) * REPETITION_SCALE)
    };

    let time_marker_hits = lexicon.count_time_markers(&transcript.lowered);

    let unique_word_count = transcript.tokens.iter().collect::<HashSet<_>>().len();
    let lexical_variety = clamp01(ratio(unique_word_count, word_count));

    let mut features = FeatureSet {
        word_count,
        sentence_count,
        average_sentence_length,
        filler_count,
        filler_rate,
        fluency_score,
        complete_sentence_count,
        sentence_completion_rate,
        connector_count,
        connector_density,
        max_word_frequency_ratio,
        repetition_penalty,
        time_marker_hits,
        unique_word_count,
        lexical_variety,
        ..Default::default()
    };

    let tense = features.tense_contribution();
    features.sentence_complexity = clamp01(
        connector_density * COMPLEXITY_CONNECTOR_WEIGHT
            + features.length_contribution() * COMPLEXITY_LENGTH_WEIGHT
            + tense * COMPLEXITY_TENSE_WEIGHT,
    );

    let overreach = if features.sentence_complexity > GRAMMAR_OVERREACH_COMPLEXITY {
        GRAMMAR_OVERREACH_PENALTY
    } else {
        0.0
    };
    features.grammar_accuracy = clamp01(
        1.0 - (1.0 - sentence_completion_rate) * GRAMMAR_INCOMPLETE_WEIGHT
            - filler_rate * GRAMMAR_FILLER_WEIGHT
            - overreach,
    );

    features.continuity_score = clamp01(
        connector_density * CONTINUITY_CONNECTOR_WEIGHT + tense * CONTINUITY_TENSE_WEIGHT,
    );

    features
}

pub fn fluency_from_filler_rate(filler_rate: f64) -> f64 {
    clamp01(1.0 - filler_rate * FILLER_FLUENCY_FACTOR)
}

/// At least three words, a subject-like token and a verb-like token.
pub fn is_complete_sentence(words: &[String], lexicon: &CompiledLexicon) -> bool {
    words.len() >= MIN_COMPLETE_SENTENCE_WORDS
        && words.iter().any(|w| lexicon.is_subject(w))
        && words.iter().any(|w| lexicon.is_verb(w))
}

pub fn max_word_frequency_ratio(tokens: &[String]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<&str, usize> = HashMap::new();
    for token in tokens {
        *freq.entry(token.as_str()).or_insert(0) += 1;
    }
    let max_count = freq.values().copied().max().unwrap_or(0);

    max_count as f64 / tokens.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn features_for(text: &str) -> FeatureSet {
        let lexicon = CompiledLexicon::compile(&Settings::default().lexicon).unwrap();
        extract_features(&Transcript::parse(text), &lexicon)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty_transcript_features() {
        let f = features_for("");
        assert_eq!(f.word_count, 0);
        assert_eq!(f.sentence_count, 0);
        assert_close(f.average_sentence_length, 0.0);
        assert_close(f.filler_rate, 0.0);
        assert_close(f.fluency_score, 1.0);
        assert_close(f.sentence_completion_rate, 0.0);
        assert_close(f.connector_density, 0.0);
        assert_close(f.repetition_penalty, 0.0);
        assert_close(f.lexical_variety, 0.0);
        assert_close(f.sentence_complexity, 0.0);
        assert_close(f.continuity_score, 0.0);
        assert_close(f.grammar_accuracy, 0.4);
    }

    #[test]
    fn test_short_past_tense_features() {
        let f = features_for("I go school yesterday. I like hamburger.");
        assert_eq!(f.word_count, 7);
        assert_eq!(f.sentence_count, 2);
        assert_close(f.average_sentence_length, 3.5);
        assert_eq!(f.filler_count, 1);
        assert_close(f.filler_rate, 1.0 / 7.0);
        assert_close(f.fluency_score, 1.0 - 3.0 / 7.0);
        assert_eq!(f.complete_sentence_count, 2);
        assert_close(f.sentence_completion_rate, 1.0);
        assert_eq!(f.connector_count, 0);
        assert_eq!(f.time_marker_hits, 1);
        assert_close(f.repetition_penalty, (2.0 / 7.0 - 0.18) * 2.0);
        assert_close(f.lexical_variety, 6.0 / 7.0);
        assert_close(f.sentence_complexity, 0.35 * (3.5 / 18.0) + 0.10 * 0.5);
        assert_close(f.continuity_score, 0.4 * 0.5);
        assert_close(f.grammar_accuracy, 1.0 - 0.25 / 7.0);
    }

    #[test]
    fn test_sentence_completion_requires_subject_verb_and_length() {
        let f = features_for("Went home. I went home. Dog is big.");
        // "went home" is too short, "dog is big" has no subject word.
        assert_eq!(f.complete_sentence_count, 1);
        assert_close(f.sentence_completion_rate, 1.0 / 3.0);
    }

    #[test]
    fn test_suffix_verbs_count() {
        let f = features_for("We finally finished painting.");
        assert_eq!(f.complete_sentence_count, 1);
    }

    #[test]
    fn test_connector_density_is_capped() {
        let f = features_for("and but so because and but so.");
        assert_eq!(f.connector_count, 7);
        assert_close(f.connector_density, 1.0);
    }

    #[test]
    fn test_more_fillers_never_raise_fluency() {
        let base = "I went to the park with my friends and we played soccer";
        let mut previous = features_for(base).fluency_score;
        for fillers in ["um", "um uh", "um uh like", "um uh like you know well"] {
            let f = features_for(&format!("{fillers} {base}"));
            assert!(f.fluency_score <= previous);
            previous = f.fluency_score;
        }
    }

    #[test]
    fn test_repetition_penalty_for_dominant_word() {
        let f = features_for("go go go go home");
        assert_close(f.max_word_frequency_ratio, 0.8);
        assert_close(f.repetition_penalty, 1.0);

        let varied = features_for("one two three four five six seven");
        assert_close(varied.repetition_penalty, 0.0);
    }

    #[test]
    fn test_grammar_overreach_penalty() {
        let text = "I think that we should go because it is late and \
                    they said that it will rain after dinner so we left";
        let f = features_for(text);
        assert!(f.sentence_complexity > GRAMMAR_OVERREACH_COMPLEXITY);
        assert_close(
            f.grammar_accuracy,
            clamp01(
                1.0 - (1.0 - f.sentence_completion_rate) * 0.6
                    - f.filler_rate * 0.25
                    - GRAMMAR_OVERREACH_PENALTY,
            ),
        );
    }

    #[test]
    fn test_scores_stay_in_unit_range() {
        for text in [
            "",
            "...",
            "um um um um",
            "Yesterday, last week, ago, before, after, tomorrow, next, future, plan.",
            "and and and and and and and and and and and and",
            "I I I I I I I I I I",
        ] {
            let f = features_for(text);
            for score in [
                f.filler_rate,
                f.fluency_score,
                f.sentence_completion_rate,
                f.connector_density,
                f.repetition_penalty,
                f.sentence_complexity,
                f.lexical_variety,
                f.grammar_accuracy,
                f.continuity_score,
            ] {
                assert!((0.0..=1.0).contains(&score), "{text:?} -> {score}");
            }
        }
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let lexicon = CompiledLexicon::compile(&Settings::default().lexicon).unwrap();
        let transcript = Transcript::parse("Last year I traveled to Busan and I loved it.");
        let first = extract_features(&transcript, &lexicon);
        let second = extract_features(&transcript, &lexicon);
        assert_eq!(first, second);
    }
}

pub mod features;
pub mod lexicon;
pub mod result;
pub mod rubric;
pub mod rules;
pub mod tokenizer;

use anyhow::Result;
use std::sync::OnceLock;

use crate::settings::{settings, Settings};

pub use features::{extract_features, FeatureSet};
pub use lexicon::CompiledLexicon;
pub use result::{EvaluationResult, ScoreSummary};
pub use rubric::{level_for_score, score_features, RubricScore};
pub use rules::{resolve, tier_outcomes, LevelDecision, Resolution, RuleTier, TierOutcome};
pub use tokenizer::Transcript;

static SHARED: OnceLock<Evaluator> = OnceLock::new();

/// Immutable rubric configuration plus compiled word lists. Safe to share
/// across threads; every evaluation is independent.
#[derive(Debug, Clone)]
pub struct Evaluator {
    settings: Settings,
    lexicon: CompiledLexicon,
}

/// Every intermediate stage of one evaluation, for diagnostics.
#[derive(Debug, Clone)]
pub struct EvaluationTrace {
    pub transcript: Transcript,
    pub features: FeatureSet,
    pub rubric: RubricScore,
    pub tiers: Vec<TierOutcome>,
    pub result: EvaluationResult,
}

impl Evaluator {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let lexicon = CompiledLexicon::compile(&settings.lexicon)?;
        Ok(Self { settings, lexicon })
    }

    /// Evaluator over the built-in rubric and word lists.
    pub fn builtin() -> Self {
        Self {
            settings: Settings::default(),
            lexicon: CompiledLexicon::builtin(),
        }
    }

    /// Evaluator over the process-wide settings.
    pub fn shared() -> &'static Evaluator {
        SHARED.get_or_init(|| {
            Self::new(settings().clone()).unwrap_or_else(|e| {
                tracing::warn!("loaded settings rejected, using built-in rubric: {e:#}");
                Self::builtin()
            })
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn evaluate(&self, text: &str) -> EvaluationResult {
        let transcript = Transcript::parse(text);
        let features = extract_features(&transcript, &self.lexicon);
        let rubric = score_features(&features, &self.settings.rubric);
        let resolution = resolve(&features, rubric.base_level);

        tracing::debug!(
            words = features.word_count,
            sentences = features.sentence_count,
            total_score = rubric.total_score,
            base_level = %rubric.base_level,
            tier = ?resolution.tier,
            level = %resolution.decision.level,
            "transcript evaluated"
        );

        result::assemble(features, &rubric, resolution, &self.settings.report)
    }

    pub fn trace(&self, text: &str) -> EvaluationTrace {
        let transcript = Transcript::parse(text);
        let features = extract_features(&transcript, &self.lexicon);
        let rubric = score_features(&features, &self.settings.rubric);
        let tiers = tier_outcomes(&features, rubric.base_level);
        let resolution = resolve(&features, rubric.base_level);
        let result =
            result::assemble(features.clone(), &rubric, resolution, &self.settings.report);

        EvaluationTrace {
            transcript,
            features,
            rubric,
            tiers,
            result,
        }
    }
}

pub fn evaluate_transcript(text: &str) -> EvaluationResult {
    Evaluator::shared().evaluate(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Band, Level};

    const SHORT_PAST_TENSE: &str = "I go school yesterday. I like hamburger.";

    const FILLER_FRAGMENT: &str = "um like uh yeah";

    const EXTENDED_NARRATIVE: &str = "Last summer I traveled to Jeju Island with my \
        older sister because we both needed a real break from work. Although the flight \
        was delayed for three hours, we stayed calm and played cards while other \
        passengers complained loudly at the gate. When we finally arrived, the ocean \
        breeze felt wonderful, so we rented a small car and drove along the coast \
        until sunset. However, on the second morning a sudden storm forced us to change \
        every plan that we had carefully prepared before the trip. Instead of hiking up \
        the volcano, we visited a quiet museum which displayed traditional diving \
        equipment and old photographs of local women who harvested seafood. That \
        unexpected detour taught me that flexible travelers often discover hidden \
        treasures, and I still think about those brave divers today. Next year I will \
        return with my parents, and we would like to explore the northern villages \
        since my father enjoys fishing and my mother loves fresh tangerines. After \
        that trip, we will probably hike around the quiet eastern beaches too.";

    fn evaluator() -> Evaluator {
        Evaluator::new(Settings::default()).unwrap()
    }

    #[test]
    fn test_empty_transcript() {
        let result = evaluator().evaluate("");
        assert_eq!(result.word_count, 0);
        assert_eq!(result.sentence_count, 0);
        assert_eq!(result.level, Level::LOWEST);
        assert!(result.total_score < 0.24);
        // Zero words and zero completion trip the NL rule: two rule notes
        // followed by the five metric notes.
        assert_eq!(result.decided_by, Some(RuleTier::Novice));
        assert_eq!(result.notes.len(), 7);
        assert!(result.notes[0].contains("isolated words"));
        assert!(result.notes[2].starts_with("Sentence completion: 0%"));
        assert!(result.reason_summary.contains("NL"));
    }

    #[test]
    fn test_whitespace_only_transcript_matches_empty() {
        let e = evaluator();
        let blank = e.evaluate(" \n\t  ");
        let empty = e.evaluate("");
        assert_eq!(blank, empty);
    }

    #[test]
    fn test_short_past_tense_scenario() {
        let result = evaluator().evaluate(SHORT_PAST_TENSE);
        assert!(matches!(result.level, Level::Nh | Level::Il));
        assert_eq!(result.word_count, 7);
        assert_eq!(result.sentence_count, 2);
        assert!(result.notes.iter().any(|n| n.contains("limited")));
    }

    #[test]
    fn test_filler_fragment_scenario() {
        let result = evaluator().evaluate(FILLER_FRAGMENT);
        assert!(matches!(result.level, Level::Nl | Level::Nm));
        assert_eq!(result.decided_by, Some(RuleTier::Novice));
        assert!(result.notes.iter().any(|n| n.contains("isolated words")));
        assert!(result.notes.iter().any(|n| n.contains("complete sentences")));
    }

    #[test]
    fn test_extended_narrative_scenario() {
        let result = evaluator().evaluate(EXTENDED_NARRATIVE);
        assert!(result.word_count >= 150);
        assert!(result.sentence_count >= 6);
        assert!(matches!(result.level, Level::Ih | Level::Al));
        assert_eq!(result.level.band(), Band::Advanced);
        assert_eq!(result.decided_by, Some(RuleTier::Advanced));
        assert!(result.notes.iter().any(|n| n.contains("connected discourse")));
        assert!(result.notes.iter().any(|n| n.contains("Time-framed narration")));
    }

    #[test]
    fn test_single_word_is_nl() {
        let result = evaluator().evaluate("Hamburger.");
        assert_eq!(result.level, Level::Nl);
        assert!(result.reason_summary.contains("NL"));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let e = evaluator();
        for text in [SHORT_PAST_TENSE, FILLER_FRAGMENT, EXTENDED_NARRATIVE, ""] {
            let first = e.evaluate(text);
            let second = e.evaluate(text);
            assert_eq!(first, second);
            assert_eq!(first.total_score.to_bits(), second.total_score.to_bits());
        }
    }

    #[test]
    fn test_scores_in_unit_range() {
        let e = evaluator();
        for text in [
            SHORT_PAST_TENSE,
            FILLER_FRAGMENT,
            EXTENDED_NARRATIVE,
            "",
            "!!!",
            "1234 5678",
            "well well well well well",
        ] {
            let r = e.evaluate(text);
            assert!((0.0..=1.0).contains(&r.total_score));
            assert!((0.0..=1.0).contains(&r.scores.sentence_completion_rate));
            assert!((0.0..=1.0).contains(&r.scores.sentence_complexity));
            assert!((0.0..=1.0).contains(&r.scores.fluency_score));
            assert!((0.0..=1.0).contains(&r.scores.lexical_variety));
            assert!((0.0..=1.0).contains(&r.scores.grammar_accuracy));
            assert!((0.0..=1.0).contains(&r.filler_rate));
        }
    }

    #[test]
    fn test_trace_matches_evaluate() {
        let e = evaluator();
        let trace = e.trace(EXTENDED_NARRATIVE);
        assert_eq!(trace.result, e.evaluate(EXTENDED_NARRATIVE));
        assert_eq!(trace.tiers.len(), 3);
        assert_eq!(trace.features.word_count, trace.transcript.word_count());
    }

    #[test]
    fn test_collapse_novice_band_setting() {
        let mut settings = Settings::default();
        settings.report.collapse_novice_band = true;
        let e = Evaluator::new(settings).unwrap();

        let novice = e.evaluate("Hamburger.");
        assert_eq!(novice.level, Level::Nl);
        assert_eq!(novice.reported_level, Level::Nm);

        let advanced = e.evaluate(EXTENDED_NARRATIVE);
        assert_eq!(advanced.reported_level, advanced.level);
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let mut settings = Settings::default();
        settings.rubric.weights.volume = 0.5;
        assert!(Evaluator::new(settings).is_err());
    }

    #[test]
    fn test_default_settings_build_an_evaluator() {
        let e = Evaluator::new(Settings::default()).unwrap();
        let result = e.evaluate("I like pizza.");
        assert_eq!(result.word_count, 3);
        assert_eq!(result.sentence_count, 1);
    }

    #[test]
    fn test_shipped_settings_file_evaluates() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/settings.default.ron");
        let settings = Settings::load_from_path(path).unwrap();
        let e = Evaluator::new(settings).unwrap();
        let result = e.evaluate(SHORT_PAST_TENSE);
        assert_eq!(result, evaluator().evaluate(SHORT_PAST_TENSE));
        assert_eq!(result.word_count, 7);
    }

    #[test]
    fn test_builtin_evaluator_matches_default_settings() {
        let builtin = Evaluator::builtin();
        assert_eq!(builtin.settings(), &Settings::default());
        for text in [SHORT_PAST_TENSE, FILLER_FRAGMENT, EXTENDED_NARRATIVE, ""] {
            assert_eq!(builtin.evaluate(text), evaluator().evaluate(text));
        }
    }

    #[test]
    fn test_entry_point_does_not_panic() {
        for text in ["I like pizza.", "", "!!!", EXTENDED_NARRATIVE] {
            let result = evaluate_transcript(text);
            assert!((0.0..=1.0).contains(&result.total_score));
        }
    }

    #[test]
    fn test_shared_evaluator_is_usable() {
        let result = evaluate_transcript(SHORT_PAST_TENSE);
        assert_eq!(result.word_count, 7);
    }

    #[test]
    fn test_evaluator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Evaluator>();
    }
}

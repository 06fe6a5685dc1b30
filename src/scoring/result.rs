use serde::Serialize;

use super::features::FeatureSet;
use super::rubric::RubricScore;
use super::rules::{Resolution, RuleTier};
use crate::level::{Band, Level};
use crate::settings::Report;

/// The score subset shown alongside the level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub sentence_completion_rate: f64,
    pub sentence_complexity: f64,
    pub fluency_score: f64,
    pub lexical_variety: f64,
    pub grammar_accuracy: f64,
}

impl From<&FeatureSet> for ScoreSummary {
    fn from(f: &FeatureSet) -> Self {
        Self {
            sentence_completion_rate: f.sentence_completion_rate,
            sentence_complexity: f.sentence_complexity,
            fluency_score: f.fluency_score,
            lexical_variety: f.lexical_variety,
            grammar_accuracy: f.grammar_accuracy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub level: Level,
    pub reported_level: Level,
    pub base_level: Level,
    pub decided_by: Option<RuleTier>,
    pub total_score: f64,
    pub scores: ScoreSummary,
    pub features: FeatureSet,
    pub notes: Vec<String>,
    pub reason_summary: String,
    pub word_count: usize,
    pub sentence_count: usize,
    pub filler_rate: f64,
    pub average_sentence_length: f64,
}

impl EvaluationResult {
    /// Rank distance from a caller-chosen target; positive means above it.
    pub fn compare_to_target(&self, target: Level) -> i8 {
        self.level.rank() as i8 - target.rank() as i8
    }

    pub fn meets_target(&self, target: Level) -> bool {
        self.level >= target
    }
}

pub fn metric_notes(f: &FeatureSet) -> Vec<String> {
    vec![
        format!(
            "Sentence completion: {:.0}% (sentences with a subject and a verb)",
            f.sentence_completion_rate * 100.0
        ),
        format!(
            "Connectors and tense: {:.0}% connector density / {} time markers",
            f.connector_density * 100.0,
            f.time_marker_hits
        ),
        format!(
            "Average sentence length: {:.1} words ({} sentences / {} words)",
            f.average_sentence_length, f.sentence_count, f.word_count
        ),
        format!("Filler rate: {:.1}%", f.filler_rate * 100.0),
        format!("Repetition penalty: {:.0}%", f.repetition_penalty * 100.0),
    ]
}

pub fn reported_level(level: Level, report: &Report) -> Level {
    if report.collapse_novice_band && level.band() == Band::Novice {
        Level::Nm
    } else {
        level
    }
}

pub fn assemble(
    features: FeatureSet,
    rubric: &RubricScore,
    resolution: Resolution,
    report: &Report,
) -> EvaluationResult {
    let Resolution { tier, decision } = resolution;

    let mut notes = decision.notes;
    notes.extend(metric_notes(&features));

    EvaluationResult {
        level: decision.level,
        reported_level: reported_level(decision.level, report),
        base_level: rubric.base_level,
        decided_by: tier,
        total_score: rubric.total_score,
        scores: ScoreSummary::from(&features),
        notes,
        reason_summary: decision.reason,
        word_count: features.word_count,
        sentence_count: features.sentence_count,
        filler_rate: features.filler_rate,
        average_sentence_length: features.average_sentence_length,
        features,
    }
}

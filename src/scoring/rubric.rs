use serde::Serialize;

use super::features::{clamp01, FeatureSet};
use crate::level::Level;
use crate::settings::{LevelThreshold, Rubric};

/// Weighted rubric total with each term kept for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RubricScore {
    pub cohesion_score: f64,
    pub volume_score: f64,

    pub fluency_contribution: f64,
    pub completion_contribution: f64,
    pub cohesion_contribution: f64,
    pub lexical_contribution: f64,
    pub grammar_contribution: f64,
    pub volume_contribution: f64,

    pub repetition_deduction: f64,
    pub long_sentence_deduction: f64,

    pub total_score: f64,
    pub base_level: Level,
}

impl RubricScore {
    pub fn weighted_sum(&self) -> f64 {
        self.fluency_contribution
            + self.completion_contribution
            + self.cohesion_contribution
            + self.lexical_contribution
            + self.grammar_contribution
            + self.volume_contribution
    }

    pub fn deductions(&self) -> f64 {
        self.repetition_deduction + self.long_sentence_deduction
    }
}

pub fn cohesion_score(features: &FeatureSet, rubric: &Rubric) -> f64 {
    clamp01(
        features.sentence_complexity * rubric.cohesion.complexity
            + features.continuity_score * rubric.cohesion.continuity,
    )
}

pub fn volume_score(features: &FeatureSet, rubric: &Rubric) -> f64 {
    let v = &rubric.volume;
    clamp01(
        v.word_share * (features.word_count as f64 / v.target_words)
            + v.sentence_share * (features.sentence_count as f64 / v.target_sentences),
    )
}

pub fn score_features(features: &FeatureSet, rubric: &Rubric) -> RubricScore {
    let w = &rubric.weights;
    let p = &rubric.penalties;

    let cohesion_score = cohesion_score(features, rubric);
    let volume_score = volume_score(features, rubric);

    let long_sentence_deduction = if features.average_sentence_length > p.long_sentence_words {
        p.long_sentence
    } else {
        0.0
    };

    let mut score = RubricScore {
        cohesion_score,
        volume_score,
        fluency_contribution: w.fluency * features.fluency_score,
        completion_contribution: w.completion * features.sentence_completion_rate,
        cohesion_contribution: w.cohesion * cohesion_score,
        lexical_contribution: w.lexical_variety * features.lexical_variety,
        grammar_contribution: w.grammar * features.grammar_accuracy,
        volume_contribution: w.volume * volume_score,
        repetition_deduction: p.repetition * features.repetition_penalty,
        long_sentence_deduction,
        ..Default::default()
    };

    score.total_score = clamp01(score.weighted_sum() - score.deductions());
    score.base_level = level_for_score(score.total_score, &rubric.thresholds);
    score
}

/// Highest threshold the score meets decides the level; entry order in the
/// table does not matter.
pub fn level_for_score(score: f64, thresholds: &[LevelThreshold]) -> Level {
    thresholds
        .iter()
        .filter(|t| score >= t.min_score)
        .max_by(|a, b| {
            a.min_score
                .total_cmp(&b.min_score)
                .then_with(|| a.level.cmp(&b.level))
        })
        .map(|t| t.level)
        .unwrap_or(Level::LOWEST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn rubric() -> Rubric {
        Settings::default().rubric
    }

    #[test]
    fn test_threshold_boundaries() {
        let t = rubric().thresholds;
        assert_eq!(level_for_score(0.0, &t), Level::Nl);
        assert_eq!(level_for_score(0.2399, &t), Level::Nl);
        assert_eq!(level_for_score(0.24, &t), Level::Nm);
        assert_eq!(level_for_score(0.42, &t), Level::Nh);
        assert_eq!(level_for_score(0.56, &t), Level::Il);
        assert_eq!(level_for_score(0.6599, &t), Level::Il);
        assert_eq!(level_for_score(0.66, &t), Level::Im1);
        assert_eq!(level_for_score(0.80, &t), Level::Im2);
        assert_eq!(level_for_score(0.85, &t), Level::Im3);
        assert_eq!(level_for_score(0.90, &t), Level::Ih);
        assert_eq!(level_for_score(0.95, &t), Level::Al);
        assert_eq!(level_for_score(1.0, &t), Level::Al);
    }

    #[test]
    fn test_threshold_table_order_does_not_matter() {
        let mut t = rubric().thresholds;
        t.reverse();
        assert_eq!(level_for_score(0.7, &t), Level::Im1);
        assert_eq!(level_for_score(0.1, &t), Level::Nl);
        assert_eq!(level_for_score(0.97, &t), Level::Al);
    }

    #[test]
    fn test_stricter_table_changes_only_mapping() {
        let mut r = rubric();
        for entry in r.thresholds.iter_mut() {
            entry.min_score = (entry.min_score + 0.05).min(1.0);
        }
        assert_eq!(level_for_score(0.6, &r.thresholds), Level::Nh);
        assert_eq!(level_for_score(0.6, &rubric().thresholds), Level::Il);
    }

    #[test]
    fn test_zero_features_score_zero_ish() {
        let features = FeatureSet::default();
        let score = score_features(&features, &rubric());
        assert_eq!(score.total_score, 0.0);
        assert_eq!(score.base_level, Level::Nl);
    }

    #[test]
    fn test_perfect_features_score_full_weight_budget() {
        let features = FeatureSet {
            word_count: 200,
            sentence_count: 10,
            average_sentence_length: 15.0,
            fluency_score: 1.0,
            sentence_completion_rate: 1.0,
            sentence_complexity: 1.0,
            continuity_score: 1.0,
            lexical_variety: 1.0,
            grammar_accuracy: 1.0,
            ..Default::default()
        };
        let r = rubric();
        let score = score_features(&features, &r);
        assert!((score.total_score - r.weights.sum()).abs() < 1e-9);
        assert_eq!(
            score.base_level,
            level_for_score(r.weights.sum(), &r.thresholds)
        );
        // The built-in weights leave 0.06 for the repetition penalty, so the
        // rubric alone tops out at IH; AL comes from the advanced rules.
        assert_eq!(score.base_level, Level::Ih);
    }

    #[test]
    fn test_penalties_reduce_total() {
        let features = FeatureSet {
            word_count: 90,
            sentence_count: 4,
            average_sentence_length: 22.5,
            fluency_score: 0.8,
            sentence_completion_rate: 0.75,
            sentence_complexity: 0.6,
            continuity_score: 0.5,
            lexical_variety: 0.5,
            grammar_accuracy: 0.7,
            repetition_penalty: 0.5,
            ..Default::default()
        };
        let score = score_features(&features, &rubric());
        assert!((score.long_sentence_deduction - 0.03).abs() < 1e-12);
        assert!((score.repetition_deduction - 0.03).abs() < 1e-12);
        assert!(
            (score.total_score - (score.weighted_sum() - score.deductions())).abs() < 1e-12
        );
    }

    #[test]
    fn test_volume_score_saturates() {
        let features = FeatureSet {
            word_count: 1000,
            sentence_count: 50,
            ..Default::default()
        };
        assert_eq!(volume_score(&features, &rubric()), 1.0);
    }
}

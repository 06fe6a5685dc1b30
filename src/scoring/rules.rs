use serde::Serialize;
use strum::Display;

use super::features::FeatureSet;
use crate::level::{Band, Level};

pub const NL_MAX_COMPLETION: f64 = 0.25;
pub const NL_MAX_AVERAGE_LENGTH: f64 = 3.5;
pub const NL_MAX_SENTENCES: usize = 2;
pub const NL_MAX_WORDS: usize = 15;

pub const NM_SHORT_SENTENCE_MIN: f64 = 3.0;
pub const NM_SHORT_SENTENCE_MAX: f64 = 6.0;
pub const NM_MAX_LEXICAL_VARIETY: f64 = 0.35;
pub const NM_MAX_COMPLETION: f64 = 0.45;
pub const NM_MIN_FILLER_RATE: f64 = 0.15;
pub const NM_REQUIRED_SIGNALS: usize = 3;

pub const NH_MIN_COMPLETION: f64 = 0.5;
pub const NH_MIN_WORDS: usize = 40;
pub const NH_MIN_SENTENCES: usize = 3;
pub const NH_MIN_LEXICAL_VARIETY: f64 = 0.38;

pub const ADV_MIN_SENTENCES: usize = 5;
pub const ADV_MIN_AVERAGE_LENGTH: f64 = 10.0;
pub const ADV_MIN_FLUENCY: f64 = 0.55;
pub const ADV_MIN_CONTINUITY: f64 = 0.5;
pub const ADV_MIN_COMPLEXITY: f64 = 0.6;
pub const ADV_MIN_EXPANDED_LENGTH: f64 = 12.0;
pub const ADV_MIN_LEXICAL_VARIETY: f64 = 0.6;

pub const AL_MIN_SENTENCES: usize = 6;
pub const AL_MIN_CONNECTOR_DENSITY: f64 = 0.45;
pub const AL_MIN_CONTINUITY: f64 = 0.58;
pub const AL_MIN_TIME_MARKERS: usize = 2;
pub const AL_MIN_NARRATION_WORDS: usize = 140;
pub const AL_MIN_GRAMMAR: f64 = 0.72;
pub const AL_MIN_LEXICAL_VARIETY: f64 = 0.64;
pub const AL_MIN_FLUENCY: f64 = 0.62;
pub const AL_MIN_WORDS: usize = 160;

pub const INT_MIN_COMPLETION: f64 = 0.5;
pub const IL_MAX_AVERAGE_LENGTH: f64 = 7.0;
pub const IL_MIN_CONNECTOR_DENSITY: f64 = 0.22;
pub const IL_MIN_LEXICAL_VARIETY: f64 = 0.42;
pub const IL_MAX_FILLER_RATE: f64 = 0.18;

pub const IM3_MIN_WORDS: usize = 110;
pub const IM3_MIN_SENTENCES: usize = 5;
pub const IM3_MIN_CONNECTOR_DENSITY: f64 = 0.4;
pub const IM3_MIN_CONTINUITY: f64 = 0.55;
pub const IM3_MIN_LEXICAL_VARIETY: f64 = 0.52;
pub const IM3_MIN_GRAMMAR: f64 = 0.6;
pub const IM3_MIN_FLUENCY: f64 = 0.6;

pub const IM2_MIN_WORDS: usize = 80;
pub const IM2_MIN_SENTENCES: usize = 4;
pub const IM2_MIN_CONNECTOR_DENSITY: f64 = 0.32;
pub const IM2_MIN_CONTINUITY: f64 = 0.48;
pub const IM2_MIN_LEXICAL_VARIETY: f64 = 0.48;
pub const IM2_MIN_COMPLEXITY: f64 = 0.52;
pub const IM2_MIN_FLUENCY: f64 = 0.55;

pub const IM1_MIN_WORDS: usize = 60;
pub const IM1_MIN_SENTENCES: usize = 3;
pub const IM1_MIN_CONNECTOR_DENSITY: f64 = 0.24;
pub const IM1_MIN_COMPLEXITY: f64 = 0.44;
pub const IM1_MIN_FLUENCY: f64 = 0.5;
pub const IM1_MIN_LEXICAL_VARIETY: f64 = 0.44;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTier {
    #[strum(serialize = "novice")]
    Novice,
    #[strum(serialize = "advanced")]
    Advanced,
    #[strum(serialize = "intermediate")]
    Intermediate,
}

/// Tiers in the order they are tried; the first accepted decision wins.
pub const TIER_PRIORITY: [RuleTier; 3] =
    [RuleTier::Novice, RuleTier::Advanced, RuleTier::Intermediate];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum VolumeBand {
    #[strum(serialize = "low")]
    Low,
    #[strum(serialize = "mid")]
    Mid,
    #[strum(serialize = "high")]
    High,
}

impl VolumeBand {
    pub fn from_words(words: usize) -> Self {
        match words {
            0..=49 => Self::Low,
            50..=150 => Self::Mid,
            _ => Self::High,
        }
    }

    pub fn from_sentences(sentences: usize) -> Self {
        match sentences {
            0..=2 => Self::Low,
            3..=6 => Self::Mid,
            _ => Self::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StructureBand {
    #[strum(serialize = "simple")]
    Simple,
    #[strum(serialize = "compound")]
    Compound,
    #[strum(serialize = "complex")]
    Complex,
}

impl StructureBand {
    pub const COMPLEX_THRESHOLD: f64 = 0.58;
    pub const COMPOUND_THRESHOLD: f64 = 0.48;

    pub fn from_complexity(complexity: f64) -> Self {
        if complexity >= Self::COMPLEX_THRESHOLD {
            Self::Complex
        } else if complexity >= Self::COMPOUND_THRESHOLD {
            Self::Compound
        } else {
            Self::Simple
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelDecision {
    pub level: Level,
    pub notes: Vec<String>,
    pub reason: String,
}

impl LevelDecision {
    fn new(level: Level, notes: Vec<String>, reason: impl Into<String>) -> Self {
        Self {
            level,
            notes,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub tier: Option<RuleTier>,
    pub decision: LevelDecision,
}

/// What a single tier produced, and whether precedence let it through.
#[derive(Debug, Clone, PartialEq)]
pub struct TierOutcome {
    pub tier: RuleTier,
    pub decision: Option<LevelDecision>,
    pub accepted: bool,
}

impl RuleTier {
    pub fn check(self, features: &FeatureSet, base_level: Level) -> Option<LevelDecision> {
        match self {
            Self::Novice => novice_check(features),
            Self::Advanced => advanced_check(features),
            Self::Intermediate => Some(intermediate_check(features, base_level)),
        }
    }

    /// Intermediate decisions only refine the rubric: they must land in the
    /// intermediate band or outrank the base level.
    pub fn accepts(self, decision: &LevelDecision, base_level: Level) -> bool {
        match self {
            Self::Novice | Self::Advanced => true,
            Self::Intermediate => {
                decision.level.band() == Band::Intermediate
                    || decision.level.outranks(base_level)
            }
        }
    }
}

pub fn resolve(features: &FeatureSet, base_level: Level) -> Resolution {
    TIER_PRIORITY
        .iter()
        .find_map(|&tier| {
            tier.check(features, base_level)
                .filter(|decision| tier.accepts(decision, base_level))
                .map(|decision| Resolution {
                    tier: Some(tier),
                    decision,
                })
        })
        .unwrap_or_else(|| Resolution {
            tier: None,
            decision: rubric_decision(base_level),
        })
}

/// Every tier's raw result, regardless of precedence short-circuiting.
pub fn tier_outcomes(features: &FeatureSet, base_level: Level) -> Vec<TierOutcome> {
    let winner = resolve(features, base_level).tier;
    TIER_PRIORITY
        .iter()
        .map(|&tier| TierOutcome {
            tier,
            decision: tier.check(features, base_level),
            accepted: winner == Some(tier),
        })
        .collect()
}

/// The rubric's own verdict, used when no tier decides.
pub fn rubric_decision(base_level: Level) -> LevelDecision {
    let reason = format!("Weighted features place this response at {base_level}.");
    LevelDecision::new(base_level, vec![reason.clone()], reason)
}

pub fn novice_check(f: &FeatureSet) -> Option<LevelDecision> {
    let no_complete_sentences = f.sentence_completion_rate < NL_MAX_COMPLETION;
    let mostly_isolated = f.average_sentence_length <= NL_MAX_AVERAGE_LENGTH
        && f.sentence_count <= NL_MAX_SENTENCES;
    let extremely_limited = f.word_count < NL_MAX_WORDS;

    if no_complete_sentences && mostly_isolated && extremely_limited {
        return Some(LevelDecision::new(
            Level::Nl,
            vec![
                "Almost no complete sentences; the response is mostly isolated words.".into(),
                format!(
                    "Fewer than {NL_MAX_WORDS} words, so the message does not carry through."
                ),
            ],
            "Output stays at the word-list stage, rated NL.",
        ));
    }

    let short_sentences = f.average_sentence_length > NM_SHORT_SENTENCE_MIN
        && f.average_sentence_length <= NM_SHORT_SENTENCE_MAX;
    let memorized_feel = f.lexical_variety < NM_MAX_LEXICAL_VARIETY;
    let spontaneity_limited = f.sentence_completion_rate < NM_MAX_COMPLETION;
    let hesitation_dominant = f.filler_rate > NM_MIN_FILLER_RATE;

    let signals = [
        short_sentences,
        memorized_feel,
        spontaneity_limited,
        hesitation_dominant,
    ];
    if signals.iter().filter(|&&s| s).count() >= NM_REQUIRED_SIGNALS {
        let mut notes =
            vec!["Speech leans on short memorized patterns and breaks down often.".to_string()];
        if short_sentences {
            notes.push(format!(
                "Sentences are short and template-like (about {:.1} words each).",
                f.average_sentence_length
            ));
        }
        if memorized_feel {
            notes.push("Vocabulary range is narrow; the same words keep coming back.".into());
        }
        if spontaneity_limited {
            notes.push(
                "Few complete sentences; speech is mostly isolated words or fragments.".into(),
            );
        }
        if hesitation_dominant {
            notes.push(format!(
                "Fillers and hesitation interrupt the delivery ({:.0}% fillers).",
                f.filler_rate * 100.0
            ));
        }
        return Some(LevelDecision::new(
            Level::Nm,
            notes,
            "Short template sentences and frequent hesitation, rated NM.",
        ));
    }

    let predictable_sentences = f.sentence_completion_rate >= NH_MIN_COMPLETION;
    let handles_basics = f.word_count >= NH_MIN_WORDS && f.sentence_count >= NH_MIN_SENTENCES;
    let beyond_memorized = f.lexical_variety >= NH_MIN_LEXICAL_VARIETY;
    // Above the intermediate word floor the intermediate and advanced tiers decide.
    let novice_volume = VolumeBand::from_words(f.word_count) == VolumeBand::Low;

    if predictable_sentences && handles_basics && beyond_memorized && novice_volume {
        return Some(LevelDecision::new(
            Level::Nh,
            vec![
                "Short but complete sentences were detected.".into(),
                "Enough words and sentences to cover basic functions.".into(),
            ],
            "Able to string basic sentences together, rated NH.",
        ));
    }

    None
}

pub fn advanced_check(f: &FeatureSet) -> Option<LevelDecision> {
    let coherent_multi_sentence = f.sentence_count >= ADV_MIN_SENTENCES
        && f.average_sentence_length >= ADV_MIN_AVERAGE_LENGTH
        && f.fluency_score >= ADV_MIN_FLUENCY
        && f.continuity_score >= ADV_MIN_CONTINUITY;
    let expanded_sentences = f.sentence_complexity >= ADV_MIN_COMPLEXITY
        && f.average_sentence_length >= ADV_MIN_EXPANDED_LENGTH;
    let solid_vocabulary = f.lexical_variety >= ADV_MIN_LEXICAL_VARIETY;

    if !(coherent_multi_sentence && expanded_sentences && solid_vocabulary) {
        return None;
    }

    let mut notes = vec![
        "Links multiple sentences into connected discourse that expands the topic.".to_string(),
        "Long sentences keep varied vocabulary and complex clauses.".to_string(),
    ];

    let connected_discourse = f.sentence_count >= AL_MIN_SENTENCES
        && f.connector_density >= AL_MIN_CONNECTOR_DENSITY
        && f.continuity_score >= AL_MIN_CONTINUITY;
    let narrates_across_time =
        f.time_marker_hits >= AL_MIN_TIME_MARKERS && f.word_count >= AL_MIN_NARRATION_WORDS;
    let high_control = f.grammar_accuracy >= AL_MIN_GRAMMAR
        && f.lexical_variety >= AL_MIN_LEXICAL_VARIETY
        && f.fluency_score >= AL_MIN_FLUENCY
        && f.word_count >= AL_MIN_WORDS;

    if connected_discourse && narrates_across_time && high_control {
        notes.push(format!(
            "Time-framed narration ({} time markers) and connectors flow naturally \
             over an ample response.",
            f.time_marker_hits
        ));
        notes.push("Grammar and vocabulary stay under control in long, complex sentences.".into());
        return Some(LevelDecision::new(
            Level::Al,
            notes,
            "Ample, well-connected and accurate speech, rated AL.",
        ));
    }

    Some(LevelDecision::new(
        Level::Ih,
        notes,
        "Expands the topic across linked sentences, rated IH.",
    ))
}

pub fn intermediate_check(f: &FeatureSet, fallback: Level) -> LevelDecision {
    let word_band = VolumeBand::from_words(f.word_count);
    let sentence_band = VolumeBand::from_sentences(f.sentence_count);
    let structure_band = StructureBand::from_complexity(f.sentence_complexity);
    let has_time_shift = f.has_time_shift();

    let meets_floor = f.sentence_completion_rate >= INT_MIN_COMPLETION
        && word_band != VolumeBand::Low
        && sentence_band != VolumeBand::Low;

    if !meets_floor {
        return LevelDecision::new(
            fallback,
            vec![
                "Response length is too limited (few words, few sentences or incomplete \
                 sentences) to place within the intermediate band."
                    .into(),
            ],
            "Limited volume and sentence completion; keeping the computed level.",
        );
    }

    let simple_delivery = f.average_sentence_length < IL_MAX_AVERAGE_LENGTH
        || f.connector_density < IL_MIN_CONNECTOR_DENSITY
        || f.lexical_variety < IL_MIN_LEXICAL_VARIETY
        || f.filler_rate > IL_MAX_FILLER_RATE;

    if simple_delivery {
        return LevelDecision::new(
            Level::Il,
            vec![
                "Mostly short, simple sentences listed one after another; \
                 links between ideas are weak."
                    .into(),
                "Adding basic connectors and tense markers would lift the level quickly.".into(),
            ],
            "Weak connection and limited vocabulary place this at IL.",
        );
    }

    let im3_candidate = f.word_count >= IM3_MIN_WORDS
        && f.sentence_count >= IM3_MIN_SENTENCES
        && structure_band != StructureBand::Simple
        && f.connector_density >= IM3_MIN_CONNECTOR_DENSITY
        && f.continuity_score >= IM3_MIN_CONTINUITY
        && f.lexical_variety >= IM3_MIN_LEXICAL_VARIETY
        && f.grammar_accuracy >= IM3_MIN_GRAMMAR
        && f.fluency_score >= IM3_MIN_FLUENCY
        && has_time_shift;

    if im3_candidate {
        return LevelDecision::new(
            Level::Im3,
            vec![
                "Uses connectors and time expressions to build stable paragraph-length answers."
                    .into(),
                "Vocabulary range and fluency are upper-intermediate or better.".into(),
            ],
            "Paragraph-length discourse with solid connection, rated IM3.",
        );
    }

    let im2_candidate = f.word_count >= IM2_MIN_WORDS
        && f.sentence_count >= IM2_MIN_SENTENCES
        && f.connector_density >= IM2_MIN_CONNECTOR_DENSITY
        && f.continuity_score >= IM2_MIN_CONTINUITY
        && f.lexical_variety >= IM2_MIN_LEXICAL_VARIETY
        && f.sentence_complexity >= IM2_MIN_COMPLEXITY
        && f.fluency_score >= IM2_MIN_FLUENCY
        && has_time_shift;

    if im2_candidate {
        return LevelDecision::new(
            Level::Im2,
            vec![
                "Uses basic connectors and tense shifts to expand the content.".into(),
                "Complete sentences and fluency are held steadily.".into(),
            ],
            "Connectors and tense shifts blend in naturally, rated IM2.",
        );
    }

    let im1_candidate = f.word_count >= IM1_MIN_WORDS
        && f.sentence_count >= IM1_MIN_SENTENCES
        && f.connector_density >= IM1_MIN_CONNECTOR_DENSITY
        && f.sentence_complexity >= IM1_MIN_COMPLEXITY
        && f.fluency_score >= IM1_MIN_FLUENCY
        && f.lexical_variety >= IM1_MIN_LEXICAL_VARIETY;

    if im1_candidate {
        return LevelDecision::new(
            Level::Im1,
            vec![
                "Builds short paragraphs that introduce a topic and describe it simply.".into(),
                "The share of complete sentences meets the intermediate bar.".into(),
            ],
            "Can introduce a topic and describe it simply, rated IM1.",
        );
    }

    LevelDecision::new(
        fallback,
        vec!["Intermediate band criteria agree with the computed level.".into()],
        "The computed score matches the intermediate criteria; keeping the base level.",
    )
}

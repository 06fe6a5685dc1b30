use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::level::Level;
use crate::scoring::lexicon::{
    DEFAULT_CONNECTORS, DEFAULT_FILLERS, DEFAULT_SUBJECTS, DEFAULT_TIME_MARKERS,
    DEFAULT_VERB_STEMS,
};

static SETTINGS: OnceLock<Settings> = OnceLock::new();

pub const DEFAULT_SETTINGS_PATH: &str = "settings.default.ron";
pub const OVERRIDE_SETTINGS_PATH: &str = "settings.ron";
pub const SETTINGS_PATH_ENV: &str = "OPIC_SETTINGS";

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub rubric: Rubric,
    pub lexicon: Lexicon,
    pub report: Report,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub weights: RubricWeights,
    pub penalties: RubricPenalties,
    pub cohesion: CohesionBlend,
    pub volume: VolumeTargets,
    pub thresholds: Vec<LevelThreshold>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricWeights {
    pub fluency: f64,
    pub completion: f64,
    pub cohesion: f64,
    pub lexical_variety: f64,
    pub grammar: f64,
    pub volume: f64,
}

impl RubricWeights {
    pub fn sum(&self) -> f64 {
        self.fluency
            + self.completion
            + self.cohesion
            + self.lexical_variety
            + self.grammar
            + self.volume
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricPenalties {
    pub repetition: f64,
    pub long_sentence: f64,
    pub long_sentence_words: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohesionBlend {
    pub complexity: f64,
    pub continuity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeTargets {
    pub target_words: f64,
    pub target_sentences: f64,
    pub word_share: f64,
    pub sentence_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelThreshold {
    pub min_score: f64,
    pub level: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    pub fillers: Vec<String>,
    pub subjects: Vec<String>,
    pub verb_stems: Vec<String>,
    pub connectors: Vec<String>,
    pub time_markers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub collapse_novice_band: bool,
}

fn word_list(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn threshold(min_score: f64, level: Level) -> LevelThreshold {
    LevelThreshold { min_score, level }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rubric: Rubric {
                weights: RubricWeights {
                    fluency: 0.16,
                    completion: 0.22,
                    cohesion: 0.20,
                    lexical_variety: 0.18,
                    grammar: 0.12,
                    volume: 0.06,
                },
                penalties: RubricPenalties {
                    repetition: 0.06,
                    long_sentence: 0.03,
                    long_sentence_words: 18.0,
                },
                cohesion: CohesionBlend {
                    complexity: 0.55,
                    continuity: 0.45,
                },
                volume: VolumeTargets {
                    target_words: 180.0,
                    target_sentences: 8.0,
                    word_share: 0.7,
                    sentence_share: 0.3,
                },
                thresholds: vec![
                    threshold(0.95, Level::Al),
                    threshold(0.90, Level::Ih),
                    threshold(0.85, Level::Im3),
                    threshold(0.80, Level::Im2),
                    threshold(0.66, Level::Im1),
                    threshold(0.56, Level::Il),
                    threshold(0.42, Level::Nh),
                    threshold(0.24, Level::Nm),
                ],
            },
            lexicon: Lexicon {
                fillers: word_list(DEFAULT_FILLERS),
                subjects: word_list(DEFAULT_SUBJECTS),
                verb_stems: word_list(DEFAULT_VERB_STEMS),
                connectors: word_list(DEFAULT_CONNECTORS),
                time_markers: word_list(DEFAULT_TIME_MARKERS),
            },
            report: Report {
                collapse_novice_band: false,
            },
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(Self::load_from_files)
    }

    pub fn from_ron_str(content: &str) -> Result<Settings> {
        let settings: Settings = ron::from_str(content).context("invalid settings RON")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_ron_str(&content)
            .with_context(|| format!("failed to load settings from {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let weights = &self.rubric.weights;
        let sum = weights.sum();
        // The positive weights may leave room for the penalties; they must
        // not exceed the [0, 1] score range on their own.
        ensure!(
            sum > 0.0 && sum <= 1.0 + WEIGHT_SUM_TOLERANCE,
            "rubric weights must sum to at most 1.0 (got {sum:.4})"
        );
        for (name, weight) in [
            ("fluency", weights.fluency),
            ("completion", weights.completion),
            ("cohesion", weights.cohesion),
            ("lexical_variety", weights.lexical_variety),
            ("grammar", weights.grammar),
            ("volume", weights.volume),
        ] {
            ensure!(weight >= 0.0, "rubric weight '{name}' is negative");
        }

        ensure!(
            !self.rubric.thresholds.is_empty(),
            "rubric threshold table is empty"
        );
        for entry in &self.rubric.thresholds {
            ensure!(
                (0.0..=1.0).contains(&entry.min_score),
                "threshold for {} is outside [0, 1] ({})",
                entry.level,
                entry.min_score
            );
        }

        let volume = &self.rubric.volume;
        ensure!(
            volume.target_words > 0.0 && volume.target_sentences > 0.0,
            "volume targets must be positive"
        );
        ensure!(
            self.rubric.penalties.long_sentence_words > 0.0,
            "long sentence length must be positive"
        );

        let lexicon = &self.lexicon;
        for (name, list) in [
            ("fillers", &lexicon.fillers),
            ("subjects", &lexicon.subjects),
            ("verb_stems", &lexicon.verb_stems),
            ("connectors", &lexicon.connectors),
            ("time_markers", &lexicon.time_markers),
        ] {
            ensure!(!list.is_empty(), "lexicon list '{name}' is empty");
            ensure!(
                list.iter().all(|w| !w.trim().is_empty()),
                "lexicon list '{name}' contains a blank entry"
            );
        }

        Ok(())
    }

    fn load_from_files() -> Settings {
        let mut settings = Settings::default();

        let mut layers: Vec<String> = vec![
            DEFAULT_SETTINGS_PATH.to_string(),
            OVERRIDE_SETTINGS_PATH.to_string(),
        ];
        if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
            layers.push(path);
        }

        for layer in layers {
            let path = Path::new(&layer);
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(path) {
                Ok(loaded) => settings = loaded,
                Err(e) => tracing::warn!("skipping settings layer {}: {e:#}", path.display()),
            }
        }

        settings
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}

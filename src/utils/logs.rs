use console::{measure_text_width, Style};

use crate::level::{Band, Level};
use crate::scoring::{EvaluationResult, FeatureSet, RubricScore, TierOutcome, Transcript};

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;
const PREVIEW_CHARS: usize = 60;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn branch_for(index: usize, count: usize) -> String {
    if index + 1 == count {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

pub fn level_style(level: Level) -> Style {
    match level.band() {
        Band::Novice => red().bold(),
        Band::Intermediate => yellow().bold(),
        Band::Advanced => green().bold(),
    }
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn format_signed(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "-" };
    format!("{}{:.3}", dim().apply_to(sign), value.abs())
}

pub fn format_percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

fn score_style(value: f64) -> Style {
    if value >= 0.7 {
        green()
    } else if value >= 0.4 {
        yellow()
    } else {
        red()
    }
}

fn format_score(value: f64) -> String {
    score_style(value).apply_to(format_percent(value)).to_string()
}

pub fn preview(text: &str) -> String {
    let text = text.replace(['\n', '\r'], " ");
    if text.chars().count() > PREVIEW_CHARS {
        format!(
            "{}...",
            text.chars().take(PREVIEW_CHARS - 3).collect::<String>()
        )
    } else {
        text
    }
}

pub fn log_header(title: &str) {
    println!("{}", bold().apply_to(title.to_uppercase()));
}

pub fn log_newline() {
    println!();
}

pub fn log_dimmed(message: &str) {
    println!("{}", dim().apply_to(message));
}

pub fn log_generic_error(prefix: &str, message: &str) {
    eprintln!("{} {}", red().apply_to(prefix), message);
}

fn tree_row(branch: String, label: &str, depth: usize, value: impl std::fmt::Display) -> String {
    format!("{}{}{}", branch, pad_label(label, depth), value)
}

pub fn log_transcript_stats(transcript: &Transcript) {
    println!(
        "{}",
        tree_row(tree_branch(), "normalized", 1, dim().apply_to(preview(&transcript.normalized)))
    );
    println!(
        "{}",
        tree_row(tree_branch(), "sentences", 1, bold().apply_to(transcript.sentence_count()))
    );
    let count = transcript.sentences.len();
    for (i, sentence) in transcript.sentences.iter().enumerate() {
        println!(
            "{}{}{}",
            tree_indent(),
            branch_for(i, count),
            dim().apply_to(preview(sentence))
        );
    }
    println!(
        "{}",
        tree_row(tree_end(), "tokens", 1, bold().apply_to(transcript.word_count()))
    );
}

pub fn log_features(f: &FeatureSet) {
    let rows: Vec<(&str, String)> = vec![
        ("words", f.word_count.to_string()),
        ("sentences", f.sentence_count.to_string()),
        ("avg sentence length", format!("{:.1}", f.average_sentence_length)),
        (
            "filler rate",
            format!("{:.1}% ({} fillers)", f.filler_rate * 100.0, f.filler_count),
        ),
        ("fluency", format_score(f.fluency_score)),
        (
            "completion",
            format!(
                "{} ({}/{})",
                format_score(f.sentence_completion_rate),
                f.complete_sentence_count,
                f.sentence_count
            ),
        ),
        (
            "connector density",
            format!("{} ({} connectors)", format_score(f.connector_density), f.connector_count),
        ),
        ("time markers", f.time_marker_hits.to_string()),
        ("complexity", format_score(f.sentence_complexity)),
        ("continuity", format_score(f.continuity_score)),
        (
            "lexical variety",
            format!("{} ({} unique)", format_score(f.lexical_variety), f.unique_word_count),
        ),
        ("grammar", format_score(f.grammar_accuracy)),
        ("repetition penalty", format_percent(f.repetition_penalty)),
    ];

    let count = rows.len();
    for (i, (label, value)) in rows.into_iter().enumerate() {
        println!("{}", tree_row(branch_for(i, count), label, 1, value));
    }
}

pub fn log_rubric(score: &RubricScore) {
    println!("{}{}", tree_branch(), pad_label("contributions", 1));
    let contributions = [
        ("fluency", score.fluency_contribution),
        ("completion", score.completion_contribution),
        ("cohesion", score.cohesion_contribution),
        ("lexical variety", score.lexical_contribution),
        ("grammar", score.grammar_contribution),
        ("volume", score.volume_contribution),
    ];
    for (i, (label, value)) in contributions.iter().enumerate() {
        println!(
            "{}{}",
            tree_indent(),
            tree_row(branch_for(i, contributions.len()), label, 2, format_signed(*value))
        );
    }

    println!("{}{}", tree_branch(), pad_label("deductions", 1));
    println!(
        "{}{}",
        tree_indent(),
        tree_row(tree_branch(), "repetition", 2, format_signed(-score.repetition_deduction))
    );
    println!(
        "{}{}",
        tree_indent(),
        tree_row(tree_end(), "long sentences", 2, format_signed(-score.long_sentence_deduction))
    );

    println!(
        "{}",
        tree_row(tree_branch(), "total", 1, bold().apply_to(format!("{:.3}", score.total_score)))
    );
    println!(
        "{}",
        tree_row(
            tree_end(),
            "base level",
            1,
            level_style(score.base_level).apply_to(score.base_level)
        )
    );
}

pub fn log_tiers(outcomes: &[TierOutcome]) {
    let count = outcomes.len();
    for (i, outcome) in outcomes.iter().enumerate() {
        let value = match (&outcome.decision, outcome.accepted) {
            (Some(decision), true) => format!(
                "{} {}",
                level_style(decision.level).apply_to(decision.level),
                green().apply_to("(applied)")
            ),
            (Some(decision), false) => format!(
                "{} {}",
                dim().apply_to(decision.level),
                dim().apply_to("(not applied)")
            ),
            (None, _) => dim().apply_to("declined").to_string(),
        };
        println!(
            "{}",
            tree_row(branch_for(i, count), &outcome.tier.to_string(), 1, value)
        );
    }
}

/// Compact result view used by the main binary.
#[derive(Debug, Clone)]
pub struct TranscriptAssessment<'a> {
    pub source: String,
    pub result: &'a EvaluationResult,
    pub target: Option<Level>,
}

impl<'a> TranscriptAssessment<'a> {
    pub fn new(source: impl Into<String>, result: &'a EvaluationResult) -> Self {
        Self {
            source: source.into(),
            result,
            target: None,
        }
    }

    pub fn with_target(mut self, target: Option<Level>) -> Self {
        self.target = target;
        self
    }

    pub fn render(&self) -> String {
        let r = self.result;
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!(
            "{} {}",
            cyan().apply_to(bold().apply_to("[TRANSCRIPT]")),
            dim().apply_to(preview(&self.source))
        ));

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("LEVEL")));
        lines.push(tree_row(
            tree_branch(),
            "level",
            1,
            level_style(r.reported_level).apply_to(r.reported_level),
        ));
        if r.reported_level != r.level {
            lines.push(tree_row(tree_branch(), "assessed", 1, dim().apply_to(r.level)));
        }
        lines.push(tree_row(
            tree_branch(),
            "score",
            1,
            bold().apply_to(format!("{:.2}", r.total_score)),
        ));
        let decided_by = r
            .decided_by
            .map(|t| format!("{t} rules"))
            .unwrap_or_else(|| "rubric".to_string());
        lines.push(tree_row(
            tree_branch(),
            "decided by",
            1,
            dim().apply_to(format!("{decided_by} (base {})", r.base_level)),
        ));
        lines.push(tree_row(
            tree_end(),
            "volume",
            1,
            dim().apply_to(format!("{} words / {} sentences", r.word_count, r.sentence_count)),
        ));

        if let Some(target) = self.target {
            lines.push(String::new());
            lines.push(format!("{}", bold().apply_to("TARGET")));
            let gap = r.compare_to_target(target);
            let gap_style = if gap >= 0 { green() } else { yellow() };
            lines.push(tree_row(tree_branch(), "target", 1, level_style(target).apply_to(target)));
            lines.push(tree_row(
                tree_end(),
                "gap",
                1,
                gap_style.apply_to(format!("{gap:+} levels")),
            ));
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("SCORES")));
        let scores = [
            ("completion", r.scores.sentence_completion_rate),
            ("complexity", r.scores.sentence_complexity),
            ("fluency", r.scores.fluency_score),
            ("lexical variety", r.scores.lexical_variety),
            ("grammar", r.scores.grammar_accuracy),
        ];
        for (i, (label, value)) in scores.iter().enumerate() {
            lines.push(tree_row(branch_for(i, scores.len()), label, 1, format_score(*value)));
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("NOTES")));
        for (i, note) in r.notes.iter().enumerate() {
            lines.push(format!("{}{}", branch_for(i, r.notes.len()), note));
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("RESULT")));
        lines.push(format!("{}{}", tree_end(), r.reason_summary));

        lines.join("\n")
    }

    pub fn print(&self) {
        println!("{}\n", self.render());
    }
}

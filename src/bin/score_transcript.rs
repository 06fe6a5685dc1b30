use opic_rater::utils::logs::level_style;
use opic_rater::utils::{
    log_dimmed, log_features, log_generic_error, log_header, log_newline, log_rubric, log_tiers,
    log_transcript_stats,
};
use opic_rater::Evaluator;
use std::env;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!("Usage: score-transcript [--file PATH | <text>]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <text>       Raw transcript text to score");
    eprintln!("  --file PATH  Read the transcript from PATH");
}

fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();

    let text = match args.first().map(String::as_str) {
        None | Some("--help") | Some("-h") => {
            print_usage();
            process::exit(1);
        }
        Some("--file") | Some("-f") => {
            let Some(path) = args.get(1) else {
                print_usage();
                process::exit(1);
            };
            match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    log_generic_error("Failed to read transcript:", &format!("{path}: {e}"));
                    process::exit(1);
                }
            }
        }
        Some(_) => args.join(" "),
    };

    let evaluator = Evaluator::shared();
    let trace = evaluator.trace(&text);

    log_header("Transcript");
    log_transcript_stats(&trace.transcript);
    log_newline();

    log_header("Features");
    log_features(&trace.features);
    log_newline();

    log_header("Rubric");
    log_rubric(&trace.rubric);
    log_newline();

    log_header("Rule tiers");
    log_tiers(&trace.tiers);
    log_newline();

    let result = &trace.result;
    log_header("Result");
    println!(
        "{} {}",
        level_style(result.level).apply_to(result.level),
        result.reason_summary
    );
    if result.reported_level != result.level {
        log_dimmed(&format!("reported as {}", result.reported_level));
    }
    for note in &result.notes {
        log_dimmed(&format!("  {note}"));
    }
}

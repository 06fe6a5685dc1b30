use anyhow::{Context, Result};
use opic_rater::utils::{log_generic_error, TranscriptAssessment};
use opic_rater::{Evaluator, Level};
use std::io::Read;
use std::path::PathBuf;
use std::{env, fs, io, process};
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const TARGET_ENV: &str = "OPIC_TARGET_LEVEL";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    json: bool,
    help: bool,
    target: Option<Level>,
    files: Vec<PathBuf>,
    text: Vec<String>,
}

fn print_usage() {
    eprintln!("Usage: opic-rater [--json] [--target LEVEL] [--file PATH]... [TEXT...]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <text>           Transcript text (read from stdin when no text or files)");
    eprintln!("  --file, -f PATH  Evaluate the transcript stored in PATH (repeatable)");
    eprintln!(
        "  --target LEVEL   Show the gap to a target level ({})",
        Level::all_codes().join(", ")
    );
    eprintln!("  --json           Print results as JSON");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {TARGET_ENV}  Default target level");
    eprintln!("  OPIC_SETTINGS      Extra RON settings file layered over settings.ron");
}

fn parse_level(raw: &str) -> Result<Level, String> {
    raw.parse::<Level>().map_err(|e| e.to_string())
}

fn parse_args<I>(args: I, env_target: Option<String>) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => cli.json = true,
            "--help" | "-h" => cli.help = true,
            "--target" | "-t" => {
                let value = args.next().ok_or("--target needs a level")?;
                cli.target = Some(parse_level(&value)?);
            }
            "--file" | "-f" => {
                let value = args.next().ok_or("--file needs a path")?;
                cli.files.push(PathBuf::from(value));
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ => cli.text.push(arg),
        }
    }

    if cli.target.is_none() {
        if let Some(raw) = env_target.filter(|v| !v.trim().is_empty()) {
            cli.target = Some(parse_level(&raw).map_err(|e| format!("{TARGET_ENV}: {e}"))?);
        }
    }

    Ok(cli)
}

/// Labeled transcripts in evaluation order.
fn collect_inputs(cli: &CliArgs) -> Result<Vec<(String, String)>> {
    let mut inputs = Vec::new();

    for path in &cli.files {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read transcript {}", path.display()))?;
        inputs.push((path.display().to_string(), text));
    }

    if !cli.text.is_empty() {
        let text = cli.text.join(" ");
        inputs.push((text.clone(), text));
    }

    if inputs.is_empty() {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read transcript from stdin")?;
        inputs.push(("<stdin>".to_string(), text));
    }

    Ok(inputs)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("opic_rater=warn".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(io::stderr)
                .compact(),
        );
    set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let cli = match parse_args(env::args().skip(1), env::var(TARGET_ENV).ok()) {
        Ok(cli) => cli,
        Err(e) => {
            log_generic_error("error:", &e);
            print_usage();
            process::exit(2);
        }
    };

    if cli.help {
        print_usage();
        return Ok(());
    }

    let evaluator = Evaluator::shared();

    for (source, text) in collect_inputs(&cli)? {
        let result = evaluator.evaluate(&text);
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            TranscriptAssessment::new(source, &result)
                .with_target(cli.target)
                .print();
        }
    }

    Ok(())
}

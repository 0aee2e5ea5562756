//! Reconstruct per-thread activity timelines from OMPT trace logs.
//!
//! # Usage
//!
//! ```bash
//! # Analyze from file
//! ompt-timeline run.log
//!
//! # Analyze from stdin
//! OMP_TOOL_LIBRARIES=./libompt_tool.so ./app | ompt-timeline
//!
//! # Several runs at once, with charts
//! ompt-timeline --chart-dir charts/ run-*.log
//! ```

use std::collections::HashSet;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rayon::prelude::*;

use ompt_timeline::config::{ReconstructConfig, WorkEndPolicy, config_source};
use ompt_timeline::error::TraceError;
use ompt_timeline::styling::{
    HINT, eprintln, format_error_chain, hint_message, print, println, success_message,
    warning_message,
};
use ompt_timeline::trace::{
    self, ChartOptions, ParsedTrace, RenderOptions, TraceAnalysis, parse_lines, read_trace,
    render_svg,
};

#[derive(Parser)]
#[command(name = "ompt-timeline")]
#[command(about = "Reconstruct thread activity timelines from OMPT trace logs", long_about = None)]
#[command(version)]
struct Cli {
    /// Trace files to analyze (reads stdin when empty or `-`)
    files: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Include the chronological event listing
    #[arg(long)]
    events: bool,

    /// Write an SVG chart per input into this directory
    #[arg(long, value_name = "DIR")]
    chart_dir: Option<PathBuf>,

    /// Config file (default: $OMPT_TIMELINE_CONFIG_PATH or the platform config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Record spans that WORK_END would otherwise drop
    #[arg(long)]
    strict_work_end: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    fn name(&self) -> String {
        match self {
            Input::Stdin => "<stdin>".to_string(),
            Input::File(path) => path.display().to_string(),
        }
    }

    /// File name for derived artifacts (charts).
    fn stem(&self) -> String {
        match self {
            Input::Stdin => "stdin".to_string(),
            Input::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "trace".to_string()),
        }
    }

    fn read(&self) -> Result<ParsedTrace, TraceError> {
        match self {
            Input::File(path) => read_trace(path),
            Input::Stdin => {
                let mut content = String::new();
                std::io::stdin()
                    .lock()
                    .read_to_string(&mut content)
                    .map_err(|source| TraceError::Read {
                        path: PathBuf::from("<stdin>"),
                        source,
                    })?;
                Ok(parse_lines(&content))
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // RUST_LOG still wins over -v
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn inputs(files: &[PathBuf]) -> Vec<Input> {
    if files.is_empty() {
        return vec![Input::Stdin];
    }
    files
        .iter()
        .map(|path| {
            if path.as_os_str() == "-" {
                Input::Stdin
            } else {
                Input::File(path.clone())
            }
        })
        .collect()
}

fn load_config(cli: &Cli) -> anyhow::Result<ReconstructConfig> {
    let source = config_source(cli.config.as_deref());
    let mut config =
        ReconstructConfig::load(source.as_ref()).context("failed to load configuration")?;
    if cli.strict_work_end {
        config.work_end = WorkEndPolicy::Strict;
    }
    log::debug!("Reconstruction settings: {config:?}");
    Ok(config)
}

/// Chart file stem per input. Repeated stems get a numeric suffix so charts
/// from `a/trace.log` and `b/trace.log` don't overwrite each other.
fn chart_stems(inputs: &[Input]) -> Vec<String> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let stem = input.stem();
            let mut candidate = stem.clone();
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{stem}-{n}");
                n += 1;
            }
            candidate
        })
        .collect()
}

fn write_chart(dir: &Path, stem: &str, analysis: &TraceAnalysis) -> Result<PathBuf, TraceError> {
    let path = dir.join(format!("{stem}.svg"));
    let svg = render_svg(
        &analysis.timeline,
        &analysis.annotations,
        &analysis.threads,
        &ChartOptions::default(),
    );
    std::fs::create_dir_all(dir)
        .and_then(|()| std::fs::write(&path, svg))
        .map_err(|source| TraceError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

fn analyze_input(
    input: &Input,
    chart_stem: &str,
    config: &ReconstructConfig,
    chart_dir: Option<&Path>,
) -> anyhow::Result<TraceAnalysis> {
    let name = input.name();
    let parsed = input.read()?;

    if parsed.events.is_empty() {
        return Err(TraceError::NoEvents { source_name: name }.into());
    }
    if parsed.skipped > 0 {
        log::info!("{name}: skipped {} OMPT lines", parsed.skipped);
    }

    let analysis = trace::analyze(name, parsed, config);

    if let Some(dir) = chart_dir {
        let path = write_chart(dir, chart_stem, &analysis)?;
        eprintln!(
            "{}",
            success_message(format!("Chart written to {}", path.display()))
        );
    }

    Ok(analysis)
}

fn print_no_events_hint() {
    eprintln!("{}", hint_message("Trace lines should look like:"));
    eprintln!("  {HINT}[OMPT] Thread 0 PARALLEL BEGIN at 12.345 ms (requested threads: 4){HINT:#}");
    eprintln!("  {HINT}[OMPT_annotation] Thread 0 Annotation at 12.300 ms: ROI_START{HINT:#}");
}

/// Returns whether every input was analyzed.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(&cli)?;
    let inputs = inputs(&cli.files);

    if inputs.iter().any(|i| matches!(i, Input::Stdin)) && std::io::stdin().is_terminal() {
        eprintln!("Usage: ompt-timeline <file>... | ompt-timeline < input");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  ompt-timeline /tmp/run.log");
        eprintln!("  ./app 2>&1 | ompt-timeline --events");
        return Ok(false);
    }

    // Each trace gets its own reconstruction; nothing is shared between them
    let stems = chart_stems(&inputs);
    let results: Vec<anyhow::Result<TraceAnalysis>> = inputs
        .par_iter()
        .zip(&stems)
        .map(|(input, stem)| analyze_input(input, stem, &config, cli.chart_dir.as_deref()))
        .collect();

    let mut analyses = Vec::new();
    let mut all_ok = true;
    for result in results {
        match result {
            Ok(analysis) => analyses.push(analysis),
            Err(err) => {
                all_ok = false;
                eprintln!("{}", format_error_chain(&err));
                if matches!(
                    err.downcast_ref::<TraceError>(),
                    Some(TraceError::NoEvents { .. })
                ) {
                    print_no_events_hint();
                }
            }
        }
    }

    match cli.format {
        OutputFormat::Text => {
            let options = RenderOptions { events: cli.events };
            for (i, analysis) in analyses.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                if analysis.timeline.regions.is_empty() {
                    eprintln!(
                        "{}",
                        warning_message(format!("{}: no parallel regions found", analysis.source))
                    );
                }
                print!("{}", trace::render(analysis, options));
            }
        }
        OutputFormat::Json => {
            let json = if let [single] = analyses.as_slice() {
                serde_json::to_string_pretty(single)?
            } else {
                serde_json::to_string_pretty(&analyses)?
            };
            println!("{json}");
        }
    }

    Ok(all_ok)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("{}", format_error_chain(&err));
            process::exit(1);
        }
    }
}

//! proppath CLI
//!
//! Evaluate a property path over an RDF file:
//! - `eval`: run a JSON-encoded path from a start node
//! - `show`: print a path in SPARQL syntax
//! - `stats`: summarize a data file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use proppath_eval::{EvalOptions, EvalStats, Evaluator, Path, PathEvent, RepetitionStrategy};
use proppath_graph::{load_path, Graph, MemGraph, Node};
use serde::Serialize;
use std::fs;
use std::path::{Path as FsPath, PathBuf};

#[derive(Parser)]
#[command(name = "proppath")]
#[command(author, version, about = "Evaluate SPARQL property paths over RDF data")]
struct Cli {
    /// Log level for diagnostics written to stderr.
    #[arg(long, value_enum, global = true, default_value = "warn")]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a path from a start node.
    Eval(EvalArgs),

    /// Print a JSON-encoded path in SPARQL property path syntax.
    Show {
        /// Path AST as JSON
        #[arg(long)]
        path: PathBuf,
    },

    /// Print triple and predicate counts for a data file.
    Stats {
        /// RDF data (.nt, .ttl, .rdf, .owl, .xml)
        #[arg(long)]
        data: PathBuf,
    },
}

#[derive(clap::Args)]
struct EvalArgs {
    /// RDF data (.nt, .ttl, .rdf, .owl, .xml)
    #[arg(long)]
    data: PathBuf,
    /// Start node in N-Triples syntax, e.g. `<http://example.org/a>`
    #[arg(long)]
    start: String,
    /// Path AST as JSON
    #[arg(long)]
    path: PathBuf,
    /// Walk from object to subject (the start node is the path's end).
    #[arg(long)]
    backward: bool,
    #[arg(long, value_enum, default_value = "core")]
    semantics: Semantics,
    /// JSON file with evaluation options; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    max_steps: Option<u64>,
    #[arg(long)]
    max_results: Option<usize>,
    /// Wrap the path in `distinct(..)`.
    #[arg(long)]
    distinct: bool,
    /// Record and print every lookup and repetition.
    #[arg(long)]
    trace: bool,
    /// Emit one JSON document instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Semantics {
    /// Arbitrary-Length-Path repetition
    Core,
    /// Deduplicating closure, forward-only negated property sets
    Legacy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct EvalReport {
    start: String,
    path: String,
    forward: bool,
    semantics: &'static str,
    results: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<EvalStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<Vec<PathEvent>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Eval(args) => cmd_eval(&args),
        Commands::Show { path } => cmd_show(&path),
        Commands::Stats { data } => cmd_stats(&data),
    }
}

fn read_path(file: &FsPath) -> Result<Path> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read path file {}", file.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid path JSON in {}", file.display()))
}

fn load_graph(file: &FsPath) -> Result<MemGraph> {
    load_path(file).with_context(|| format!("failed to load {}", file.display()))
}

/// Options file first, then flag overrides.
fn resolve_options(
    config: Option<&FsPath>,
    max_steps: Option<u64>,
    max_results: Option<usize>,
) -> Result<EvalOptions> {
    let mut options = match config {
        Some(file) => {
            let text = fs::read_to_string(file)
                .with_context(|| format!("failed to read options file {}", file.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid options in {}", file.display()))?
        }
        None => EvalOptions::default(),
    };
    if max_steps.is_some() {
        options.max_steps = max_steps;
    }
    if max_results.is_some() {
        options.max_results = max_results;
    }
    Ok(options)
}

fn cmd_eval(args: &EvalArgs) -> Result<()> {
    let graph = load_graph(&args.data)?;
    let start = Node::parse(&args.start).with_context(|| format!("invalid start node {}", args.start))?;
    let mut path = read_path(&args.path)?;
    if args.distinct {
        path = Path::distinct(path);
    }
    let options = resolve_options(args.config.as_deref(), args.max_steps, args.max_results)?;

    let report = match args.semantics {
        Semantics::Core => run_eval(Evaluator::new(&graph), &start, &path, args, options)?,
        Semantics::Legacy => run_eval(Evaluator::legacy(&graph), &start, &path, args, options)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for node in &report.results {
        println!("{node}");
    }
    if let Some(trace) = &report.trace {
        for event in trace {
            eprintln!("  {} {}", "·".cyan(), serde_json::to_string(event)?);
        }
    }
    eprintln!(
        "{} {} {} from {} ({} results, {})",
        "ok".green().bold(),
        report.path.bold(),
        if report.forward { "forward" } else { "backward" },
        report.start,
        report.results.len(),
        report.semantics
    );
    if let Some(stats) = &report.stats {
        eprintln!(
            "  {} {} lookups, {} triples scanned, {} closure expansions",
            "→".yellow(),
            stats.graph_lookups,
            stats.triples_scanned,
            stats.closure_expansions
        );
    }
    Ok(())
}

fn run_eval<G: Graph, S: RepetitionStrategy>(
    evaluator: Evaluator<G, S>,
    start: &Node,
    path: &Path,
    args: &EvalArgs,
    options: EvalOptions,
) -> Result<EvalReport> {
    let evaluator = evaluator.with_options(options);
    let forward = !args.backward;

    let (results, stats, trace) = if args.trace {
        let (out, events) = evaluator.trace(start, path, forward)?;
        (out, None, Some(events))
    } else {
        let (out, stats) = evaluator.eval_with_stats(start, path, forward)?;
        (out, Some(stats), None)
    };

    Ok(EvalReport {
        start: start.to_string(),
        path: path.to_string(),
        forward,
        semantics: evaluator.strategy().name(),
        results: results.iter().map(ToString::to_string).collect(),
        stats,
        trace,
    })
}

fn cmd_show(file: &FsPath) -> Result<()> {
    let path = read_path(file)?;
    println!("{path}");
    eprintln!("  {} depth {}", "→".yellow(), path.depth());
    Ok(())
}

fn cmd_stats(file: &FsPath) -> Result<()> {
    let graph = load_graph(file)?;
    let predicates = graph.predicates();
    println!(
        "{} {}: {} triples, {} predicates, {} terms",
        "Loaded".green().bold(),
        file.display(),
        graph.len(),
        predicates.len(),
        graph.interner().len()
    );
    for p in &predicates {
        println!("  {} {} {}", "→".cyan(), p, graph.predicate_count(p));
    }
    Ok(())
}

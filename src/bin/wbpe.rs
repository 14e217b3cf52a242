use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::ThreadPoolBuilder;
use serde_json::json;
use wbpe::corpus::load_text_corpus;
use wbpe::{
    decode, BpeModel, IngestConfig, PunctuationPolicy, TokenComparison, TokenizerConfig, Trainer,
};

const DEFAULT_OUTPUT: &str = "model.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Word-level BPE toolkit", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a new model from text inputs
    Train(TrainArgs),
    /// Encode text with a trained model
    Encode(EncodeArgs),
    /// Join tokens back into text
    Decode(DecodeArgs),
    /// Compare encoded output against reference tokens
    Eval(EvalArgs),
    /// Inspect model metadata
    Info(InfoArgs),
}

/// Punctuation handling selectable from the command line.
#[derive(Copy, Clone, Debug, ValueEnum)]
enum PolicyArg {
    /// Drop punctuation; it only separates words.
    Strip,
    /// Keep each punctuation character as its own token.
    Isolate,
}

impl From<PolicyArg> for PunctuationPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Strip => PunctuationPolicy::Strip,
            PolicyArg::Isolate => PunctuationPolicy::Isolate,
        }
    }
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Files or directories to ingest
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output path for the trained model JSON
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Maximum number of merges to learn
    #[arg(long, value_name = "COUNT", default_value_t = 1000)]
    merges: usize,

    /// Minimum pair frequency for merges
    #[arg(long, value_name = "COUNT")]
    min_frequency: Option<u64>,

    /// Punctuation policy
    #[arg(long, value_enum, default_value_t = PolicyArg::Strip)]
    punctuation: PolicyArg,

    /// End-of-word marker character
    #[arg(long, value_name = "CHAR")]
    marker: Option<char>,

    /// Disable per-iteration logging/progress
    #[arg(long)]
    no_progress: bool,

    /// Emit pretty JSON
    #[arg(long)]
    pretty: bool,

    /// Limit Rayon worker threads
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Disable recursive directory traversal
    #[arg(long)]
    no_recursive: bool,

    /// Follow symlinks during traversal
    #[arg(long)]
    follow_symlinks: bool,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Trained model JSON to load
    #[arg(short = 'm', long, value_name = "PATH")]
    model: PathBuf,

    /// Text files to encode
    #[arg(required_unless_present = "text")]
    inputs: Vec<PathBuf>,

    /// Encode a literal text argument instead of files
    #[arg(long, value_name = "TEXT", conflicts_with = "inputs")]
    text: Option<String>,

    /// Emit JSON lines instead of human-readable output
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Path to whitespace separated tokens
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Tokens to decode when --input is omitted
    #[arg(value_name = "TOKEN", required_unless_present = "input")]
    tokens: Vec<String>,

    /// Output file for decoded text (defaults to stdout)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EvalArgs {
    /// Trained model JSON to load
    #[arg(short = 'm', long, value_name = "PATH")]
    model: PathBuf,

    /// Text file to encode for the comparison
    #[arg(long, value_name = "PATH", required_unless_present = "text")]
    input: Option<PathBuf>,

    /// Literal text to encode instead of a file
    #[arg(long, value_name = "TEXT", conflicts_with = "input")]
    text: Option<String>,

    /// Path to whitespace separated reference tokens
    #[arg(long, value_name = "PATH")]
    reference: PathBuf,

    /// Emit machine-readable JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Trained model JSON to inspect
    #[arg(short = 'm', long, value_name = "PATH")]
    model: PathBuf,

    /// Emit machine-readable JSON summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Encode(args) => run_encode(args),
        Commands::Decode(args) => run_decode(args),
        Commands::Eval(args) => run_eval(args),
        Commands::Info(args) => run_info(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn run_train(args: TrainArgs) -> Result<()> {
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("unable to configure Rayon thread pool")?;
    }

    let mut cfg = TokenizerConfig::builder()
        .punctuation_policy(args.punctuation.into())
        .show_progress(!args.no_progress);
    if let Some(min_frequency) = args.min_frequency {
        cfg = cfg.min_frequency(min_frequency);
    }
    if let Some(marker) = args.marker {
        cfg = cfg.marker(marker);
    }
    let tokenizer_cfg = cfg.build()?;

    let ingest_cfg = IngestConfig {
        recursive: !args.no_recursive,
        follow_symlinks: args.follow_symlinks,
    };

    let text = load_text_corpus(&args.inputs, &ingest_cfg)
        .with_context(|| "failed to load text corpus")?;
    info!(
        "loaded corpus of {} characters ({} words)",
        text.chars().count(),
        text.split_whitespace().count()
    );

    let spinner = if args.no_progress {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} learning merges... {elapsed}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    };

    let trainer = Trainer::new(tokenizer_cfg);
    let start = Instant::now();
    let artifacts = trainer.train(&text, args.merges)?;
    if let Some(pb) = spinner {
        pb.finish_with_message("training complete");
    }

    let elapsed = start.elapsed();
    let merges = artifacts.model.merges().len();
    let vocab_size = artifacts.model.vocab_size();

    let json = artifacts.model.to_json(args.pretty)?;
    fs::write(&args.output, json)
        .with_context(|| format!("failed to save model to {}", args.output.display()))?;

    info!(
        "training complete: merges={merges} vocab={vocab_size} stop={:?} duration={elapsed:.2?}",
        artifacts.metrics.stop_reason
    );
    println!(
        "wrote model with vocab {} ({} merges) to {}",
        vocab_size,
        merges,
        args.output.display()
    );

    Ok(())
}

fn run_encode(args: EncodeArgs) -> Result<()> {
    let model = load_model(&args.model)?;

    if let Some(text) = &args.text {
        emit_tokens("<text>", &model.encode(text), args.json)?;
        return Ok(());
    }

    for path in &args.inputs {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let tokens = model.encode(&text);
        emit_tokens(&path.display().to_string(), &tokens, args.json)?;
    }

    Ok(())
}

fn emit_tokens(source: &str, tokens: &[String], as_json: bool) -> Result<()> {
    if as_json {
        let record = json!({
            "source": source,
            "tokens": tokens
        });
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!("{}:\t{}", source, tokens.join(" "));
    }
    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let tokens = if let Some(input_path) = &args.input {
        let contents = fs::read_to_string(input_path)
            .with_context(|| format!("failed to read {}", input_path.display()))?;
        contents
            .split_whitespace()
            .map(str::to_string)
            .collect::<Vec<_>>()
    } else {
        args.tokens
    };

    let text = decode(&tokens);

    if let Some(path) = &args.output {
        let mut file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {} bytes to {}", text.len(), path.display());
    } else {
        println!("{text}");
    }

    Ok(())
}

fn run_eval(args: EvalArgs) -> Result<()> {
    let model = load_model(&args.model)?;

    let text = match (&args.text, &args.input) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => unreachable!("clap enforces input or text"),
    };
    let candidate = model.encode(&text);

    let reference: Vec<String> = fs::read_to_string(&args.reference)
        .with_context(|| format!("failed to read {}", args.reference.display()))?
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let comparison = TokenComparison::compare(&reference, &candidate);

    if args.json {
        let record = json!({
            "reference_tokens": reference.len(),
            "candidate_tokens": candidate.len(),
            "metrics": comparison,
        });
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Reference tokens : {}", reference.len());
        println!("Candidate tokens : {}", candidate.len());
        println!("Precision        : {:.4}", comparison.precision);
        println!("Recall           : {:.4}", comparison.recall);
        println!("F1               : {:.4}", comparison.f1);
        println!("Jaccard          : {:.4}", comparison.jaccard);
        println!("Coverage         : {:.4}", comparison.coverage);
    }

    Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
    let model = load_model(&args.model)?;

    let preview: Vec<String> = model
        .merges()
        .iter()
        .take(5)
        .map(|(left, right)| format!("{left}+{right}"))
        .collect();

    if args.json {
        let summary = json!({
            "path": args.model.display().to_string(),
            "marker": model.config().marker,
            "punctuation_policy": model.config().punctuation_policy,
            "vocab_size": model.vocab_size(),
            "merges": model.merges().len(),
            "distinct_words": model.word_vocab().len(),
            "first_merges": preview,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Marker        : {:?}", model.config().marker);
        println!("Punctuation   : {:?}", model.config().punctuation_policy);
        println!("Vocab size    : {}", model.vocab_size());
        println!("Merges        : {}", model.merges().len());
        println!("Distinct words: {}", model.word_vocab().len());
        if preview.is_empty() {
            println!("First merges  : (none)");
        } else {
            println!("First merges  : {}", preview.join(", "));
        }
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<BpeModel> {
    BpeModel::load(path).with_context(|| format!("failed to load model from {}", path.display()))
}

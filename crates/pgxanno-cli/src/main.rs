mod display;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use pgxanno_core::{DocumentInput, Vocabulary};
use pgxanno_engine::config::DEFAULT_SIGNIFICANCE_THRESHOLD;
use pgxanno_engine::{BatchCoordinator, EngineConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pgxanno", version, about = "Pharmacogenomic annotation resolver and validator")]
struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[arg(short, long, global = true, help = "Log at debug level")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve, assemble and validate the candidate groups of one document.
    Run(RunArgs),
    /// Show the vocabulary tables in effect.
    Vocab {
        #[arg(long, env = "PGXANNO_VOCAB", help = "JSON vocabulary file")]
        vocab: Option<PathBuf>,
    },
    /// Summarise a Parquet report written by `run --out`.
    Inspect { path: PathBuf },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Document input JSON (candidate groups).
    input: PathBuf,
    #[arg(long, help = "Write the report table to this Parquet file")]
    out: Option<PathBuf>,
    #[arg(long, help = "Write one JSON line per record to this file")]
    jsonl: Option<PathBuf>,
    #[arg(long, env = "PGXANNO_VOCAB", help = "JSON vocabulary file")]
    vocab: Option<PathBuf>,
    #[arg(long, env = "PGXANNO_PARALLEL", default_value_t = false)]
    parallel: bool,
    #[arg(
        long,
        env = "PGXANNO_SIGNIFICANCE_THRESHOLD",
        default_value_t = DEFAULT_SIGNIFICANCE_THRESHOLD
    )]
    significance_threshold: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("pgxanno v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run(args) => run(&args, cli.json),
        Commands::Vocab { vocab } => show_vocab(vocab.as_deref(), cli.json),
        Commands::Inspect { path } => inspect(&path, cli.json),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pgxanno=debug" } else { "pgxanno=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_vocab(path: Option<&Path>) -> Result<Vocabulary> {
    let Some(path) = path else {
        return Ok(Vocabulary::builtin());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading vocabulary {}", path.display()))?;
    Vocabulary::from_json(&json).with_context(|| format!("parsing vocabulary {}", path.display()))
}

// ── Commands ──

fn run(args: &RunArgs, json: bool) -> Result<()> {
    let t = args.significance_threshold;
    if !(t > 0.0 && t < 1.0) {
        bail!("significance threshold must lie strictly between 0 and 1, got {t}");
    }

    let vocab = Arc::new(load_vocab(args.vocab.as_deref())?);
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let input: DocumentInput = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let config = EngineConfig {
        parallel: args.parallel,
        significance_threshold: t,
    };
    let batch = BatchCoordinator::new(vocab, config).process(&input);
    let table = pgxanno_store::to_record_batch(&batch)?;

    if let Some(out) = &args.out {
        pgxanno_store::write_parquet(out, std::slice::from_ref(&table))
            .with_context(|| format!("writing {}", out.display()))?;
    }
    if let Some(path) = &args.jsonl {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut w = BufWriter::new(file);
        pgxanno_store::write_json_lines(&mut w, &batch)?;
        w.flush()?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    for (row, entry) in batch.entries.iter().enumerate() {
        display::print_record_card(&table, row);
        display::print_failures(&entry.report);
    }
    display::print_summary(&batch.summary);
    println!("generated {}", batch.generated_at.to_rfc3339());
    Ok(())
}

fn show_vocab(path: Option<&Path>, json: bool) -> Result<()> {
    let vocab = load_vocab(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&vocab)?);
    } else {
        display::print_vocab_summary(&vocab.summary());
    }
    Ok(())
}

fn inspect(path: &Path, json: bool) -> Result<()> {
    let batches = pgxanno_store::read_parquet(path)?;
    let totals = pgxanno_store::report_totals(&batches)?;

    if json {
        let value = serde_json::json!({
            "rows": totals.rows,
            "passed": totals.passed,
            "soft_failed": totals.soft_failed,
            "hard_failed": totals.hard_failed,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut preview = Vec::with_capacity(batches.len());
    for b in &batches {
        let schema = b.schema();
        let indices = ["variant_annotation_id", "gene", "variant_haplotypes", "verdict"]
            .iter()
            .map(|name| schema.index_of(name))
            .collect::<Result<Vec<_>, _>>()?;
        preview.push(b.project(&indices)?);
    }
    println!("{}", arrow::util::pretty::pretty_format_batches(&preview)?);
    display::print_totals(&totals);
    Ok(())
}

mod corpus;
mod error;
mod fetch;
mod merge;
mod report;
mod scan;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use corpus::Corpus;
use error::CollectError;
use report::OutputFormat;
use settings::Settings;

#[derive(Parser)]
#[command(name = "session_docs", about = "Collect and organise committee session documents")]
struct Cli {
    /// Configuration file (default: ./session_docs.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Documents listing page
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// First agenda number to collect
    #[arg(long, global = true)]
    first: Option<u32>,
    /// Last agenda number to collect
    #[arg(long, global = true)]
    last: Option<u32>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the listing page and write the link manifest
    Discover {
        /// Manifest path (default: data/urls.txt)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Categorise downloaded documents and write a summary, inventory or guide
    Analyze {
        /// Documents directory (default: docs/raw)
        #[arg(short, long)]
        docs: Option<PathBuf>,
        /// Output directory (default: out)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Output format: summary, inventory, guide
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Concatenate downloaded PDFs in canonical order
    Merge {
        /// Documents directory (default: docs/raw)
        #[arg(short, long)]
        docs: Option<PathBuf>,
        /// Merged PDF path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show corpus statistics and the merged PDF size
    Stats {
        /// Documents directory (default: docs/raw)
        #[arg(short, long)]
        docs: Option<PathBuf>,
        /// Merged PDF path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let result = run(cli).await;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<CollectError>() {
            Some(empty @ CollectError::EmptyCorpus(_)) => {
                warn!("{}", empty);
                ExitCode::SUCCESS
            }
            Some(known) => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(known.exit_code())
            }
            None => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(url) = cli.base_url {
        settings.base_url = url;
    }
    if let Some(first) = cli.first {
        settings.agenda_first = first;
    }
    if let Some(last) = cli.last {
        settings.agenda_last = last;
    }

    match cli.command {
        Commands::Discover { out } => {
            if let Some(out) = out {
                settings.manifest_path = out;
            }
            settings.validate()?;
            discover(&settings).await
        }
        Commands::Analyze { docs, out, format } => {
            if let Some(docs) = docs {
                settings.docs_dir = docs;
            }
            if let Some(out) = out {
                settings.out_dir = out;
            }
            if let Some(format) = format {
                settings.format = format;
            }
            let format: OutputFormat = settings.format.parse()?;
            settings.validate()?;
            analyze(&settings, format)
        }
        Commands::Merge { docs, output } => {
            if let Some(docs) = docs {
                settings.docs_dir = docs;
            }
            if let Some(output) = output {
                settings.merged_pdf = output;
            }
            settings.validate()?;
            merge_documents(&settings).await
        }
        Commands::Stats { docs, output } => {
            if let Some(docs) = docs {
                settings.docs_dir = docs;
            }
            if let Some(output) = output {
                settings.merged_pdf = output;
            }
            settings.validate()?;
            stats(&settings)
        }
    }
}

async fn discover(settings: &Settings) -> Result<()> {
    let base = settings.base()?;
    let markup = fetch::fetch_listing(base.as_str()).await?;
    let corpus = corpus::discover(&markup, settings, &base);
    ensure_not_empty(&corpus, &settings.base_url)?;

    let manifest = report::render_manifest(&corpus, &settings.base_url, Local::now());
    report::write_file(&settings.manifest_path, &manifest)?;

    println!("Wrote {}", settings.manifest_path.display());
    println!("Total documents found: {}", corpus.len());
    println!("Session documents: {}", corpus.session_docs.len());
    println!(
        "Agenda-related documents: {} across {} items",
        corpus.agenda_buckets.values().map(corpus::AgendaBucket::len).sum::<usize>(),
        corpus.agenda_buckets.len()
    );
    println!("Background documents: {}", corpus.background_docs.len());
    println!("Introductory statements: {}", corpus.introductory_docs.len());
    println!("Additional documents: {}", corpus.miscellaneous_docs.len());
    Ok(())
}

fn load_local(settings: &Settings, pdf_only: bool) -> Result<Corpus> {
    let mut files = scan::scan_documents(&settings.docs_dir)?;
    if pdf_only {
        files.retain(scan::LocalFile::is_pdf);
    }
    let corpus = corpus::from_files(&files, settings);
    ensure_not_empty(&corpus, &settings.docs_dir.display().to_string())?;
    info!(
        "Categorised {} files: {} session, {} agenda items",
        corpus.len(),
        corpus.session_docs.len(),
        corpus.agenda_buckets.len()
    );
    Ok(corpus)
}

fn analyze(settings: &Settings, format: OutputFormat) -> Result<()> {
    let corpus = load_local(settings, false)?;
    match format {
        OutputFormat::Summary => print!("{}", report::render_summary(&corpus)),
        OutputFormat::Inventory => {
            let path = settings.inventory_path();
            report::write_file(&path, &report::render_inventory(&corpus, Local::now())?)?;
            println!("Wrote inventory to {}", path.display());
        }
        OutputFormat::Guide => {
            let path = settings.guide_path();
            let guide = report::render_guide(&corpus, &settings.docs_dir, Local::now());
            report::write_file(&path, &guide)?;
            println!("Wrote analysis guide to {}", path.display());
            println!("Next steps:");
            println!("1. Upload all files from {}", settings.docs_dir.display());
            println!("2. Follow the analysis questions in {}", path.display());
            println!("3. Save results in {} as suggested", settings.out_dir.display());
        }
    }
    Ok(())
}

async fn merge_documents(settings: &Settings) -> Result<()> {
    let corpus = load_local(settings, true)?;
    let inputs = merge::merge_inputs(&corpus);

    println!("Found {} PDF files\n", inputs.len());
    println!("PDF merge order:");
    for (i, path) in inputs.iter().enumerate() {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        println!("{:>2}. {}", i + 1, name);
    }

    let size = merge::run_merge_tool(&settings.merge_tool, &inputs, &settings.merged_pdf).await?;
    println!("\nCreated {}", settings.merged_pdf.display());
    println!("   Size: {:.1}MB", report::size_mb(size));
    println!("   Files merged: {}", inputs.len());
    Ok(())
}

fn stats(settings: &Settings) -> Result<()> {
    let corpus = load_local(settings, true)?;
    if let Some(size) = merge::merged_size(&settings.merged_pdf)? {
        println!("Merged PDF: {} ({:.1}MB)", settings.merged_pdf.display(), report::size_mb(size));
    } else {
        println!("Merged PDF: {} (not created yet)", settings.merged_pdf.display());
    }
    println!();

    let summaries: usize = corpus
        .agenda_buckets
        .values()
        .map(|b| usize::from(b.summary.is_some()) + b.extra_summaries.len())
        .sum();
    let reports: usize = corpus.agenda_buckets.values().map(|b| b.reports.len()).sum();
    println!("Total files: {}", corpus.len());
    println!("  Agenda summaries:   {}", summaries);
    println!("  Agenda reports:     {}", reports);
    println!("  Session documents:  {}", corpus.session_docs.len());
    println!("  Background:         {}", corpus.background_docs.len());
    println!("  Reference papers:   {}", corpus.reference_docs().count());

    let covered: Vec<String> = corpus.agenda_buckets.keys().map(u32::to_string).collect();
    match (corpus.agenda_buckets.keys().next(), corpus.agenda_buckets.keys().last()) {
        (Some(first), Some(last)) => {
            println!("\nAgenda items covered: {}-{}", first, last);
            println!("  Collected: {}", covered.join(", "));
        }
        _ => println!("\nNo agenda items collected"),
    }
    let missing: Vec<String> = settings
        .agenda_range()
        .filter(|n| !corpus.agenda_buckets.contains_key(n))
        .map(|n| n.to_string())
        .collect();
    if !missing.is_empty() {
        println!("  Missing from {}-{}: {}", settings.agenda_first, settings.agenda_last, missing.join(", "));
    }
    Ok(())
}

fn ensure_not_empty(corpus: &Corpus, source: &str) -> Result<()> {
    if corpus.is_empty() {
        return Err(CollectError::EmptyCorpus(source.to_string()).into());
    }
    Ok(())
}

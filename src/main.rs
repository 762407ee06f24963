use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use singlish_sentiment::dataset::{
    load_reviews, write_analyzed, AnalyzedRow, Encoding, ReadOptions, TextColumn,
};
use singlish_sentiment::report::{catalog_path, SentimentReport, DATASET_CATALOG};
use singlish_sentiment::sentiment::{ModernBertSize, SentimentPipeline, SentimentPipelineBuilder};
use singlish_sentiment::text::clean;

#[derive(Parser)]
#[command(name = "singlish-sentiment", version, about = "Sentiment analysis for Singlish app reviews")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
    /// Use the large model variant instead of base
    #[arg(long, global = true)]
    large: bool,
    /// Run inference on the given CUDA device
    #[arg(long, global = true)]
    cuda: Option<usize>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Classify a single review and print the refined verdict
    Analyze {
        /// The review text
        text: String,
    },
    /// Clean, classify and refine a whole CSV dataset
    Batch {
        /// Input CSV file
        #[arg(long)]
        input: PathBuf,
        /// Output CSV file; columns are text, cleaned_text, sentiment
        /// (input columns other than the text column are not carried over)
        #[arg(long, verbatim_doc_comment)]
        output: PathBuf,
        /// Name of the text column (omit together with --no-header for column 0)
        #[arg(long, default_value = "content", conflicts_with = "no_header")]
        column: String,
        /// Treat the file as headerless and read the first column
        #[arg(long)]
        no_header: bool,
        /// Read the input as UTF-16
        #[arg(long)]
        utf16: bool,
        /// Skip malformed rows instead of aborting
        #[arg(long)]
        skip_bad_rows: bool,
        /// Prepend a UTF-8 BOM to the output for spreadsheet tools
        #[arg(long)]
        bom: bool,
    },
    /// Summarize an analyzed dataset: distribution, keywords, filtered export
    Report {
        /// Analyzed CSV file to summarize
        #[arg(long, conflicts_with = "platform")]
        input: Option<PathBuf>,
        /// Catalog platform name (e.g. "Daraz"); lists the catalog when omitted
        #[arg(long)]
        platform: Option<String>,
        /// Only include these sentiments (prefix match, e.g. POSITIVE,NEUTRAL)
        #[arg(long, value_delimiter = ',')]
        sentiments: Vec<String>,
        /// How many keywords to list
        #[arg(long, default_value_t = 15)]
        top: usize,
        /// Export the filtered view to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Prepend a UTF-8 BOM to the export
        #[arg(long)]
        bom: bool,
    },
}

fn build_pipeline(
    large: bool,
    cuda: Option<usize>,
) -> Result<SentimentPipeline<singlish_sentiment::sentiment::SentimentModernBert>> {
    let size = if large {
        ModernBertSize::Large
    } else {
        ModernBertSize::Base
    };
    let mut builder = SentimentPipelineBuilder::modernbert(size);
    if let Some(index) = cuda {
        builder = builder.cuda(index);
    }
    builder.build().context("failed to load the sentiment model")
}

fn run_analyze(text: &str, large: bool, cuda: Option<usize>) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Please enter some text to begin analysis.");
    }

    eprintln!("Loading model... (cached after the first run)");
    let pipeline = build_pipeline(large, cuda)?;
    let verdict = pipeline.analyze(text)?;
    println!("Sentiment: {verdict} | Confidence: {:.2}", verdict.score);
    Ok(())
}

fn run_batch(
    input: &PathBuf,
    output: &PathBuf,
    column: TextColumn,
    options: ReadOptions,
    bom: bool,
    large: bool,
    cuda: Option<usize>,
) -> Result<()> {
    let reviews = load_reviews(input, &column, &options)?;
    println!("Loaded {} reviews from {}", reviews.len(), input.display());

    eprintln!("Loading model... (cached after the first run)");
    let pipeline = build_pipeline(large, cuda)?;

    let cleaned: Vec<String> = reviews.iter().map(|r| clean(r)).collect();
    let refs: Vec<&str> = cleaned.iter().map(String::as_str).collect();
    let batch = pipeline.analyze_batch(&refs)?;

    let mut rows = Vec::with_capacity(reviews.len());
    for ((text, cleaned_text), item) in reviews.iter().zip(cleaned.iter()).zip(batch.items) {
        let verdict = item
            .verdict
            .with_context(|| format!("classification failed for '{cleaned_text}'"))?;
        rows.push(AnalyzedRow {
            text: text.clone(),
            cleaned_text: cleaned_text.clone(),
            sentiment: verdict.label(),
        });
    }

    write_analyzed(output, &rows, bom)?;
    println!(
        "Analyzed {} rows in {:.1}s -> {}",
        rows.len(),
        batch.stats.total_time.as_secs_f64(),
        output.display()
    );
    Ok(())
}

fn run_report(
    input: Option<PathBuf>,
    platform: Option<String>,
    sentiments: Vec<String>,
    top: usize,
    export: Option<PathBuf>,
    bom: bool,
) -> Result<()> {
    let path = match (input, platform) {
        (Some(path), _) => path,
        (None, Some(name)) => match catalog_path(&name) {
            Some(path) => PathBuf::from(path),
            None => bail!(
                "Unknown platform '{}'. Known: {}",
                name,
                DATASET_CATALOG
                    .iter()
                    .map(|(n, _)| *n)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        },
        (None, None) => {
            println!("Available datasets:");
            for (name, file) in DATASET_CATALOG {
                println!("  {name:<18} {file}");
            }
            return Ok(());
        }
    };

    let report = SentimentReport::load(&path).with_context(|| {
        format!(
            "Dataset '{}' not found. Ensure the batch analysis has been executed.",
            path.display()
        )
    })?;
    let filtered = if sentiments.is_empty() {
        report
    } else {
        report.filter(&sentiments)
    };

    println!("Total reviews: {}", filtered.len());

    println!("\nSentiment distribution:");
    for share in filtered.distribution() {
        println!(
            "  {:<22} {:>7}  {:>5.1}%",
            share.label,
            share.count,
            share.proportion * 100.0
        );
    }

    println!("\nTop keywords:");
    for (word, count) in filtered.top_keywords(top) {
        println!("  {word:<22} {count:>7}");
    }

    if let Some(export_path) = export {
        filtered.export(&export_path, bom)?;
        println!("\nExported filtered view to {}", export_path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Analyze { text } => run_analyze(&text, cli.large, cli.cuda),
        Cmd::Batch {
            input,
            output,
            column,
            no_header,
            utf16,
            skip_bad_rows,
            bom,
        } => {
            let text_column = if no_header {
                TextColumn::Index(0)
            } else {
                TextColumn::Named(column)
            };
            let options = ReadOptions {
                encoding: if utf16 { Encoding::Utf16 } else { Encoding::Utf8 },
                has_headers: !no_header,
                skip_bad_rows,
            };
            run_batch(&input, &output, text_column, options, bom, cli.large, cli.cuda)
        }
        Cmd::Report {
            input,
            platform,
            sentiments,
            top,
            export,
            bom,
        } => run_report(input, platform, sentiments, top, export, bom),
    }
}

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use mammarea_core::cli::setup_logging;
use mammarea_core::{
    relocate, BatchConfig, BatchProcessor, BatchReport, BatchRun, DicomReader, MammareaError,
    ScanReport, ScanSummary, ScratchDir,
};
use std::path::{Path, PathBuf};
use std::process;

/// CLI tool for measuring segmented areas over a directory of mammograms
#[derive(Parser, Debug)]
#[command(name = "mammabatch")]
#[command(about = "Measure the automatic mask area of every mammogram under a directory")]
#[command(version)]
struct Cli {
    /// Directory searched recursively for DICOM files
    #[arg(value_name = "DIRECTORY")]
    root: PathBuf,

    /// Directory that receives results_<n>/
    #[arg(short, long, value_name = "DIR")]
    dest: PathBuf,

    /// Also write every mask as PNG and NIfTI
    #[arg(short, long)]
    save_masks: bool,

    /// File extensions to scan (repeatable)
    #[arg(short, long = "extension", default_value = "dcm")]
    extensions: Vec<String>,

    /// Fixed histogram bin count for the automatic threshold
    #[arg(long)]
    bins: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    if !cli.root.is_dir() {
        eprintln!("Error: {} is not a directory", cli.root.display());
        process::exit(1);
    }

    let mut config = BatchConfig::default()
        .with_extensions(cli.extensions.iter().map(|e| e.trim_start_matches('.')))
        .persist_masks(cli.save_masks);
    if let Some(bins) = cli.bins {
        config = config.with_histogram_bins(bins);
    }
    let processor = BatchProcessor::new(DicomReader, config);

    info!("Scanning directory: {}", cli.root.display());
    let scan = match processor.scan(&cli.root) {
        Ok(scan) => scan,
        Err(e) => {
            error!("Failed to scan directory: {}", e);
            eprintln!("Error: Failed to scan directory: {}", e);
            process::exit(1);
        }
    };

    if scan.is_empty() {
        eprintln!("Error: No MG Dicom files found");
        process::exit(1);
    }
    if matches!(cli.format, OutputFormat::Text) {
        println!("{}", ScanReport::new(&scan));
    }

    let scratch = match ScratchDir::new() {
        Ok(scratch) => scratch,
        Err(e) => {
            eprintln!("Error: Could not create scratch directory: {}", e);
            process::exit(1);
        }
    };

    let (staging, run) = match run_batch(&processor, &scan, &scratch) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Batch failed: {}", e);
            eprintln!("Error: {}", e);
            let kept = preserve(scratch);
            eprintln!("Partial results kept in {}", kept.display());
            process::exit(1);
        }
    };

    let results = match relocate(&staging, &cli.dest) {
        Ok(results) => results,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            let kept = preserve(scratch);
            eprintln!("Results kept in {}", kept.display());
            process::exit(2);
        }
    };
    drop(scratch);

    output_run(&scan, &run, &results, cli.format);
}

/// Keeps the scratch directory past exit so staged outputs can be recovered by hand
fn preserve(scratch: ScratchDir) -> PathBuf {
    let kept = scratch.keep();
    warn!("Scratch directory kept at {}", kept.display());
    kept
}

fn run_batch(
    processor: &BatchProcessor,
    scan: &ScanSummary,
    scratch: &ScratchDir,
) -> Result<(PathBuf, BatchRun), MammareaError> {
    let staging = scratch.unique_dir("staging")?;

    let progress = ProgressBar::new(scan.eligible.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    progress.set_message("Calculation ongoing...");

    let run = processor.run(&scan.eligible, &staging, |done, _| {
        progress.set_position(done as u64)
    });
    progress.finish_and_clear();
    Ok((staging, run?))
}

fn output_run(scan: &ScanSummary, run: &BatchRun, results: &Path, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", BatchReport::new(run, Some(results)));
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match output_json(scan, run, results) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                let _ = scan;
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

#[cfg(feature = "json")]
fn output_json(
    scan: &ScanSummary,
    run: &BatchRun,
    results: &Path,
) -> Result<String, serde_json::Error> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct BatchJson<'a> {
        scan: &'a ScanSummary,
        run: &'a BatchRun,
        results: String,
    }

    serde_json::to_string_pretty(&BatchJson {
        scan,
        run,
        results: results.display().to_string(),
    })
}

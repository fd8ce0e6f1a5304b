// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Splitscan — split scanned pages into individual, straightened photos
//
// Entry point. Initialises logging, loads settings, runs the batch and
// prints its summary.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use splitscan_batch::BatchCoordinator;
use splitscan_core::types::{BatchProgress, ItemStatus};
use splitscan_core::AppConfig;
use tokio::sync::mpsc;

use services::app_services::AppServices;
use services::reveal::reveal;

#[derive(Debug, Parser)]
#[command(name = "splitscan", author, version, about, long_about = None)]
struct Cli {
    /// Scanned images to split (JPEG, PNG, BMP)
    inputs: Vec<PathBuf>,

    /// Directory that receives the extracted photos
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of images processed at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Maximum number of photos taken from each scan
    #[arg(long)]
    max_regions: Option<usize>,

    /// JPEG quality of the written photos (1-100)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Settings file to use instead of the one in the data directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Store the effective settings for later runs
    #[arg(long)]
    save_config: bool,

    /// Open the output directory in the file browser when done
    #[arg(long)]
    open: bool,
}

impl Cli {
    /// Overlay the command-line flags onto the loaded settings.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(jobs) = self.jobs {
            config.batch.max_parallelism = jobs;
        }
        if let Some(max_regions) = self.max_regions {
            config.extraction.max_regions = max_regions;
        }
        if let Some(quality) = self.quality {
            config.extraction.jpeg_quality = quality;
        }
        if self.open {
            config.reveal_output = true;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("Splitscan starting");

    let mut services = match AppServices::init(cli.config.clone()) {
        Ok(services) => services,
        Err(e) => {
            tracing::error!(error = %e, "could not load settings");
            eprintln!("splitscan: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = services.config().clone();
    cli.apply(&mut config);
    if let Err(e) = config.validate() {
        eprintln!("splitscan: {e}");
        return ExitCode::FAILURE;
    }

    if cli.save_config {
        if let Err(e) = services.save_config(&config) {
            eprintln!("splitscan: {e}");
            return ExitCode::FAILURE;
        }
        println!("Settings saved to {}", services.config_path().display());
        if cli.inputs.is_empty() {
            return ExitCode::SUCCESS;
        }
    }

    if cli.inputs.is_empty() {
        eprintln!("splitscan: no input images given");
        return ExitCode::FAILURE;
    }

    let output_dir = services.output_dir();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            println!("{}", progress_line(&progress));
        }
    });

    let coordinator =
        BatchCoordinator::new(config.extraction.clone(), &config.batch).with_progress(tx);
    let batch = coordinator.process_batch(&cli.inputs, &output_dir).await;
    drop(coordinator);
    printer.await.ok();

    println!();
    print!("{batch}");

    if config.reveal_output && batch.total_written() > 0 {
        reveal(&batch.output_dir);
    }

    // A run succeeds when at least one photo was written.
    if batch.total_written() > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// One line per finished image.
fn progress_line(progress: &BatchProgress) -> String {
    let head = format!(
        "[{}/{}] {}",
        progress.index + 1,
        progress.total,
        progress.source.display()
    );
    match &progress.status {
        ItemStatus::Extracted {
            written,
            region_failures: 0,
        } => format!("{head}: {written} photo(s)"),
        ItemStatus::Extracted {
            written,
            region_failures,
        } => format!("{head}: {written} photo(s), {region_failures} region(s) skipped"),
        ItemStatus::Failed { message } => format!("{head}: failed: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_loaded_settings() {
        let cli = Cli::try_parse_from([
            "splitscan",
            "--jobs",
            "2",
            "--max-regions",
            "3",
            "--quality",
            "80",
            "--open",
            "-o",
            "/tmp/photos",
            "a.jpg",
            "b.png",
        ])
        .expect("parse");

        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(config.batch.max_parallelism, 2);
        assert_eq!(config.extraction.max_regions, 3);
        assert_eq!(config.extraction.jpeg_quality, 80);
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/photos")));
        assert!(config.reveal_output);
    }

    #[test]
    fn absent_flags_leave_settings_alone() {
        let cli = Cli::try_parse_from(["splitscan", "scan.jpg"]).expect("parse");
        let mut config = AppConfig::default();
        config.batch.max_parallelism = 7;
        cli.apply(&mut config);
        assert_eq!(config.batch.max_parallelism, 7);
        assert!(!config.reveal_output);
    }

    #[test]
    fn progress_lines_describe_the_outcome() {
        let done = BatchProgress {
            index: 0,
            total: 2,
            source: PathBuf::from("a.jpg"),
            status: ItemStatus::Extracted {
                written: 3,
                region_failures: 1,
            },
        };
        assert_eq!(progress_line(&done), "[1/2] a.jpg: 3 photo(s), 1 region(s) skipped");

        let failed = BatchProgress {
            index: 1,
            total: 2,
            source: PathBuf::from("b.jpg"),
            status: ItemStatus::Failed {
                message: "no regions found".into(),
            },
        };
        assert_eq!(progress_line(&failed), "[2/2] b.jpg: failed: no regions found");
    }
}

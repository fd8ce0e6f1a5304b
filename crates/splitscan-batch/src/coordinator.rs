// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch coordinator — runs the photo extractor over many scans on a bounded
// worker pool and gathers one result per input.
//
// Extraction is CPU-bound, so each image runs on tokio's blocking pool; a
// semaphore caps how many do so at once. Results are collected by awaiting
// the task handles in submission order, so the batch result never depends
// on completion order. Progress notices, by contrast, go out as soon as
// each image finishes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use splitscan_core::config::{BatchConfig, ExtractionConfig};
use splitscan_core::error::{Result, SplitscanError};
use splitscan_core::types::{
    BatchId, BatchProgress, BatchResult, ExtractionResult, ImageFailure, ItemStatus,
};
use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span};

use crate::extractor::PhotoExtractor;
use crate::output::OutputDir;

/// Runs extraction for a batch of scans with bounded parallelism.
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    extractor: Arc<PhotoExtractor>,
    max_parallelism: usize,
    progress: Option<UnboundedSender<BatchProgress>>,
}

impl BatchCoordinator {
    pub fn new(extraction: ExtractionConfig, batch: &BatchConfig) -> Self {
        Self {
            extractor: Arc::new(PhotoExtractor::new(extraction)),
            max_parallelism: batch.max_parallelism.max(1),
            progress: None,
        }
    }

    /// Report each finished image on `tx`, in completion order.
    pub fn with_progress(mut self, tx: UnboundedSender<BatchProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
    }

    /// Extract photos from every input into `output_dir`.
    ///
    /// Never fails as a whole: each image's outcome lands either in
    /// `results` or in `failures`, both in submission order. If the output
    /// directory cannot be prepared, every input is recorded as failed.
    pub async fn process_batch(&self, inputs: &[PathBuf], output_dir: &Path) -> BatchResult {
        let batch_id = BatchId::new();
        let span = info_span!("batch", id = %batch_id, images = inputs.len());
        self.run(batch_id, inputs, output_dir).instrument(span).await
    }

    async fn run(&self, batch_id: BatchId, inputs: &[PathBuf], output_dir: &Path) -> BatchResult {
        let started_at = Utc::now();
        let total = inputs.len();
        info!(parallelism = self.max_parallelism, "batch started");

        let output = match OutputDir::prepare(output_dir) {
            Ok(output) => output,
            Err(err) => {
                error!(error = %err, dir = %output_dir.display(), "output directory unavailable");
                let failures = inputs
                    .iter()
                    .enumerate()
                    .map(|(index, source)| {
                        let message = err.to_string();
                        self.report(index, total, source, ItemStatus::Failed {
                            message: message.clone(),
                        });
                        ImageFailure {
                            source: source.clone(),
                            message,
                        }
                    })
                    .collect();
                return BatchResult {
                    batch_id,
                    output_dir: output_dir.to_path_buf(),
                    results: Vec::new(),
                    failures,
                    started_at,
                    finished_at: Utc::now(),
                };
            }
        };

        let output = Arc::new(output);
        let permits = Arc::new(Semaphore::new(self.max_parallelism));
        let handles: Vec<JoinHandle<Result<ExtractionResult>>> = inputs
            .iter()
            .enumerate()
            .map(|(index, source)| {
                let permits = Arc::clone(&permits);
                let extractor = Arc::clone(&self.extractor);
                let output = Arc::clone(&output);
                let source = source.clone();
                let progress = self.progress.clone();

                tokio::spawn(
                    async move {
                        let _permit = permits
                            .acquire_owned()
                            .await
                            .map_err(|err| SplitscanError::WorkerPool(err.to_string()))?;

                        let job_source = source.clone();
                        let outcome =
                            tokio::task::spawn_blocking(move || extractor.extract(&job_source, &output))
                                .await
                                .map_err(|err| SplitscanError::WorkerPool(err.to_string()))
                                .and_then(|result| result);

                        if let Some(tx) = progress {
                            tx.send(BatchProgress {
                                index,
                                total,
                                source,
                                status: item_status(&outcome),
                            })
                            .ok();
                        }
                        outcome
                    }
                    .in_current_span(),
                )
            })
            .collect();

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for (source, handle) in inputs.iter().zip(handles) {
            let outcome = handle
                .await
                .map_err(|err| SplitscanError::WorkerPool(err.to_string()))
                .and_then(|result| result);
            match outcome {
                Ok(result) => results.push(result),
                Err(err) => {
                    error!(source = %source.display(), error = %err, "image failed");
                    failures.push(ImageFailure {
                        source: source.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        let batch = BatchResult {
            batch_id,
            output_dir: output.path().to_path_buf(),
            results,
            failures,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            written = batch.total_written(),
            succeeded = batch.succeeded(),
            failed = batch.failed(),
            "batch finished"
        );
        batch
    }

    fn report(&self, index: usize, total: usize, source: &Path, status: ItemStatus) {
        if let Some(tx) = &self.progress {
            tx.send(BatchProgress {
                index,
                total,
                source: source.to_path_buf(),
                status,
            })
            .ok();
        }
    }
}

fn item_status(outcome: &Result<ExtractionResult>) -> ItemStatus {
    match outcome {
        Ok(result) => ItemStatus::Extracted {
            written: result.outputs.len(),
            region_failures: result.region_failures.len(),
        },
        Err(err) => ItemStatus::Failed {
            message: err.to_string(),
        },
    }
}

/// Process `inputs` with default extraction settings and at most
/// `max_parallelism` images in flight.
pub async fn process_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    max_parallelism: usize,
) -> BatchResult {
    let batch = BatchConfig { max_parallelism };
    BatchCoordinator::new(ExtractionConfig::default(), &batch)
        .process_batch(inputs, output_dir)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{listing, save_png, two_photo_scan, white_scan};
    use std::fs;

    #[tokio::test]
    async fn one_corrupt_scan_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let scan = two_photo_scan();
        let mut inputs = vec![
            save_png(dir.path(), "a.png", &scan),
            save_png(dir.path(), "b.png", &scan),
            dir.path().join("corrupt.jpg"),
            save_png(dir.path(), "d.png", &scan),
        ];
        fs::write(&inputs[2], b"definitely not a jpeg").expect("write");
        let out = dir.path().join("out");

        let batch = process_batch(&inputs, &out, 4).await;

        assert_eq!(batch.results.len(), 3);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].source, inputs[2]);
        assert_eq!(batch.total_written(), 6);

        // Submission order survives.
        inputs.remove(2);
        let sources: Vec<PathBuf> = batch.results.iter().map(|r| r.source.clone()).collect();
        assert_eq!(sources, inputs);
    }

    #[tokio::test]
    async fn blank_scan_is_reported_as_no_regions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inputs = vec![save_png(dir.path(), "blank.png", &white_scan(300, 200))];

        let batch = process_batch(&inputs, &dir.path().join("out"), 2).await;

        assert!(batch.results.is_empty());
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].message, "no regions found");
    }

    #[tokio::test]
    async fn reruns_never_overwrite_earlier_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inputs = vec![save_png(dir.path(), "album.png", &two_photo_scan())];
        let out = dir.path().join("out");

        let first = process_batch(&inputs, &out, 1).await;
        let second = process_batch(&inputs, &out, 1).await;

        assert_eq!(first.total_written(), 2);
        assert_eq!(second.total_written(), 2);
        assert_eq!(listing(&out).len(), 4);
        for path in &first.results[0].outputs {
            assert!(path.exists());
        }
    }

    #[tokio::test]
    async fn same_base_name_from_different_folders_stays_distinct() {
        let dir = tempfile::tempdir().expect("tempdir");
        let left = dir.path().join("left");
        let right = dir.path().join("right");
        fs::create_dir_all(&left).expect("mkdir");
        fs::create_dir_all(&right).expect("mkdir");
        let scan = two_photo_scan();
        let inputs = vec![
            save_png(&left, "scan.png", &scan),
            save_png(&right, "scan.png", &scan),
        ];
        let out = dir.path().join("out");

        let batch = process_batch(&inputs, &out, 2).await;

        assert_eq!(batch.total_written(), 4);
        assert_eq!(listing(&out).len(), 4);
    }

    #[tokio::test]
    async fn progress_is_reported_once_per_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let inputs = vec![
            save_png(dir.path(), "album.png", &two_photo_scan()),
            save_png(dir.path(), "blank.png", &white_scan(200, 200)),
            dir.path().join("missing.png"),
        ];
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let coordinator =
            BatchCoordinator::new(ExtractionConfig::default(), &BatchConfig::default())
                .with_progress(tx);

        let batch = coordinator.process_batch(&inputs, &dir.path().join("out")).await;
        drop(coordinator);

        let mut seen = Vec::new();
        while let Some(progress) = rx.recv().await {
            assert_eq!(progress.total, 3);
            seen.push(progress);
        }
        seen.sort_by_key(|p| p.index);

        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[0].status, ItemStatus::Extracted { written: 2, .. }));
        assert!(matches!(seen[1].status, ItemStatus::Failed { .. }));
        assert!(matches!(seen[2].status, ItemStatus::Failed { .. }));
        assert_eq!(batch.succeeded(), 1);
        assert_eq!(batch.failed(), 2);
    }

    #[tokio::test]
    async fn unusable_output_directory_fails_every_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"file").expect("write");
        let inputs = vec![
            save_png(dir.path(), "a.png", &two_photo_scan()),
            save_png(dir.path(), "b.png", &two_photo_scan()),
        ];

        let batch = process_batch(&inputs, &blocker, 4).await;

        assert!(batch.results.is_empty());
        assert_eq!(batch.failures.len(), 2);
        assert_eq!(batch.failures[1].source, inputs[1]);
    }

    #[tokio::test]
    async fn empty_batch_returns_an_empty_result() {
        let dir = tempfile::tempdir().expect("tempdir");
        let batch = process_batch(&[], dir.path(), 4).await;
        assert_eq!(batch.total_written(), 0);
        assert!(batch.results.is_empty() && batch.failures.is_empty());
    }

    #[test]
    fn parallelism_is_at_least_one() {
        let coordinator =
            BatchCoordinator::new(ExtractionConfig::default(), &BatchConfig { max_parallelism: 0 });
        assert_eq!(coordinator.max_parallelism(), 1);
    }
}

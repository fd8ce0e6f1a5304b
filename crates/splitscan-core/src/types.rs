// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core result types for extraction and batch runs.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one batch run, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate region that was skipped while its siblings carried on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionFailure {
    /// Rank of the region by area, 0 being the largest.
    pub rank: usize,
    pub message: String,
}

/// Outcome of extracting photos from one source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub source: PathBuf,
    /// Files actually written, in rank order.
    pub outputs: Vec<PathBuf>,
    /// Regions that failed independently.
    pub region_failures: Vec<RegionFailure>,
}

impl ExtractionResult {
    /// Number of regions that were attempted for this image.
    pub fn attempted(&self) -> usize {
        self.outputs.len() + self.region_failures.len()
    }
}

/// A source image that produced no output at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFailure {
    pub source: PathBuf,
    pub message: String,
}

/// Aggregate outcome of a batch run.
///
/// Successful results and whole-image failures are kept separately, each in
/// submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: BatchId,
    pub output_dir: PathBuf,
    pub results: Vec<ExtractionResult>,
    pub failures: Vec<ImageFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchResult {
    /// Total photo files written across all images.
    pub fn total_written(&self) -> usize {
        self.results.iter().map(|r| r.outputs.len()).sum()
    }

    /// Regions skipped inside otherwise successful images.
    pub fn region_failure_count(&self) -> usize {
        self.results.iter().map(|r| r.region_failures.len()).sum()
    }

    /// Images that produced at least one file.
    pub fn succeeded(&self) -> usize {
        self.results.len()
    }

    /// Images that produced nothing.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = self.finished_at - self.started_at;
        writeln!(
            f,
            "Processed {} image(s) in {:.1}s: {} succeeded, {} failed",
            self.succeeded() + self.failed(),
            elapsed.num_milliseconds() as f64 / 1000.0,
            self.succeeded(),
            self.failed()
        )?;
        writeln!(f, "Photos written: {}", self.total_written())?;
        if self.region_failure_count() > 0 {
            writeln!(f, "Regions skipped: {}", self.region_failure_count())?;
        }
        write!(f, "Output directory: {}", self.output_dir.display())?;
        if !self.failures.is_empty() {
            write!(f, "\nErrors:")?;
            for failure in &self.failures {
                write!(f, "\n  • {}: {}", failure.source.display(), failure.message)?;
            }
        }
        Ok(())
    }
}

/// Per-item completion notice emitted while a batch is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// Submission index of the finished image.
    pub index: usize,
    pub total: usize,
    pub source: PathBuf,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Extracted { written: usize, region_failures: usize },
    Failed { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(outputs: usize, skipped: usize) -> ExtractionResult {
        ExtractionResult {
            source: PathBuf::from("scan.png"),
            outputs: (0..outputs)
                .map(|i| PathBuf::from(format!("scan_0_{i:02}.jpg")))
                .collect(),
            region_failures: (0..skipped)
                .map(|i| RegionFailure {
                    rank: outputs + i,
                    message: "degenerate".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn totals_aggregate_over_results() {
        let now = Utc::now();
        let batch = BatchResult {
            batch_id: BatchId::new(),
            output_dir: PathBuf::from("/tmp/out"),
            results: vec![result(2, 1), result(3, 0)],
            failures: vec![ImageFailure {
                source: PathBuf::from("broken.jpg"),
                message: "no regions found".into(),
            }],
            started_at: now,
            finished_at: now,
        };

        assert_eq!(batch.total_written(), 5);
        assert_eq!(batch.region_failure_count(), 1);
        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.failed(), 1);

        let summary = batch.to_string();
        assert!(summary.contains("Photos written: 5"));
        assert!(summary.contains("broken.jpg: no regions found"));
    }

    #[test]
    fn attempted_counts_both_outcomes() {
        assert_eq!(result(2, 3).attempted(), 5);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Splitscan Batch — per-image photo extraction, collision-free output
// persistence, and the bounded worker pool that runs extraction over many
// scans at once. This crate bridges the geometric pipeline in
// `splitscan-vision` and the result types defined in `splitscan-core`.

pub mod coordinator;
pub mod extractor;
pub mod output;

#[cfg(test)]
pub(crate) mod fixtures;

pub use coordinator::{BatchCoordinator, process_batch};
pub use extractor::{PhotoExtractor, extract_photos};
pub use output::{OutputDir, OutputNamer};

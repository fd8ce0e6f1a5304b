// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Segmentation pipeline — foreground mask derivation and external contour
// ranking.

pub mod preprocess;
pub mod regions;

pub use preprocess::preprocess;
pub use regions::{Region, find_regions};

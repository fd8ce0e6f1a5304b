// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Splitscan.

use thiserror::Error;

/// Top-level error type for all Splitscan operations.
#[derive(Debug, Error)]
pub enum SplitscanError {
    // -- Whole-image errors --
    #[error("failed to load source image: {0}")]
    ImageLoad(String),

    #[error("no regions found")]
    NoRegions,

    #[error("all candidate regions failed ({attempted} attempted)")]
    AllRegionsFailed { attempted: usize },

    // -- Per-region errors --
    #[error("rectification failed: {0}")]
    Rectification(String),

    #[error("failed to persist output: {0}")]
    Persistence(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    // -- Ambient --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("worker pool error: {0}")]
    WorkerPool(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// How far an error is allowed to travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Stops one source image; sibling images in the batch are unaffected.
    WholeImage,
    /// Stops one candidate region; sibling regions of the same image continue.
    Region,
}

impl SplitscanError {
    /// Classify the error for the extractor and coordinator propagation rules.
    pub fn scope(&self) -> ErrorScope {
        match self {
            Self::Rectification(_) | Self::Persistence(_) | Self::PermissionDenied(_) => {
                ErrorScope::Region
            }
            Self::ImageLoad(_)
            | Self::NoRegions
            | Self::AllRegionsFailed { .. }
            | Self::Config(_)
            | Self::WorkerPool(_)
            | Self::Io(_)
            | Self::Serialization(_) => ErrorScope::WholeImage,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SplitscanError>;

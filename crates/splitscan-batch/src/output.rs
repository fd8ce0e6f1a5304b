// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output directory handling and file naming.
//
// The output directory is the only resource shared between batch workers.
// It is created once and only ever appended to: every file is opened with
// create-new semantics, so no run can overwrite another run's photos and no
// locking is needed between workers.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use splitscan_core::error::{Result, SplitscanError};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Extension of every written photo.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// How many `-N` suffixes to try before giving up on a name collision.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Prefix of the throwaway file used to probe write permission.
const PROBE_PREFIX: &str = ".splitscan-probe-";

/// Names the photos extracted from one source image.
///
/// The timestamp is captured once per source image, so all of its photos
/// share the stem `{base}_{timestamp}` and differ only by rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNamer {
    base: String,
    stamp: String,
}

impl OutputNamer {
    /// Build a namer from the source's base name and a capture instant.
    pub fn for_source(source: &Path, captured_at: DateTime<Local>) -> Self {
        let base = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "scan".to_string());
        Self {
            base,
            stamp: captured_at.format("%Y%m%d%H%M%S%3f").to_string(),
        }
    }

    /// Millisecond-resolution timestamp shared by this source's photos.
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// `{base}_{timestamp}_{rank:02}.jpg`
    pub fn file_name(&self, rank: usize) -> String {
        format!("{}_{}_{:02}.{}", self.base, self.stamp, rank, OUTPUT_EXTENSION)
    }

    /// Collision fallback: `{base}_{timestamp}_{rank:02}-{n}.jpg`
    fn disambiguated(&self, rank: usize, n: usize) -> String {
        format!(
            "{}_{}_{:02}-{}.{}",
            self.base, self.stamp, rank, n, OUTPUT_EXTENSION
        )
    }
}

/// A prepared output directory shared by every image in a batch.
#[derive(Debug, Clone)]
pub struct OutputDir {
    path: PathBuf,
}

impl OutputDir {
    /// Create the directory if absent and resolve it to an absolute path.
    ///
    /// Idempotent: preparing an existing directory leaves its contents alone.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn prepare(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        let path = fs::canonicalize(path)?;
        info!(path = %path.display(), "output directory ready");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check that files can be created here by writing and removing a
    /// uniquely named marker file.
    pub fn probe_writable(&self) -> Result<()> {
        let marker = self.path.join(format!("{}{}", PROBE_PREFIX, Uuid::new_v4()));
        let written = fs::File::create(&marker).and_then(|mut file| file.write_all(b"probe"));
        if let Err(err) = written {
            fs::remove_file(&marker).ok();
            return Err(classify_io_error(err, &self.path));
        }
        fs::remove_file(&marker).map_err(|err| classify_io_error(err, &marker))?;
        Ok(())
    }

    /// Persist one encoded photo under the namer's name for `rank`.
    ///
    /// Probes write permission first, then creates the file exclusively. If
    /// the name is already taken a `-N` suffix is appended; existing files
    /// are never overwritten.
    #[instrument(skip(self, namer, bytes), fields(bytes = bytes.len()))]
    pub fn write_photo(&self, namer: &OutputNamer, rank: usize, bytes: &[u8]) -> Result<PathBuf> {
        self.probe_writable()?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                namer.file_name(rank)
            } else {
                namer.disambiguated(rank, attempt)
            };
            let path = self.path.join(name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "name taken, trying next suffix");
                    continue;
                }
                Err(err) => return Err(classify_io_error(err, &path)),
            };

            if let Err(err) = file.write_all(bytes).and_then(|_| file.sync_all()) {
                drop(file);
                fs::remove_file(&path).ok();
                return Err(classify_io_error(err, &path));
            }
            return Ok(path);
        }

        warn!(rank, "no free output name");
        Err(SplitscanError::Persistence(format!(
            "no free file name for {} in {}",
            namer.file_name(rank),
            self.path.display()
        )))
    }
}

/// Map an I/O failure on `path` to the per-region persistence errors.
fn classify_io_error(err: std::io::Error, path: &Path) -> SplitscanError {
    match err.kind() {
        ErrorKind::PermissionDenied => {
            SplitscanError::PermissionDenied(format!("{}: {}", path.display(), err))
        }
        _ => SplitscanError::Persistence(format!("{}: {}", path.display(), err)),
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// "Reveal in file browser" for the output directory.

use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

/// Program that opens a directory in the platform's file browser.
pub fn reveal_program() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Open `dir` in the file browser. Launch failures are logged and ignored.
pub fn reveal(dir: &Path) {
    let program = reveal_program();
    match Command::new(program).arg(dir).spawn() {
        Ok(_) => info!(program, dir = %dir.display(), "revealed output directory"),
        Err(e) => warn!(program, error = %e, "could not open file browser"),
    }
}

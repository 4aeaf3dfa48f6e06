// src/recipe/inject.rs

//! Line injection for single-file source fixes

use crate::error::{Error, Result};
use crate::recipe::filter::read_existing;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Insert `line` right after the first line whose trimmed text starts with
/// `anchor`
///
/// Returns the new content and whether the anchor was found. Later
/// occurrences of the anchor are ignored.
pub fn inject_after(content: &[u8], anchor: &str, line: &str) -> (Vec<u8>, bool) {
    let mut out = Vec::with_capacity(content.len() + line.len() + 1);
    let mut injected = false;

    for current in content.split_inclusive(|&b| b == b'\n') {
        out.extend_from_slice(current);
        if !injected && current.trim_ascii().starts_with(anchor.as_bytes()) {
            if !current.ends_with(b"\n") {
                out.push(b'\n');
            }
            out.extend_from_slice(line.as_bytes());
            out.push(b'\n');
            injected = true;
        }
    }

    (out, injected)
}

/// Inject `line` after `anchor` in the file at `path`
///
/// The whole file is read, edited in memory and written back even when the
/// anchor is absent, unless `required` is set, in which case a missing
/// anchor is an error and the file is left alone.
pub fn inject_line(path: &Path, anchor: &str, line: &str, required: bool) -> Result<bool> {
    let content = read_existing(path)?;
    let (patched, injected) = inject_after(&content, anchor, line);

    if !injected {
        if required {
            return Err(Error::RuleNotMatched {
                file: path.to_path_buf(),
                pattern: anchor.to_string(),
            });
        }
        warn!("anchor '{}' not found in {}", anchor, path.display());
    } else {
        debug!("injected '{}' into {}", line, path.display());
    }

    fs::write(path, patched)
        .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(injected)
}

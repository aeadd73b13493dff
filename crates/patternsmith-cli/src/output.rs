// crates/patternsmith-cli/src/output.rs
// ============================================================================
// Module: Output Files
// Description: Atomic artifact writes and on-disk comparison.
// Purpose: Never leave a half-written artifact in the output directory.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Outputs are written to a uniquely named temporary file next to the
//! destination, synced, and then renamed into place. On platforms without
//! atomic replace, the destination is removed before the rename.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::error::CliError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Attempts made to allocate a unique temporary file.
const TEMP_ATTEMPTS: usize = 16;
/// Per-process counter keeping temporary names unique.
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// SECTION: Writes
// ============================================================================

/// Writes `contents` to `path` through a temporary file.
///
/// Parent directories are created when missing.
///
/// # Errors
///
/// Returns [`CliError::Io`] when any filesystem step fails.
pub fn write_output(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| CliError::io(parent, &err))?;
    }
    let (temp_path, mut file) = create_temp_output(path)?;
    if let Err(err) = file.write_all(contents) {
        let _ = fs::remove_file(&temp_path);
        return Err(CliError::io(&temp_path, &err));
    }
    if let Err(err) = file.sync_all() {
        let _ = fs::remove_file(&temp_path);
        return Err(CliError::io(&temp_path, &err));
    }
    persist_temp_output(&temp_path, path)
}

/// Returns true when the file at `path` holds exactly `contents`.
///
/// A missing file counts as different.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the file exists but cannot be read.
pub fn matches_on_disk(path: &Path, contents: &[u8]) -> Result<bool, CliError> {
    match fs::read(path) {
        Ok(existing) => Ok(existing == contents),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(CliError::io(path, &err)),
    }
}

/// Creates a unique temporary output file alongside the destination.
fn create_temp_output(path: &Path) -> Result<(PathBuf, fs::File), CliError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::Invalid("output path does not include a file name".to_string()))?;
    for _ in 0 .. TEMP_ATTEMPTS {
        let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_path = parent.join(format!(".{file_name}.tmp.{}.{attempt}", std::process::id()));
        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(file) => return Ok((temp_path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(CliError::io(&temp_path, &err)),
        }
    }
    Err(CliError::Invalid("failed to allocate temporary output path".to_string()))
}

/// Moves the temporary file onto the destination.
fn persist_temp_output(temp_path: &Path, path: &Path) -> Result<(), CliError> {
    match fs::rename(temp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            if path.exists() {
                fs::remove_file(path).map_err(|err| CliError::io(path, &err))?;
                fs::rename(temp_path, path).map_err(|err| CliError::io(path, &err))?;
                return Ok(());
            }
            let _ = fs::remove_file(temp_path);
            Err(CliError::io(path, &err))
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

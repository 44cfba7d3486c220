use crate::error::CastepError;
use anyhow::{Context, Result};
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};

/// Picks the log to analyse: the explicit path if one was given, otherwise
/// the first `.castep` file in `dir`.
pub fn resolve_input(explicit: Option<PathBuf>, dir: &Path) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => find_castep_file(dir),
    }
}

/// First `*.castep` file in `dir`, in the alphabetical order `glob` yields.
///
/// `dir` is matched literally, so names like `run[1]` work.
pub fn find_castep_file(dir: &Path) -> Result<PathBuf> {
    let dir_str = dir
        .to_str()
        .with_context(|| format!("Directory path is not valid UTF-8: {:?}", dir))?;
    let pattern = Path::new(&Pattern::escape(dir_str)).join("*.castep");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("Directory path is not valid UTF-8: {:?}", dir))?;

    let first = glob(pattern)
        .context("Invalid glob pattern for .castep files")?
        .filter_map(|entry| entry.ok())
        .find(|path| path.is_file());

    first.ok_or_else(|| CastepError::NoInputFile(dir.to_path_buf()).into())
}

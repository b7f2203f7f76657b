//! Staging-directory filesystem helpers.
//!
//! The staging directory is an exclusive-use resource: it is cleared
//! before each build, either entirely (fresh clone) or except its
//! version-control metadata (so the clone's history absorbs the diff).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Remove everything inside `dir`, keeping the directory itself.
/// Creates the directory when absent.
pub fn clear_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Remove everything inside `dir` except a top-level `.git` directory.
pub fn clear_dir_except_git(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        return fs::create_dir_all(dir);
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// All regular files under `dir`, skipping `.git`, sorted for
/// deterministic iteration.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// A path relative to `base` as a `/`-separated string (the remote
/// wire-protocol path form).
pub fn relative_slash_path(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str().unwrap_or_default())
        .collect();
    Some(parts.join("/"))
}

// ============================================================================
// Tests
// ============================================================================

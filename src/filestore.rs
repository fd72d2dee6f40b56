use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use crate::foundation::error::SkinResult;

/// Filesystem operations the build relies on.
pub trait FileStore: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Copy one file, overwriting `to` and creating its parents.
    fn copy(&self, from: &Path, to: &Path) -> SkinResult<()>;

    /// Recursively copy a directory (or a single file) over `to`.
    fn mirror(&self, from: &Path, to: &Path) -> SkinResult<()>;

    /// Recursive remove. Absent paths are not an error.
    fn remove(&self, path: &Path) -> SkinResult<()>;

    /// Create `path` and its parents.
    fn create_dir(&self, path: &Path) -> SkinResult<()>;

    /// Write `contents`, creating parents.
    fn dump(&self, path: &Path, contents: &[u8]) -> SkinResult<()>;

    fn read_to_string(&self, path: &Path) -> SkinResult<String>;

    /// Files under `dir` down to `max_depth` (0 lists only direct children), sorted by path.
    fn list_files(&self, dir: &Path, max_depth: usize) -> SkinResult<Vec<PathBuf>>;

    /// Direct child directories of `dir`, sorted by path.
    fn list_dirs(&self, dir: &Path) -> SkinResult<Vec<PathBuf>>;
}

/// [`FileStore`] over the local disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn copy(&self, from: &Path, to: &Path) -> SkinResult<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory \"{}\"", parent.display()))?;
        }
        std::fs::copy(from, to).with_context(|| {
            format!("copy \"{}\" to \"{}\"", from.display(), to.display())
        })?;
        Ok(())
    }

    fn mirror(&self, from: &Path, to: &Path) -> SkinResult<()> {
        if from.is_file() {
            return self.copy(from, to);
        }
        for entry in WalkDir::new(from).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walk \"{}\"", from.display()))?;
            let rel = entry
                .path()
                .strip_prefix(from)
                .with_context(|| format!("relativise \"{}\"", entry.path().display()))?;
            let target = to.join(rel);
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)
                    .with_context(|| format!("create directory \"{}\"", target.display()))?;
            } else {
                self.copy(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> SkinResult<()> {
        if path.is_dir() {
            std::fs::remove_dir_all(path)
                .with_context(|| format!("remove directory \"{}\"", path.display()))?;
        } else if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("remove file \"{}\"", path.display()))?;
        }
        Ok(())
    }

    fn create_dir(&self, path: &Path) -> SkinResult<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("create directory \"{}\"", path.display()))?;
        Ok(())
    }

    fn dump(&self, path: &Path, contents: &[u8]) -> SkinResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory \"{}\"", parent.display()))?;
        }
        std::fs::write(path, contents)
            .with_context(|| format!("write \"{}\"", path.display()))?;
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> SkinResult<String> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read \"{}\"", path.display()))?;
        Ok(s)
    }

    fn list_files(&self, dir: &Path, max_depth: usize) -> SkinResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth.saturating_add(1)) {
            let entry = entry.with_context(|| format!("walk \"{}\"", dir.display()))?;
            if entry.file_type().is_file() {
                out.push(entry.into_path());
            }
        }
        out.sort();
        Ok(out)
    }

    fn list_dirs(&self, dir: &Path) -> SkinResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| format!("walk \"{}\"", dir.display()))?;
            if entry.file_type().is_dir() {
                out.push(entry.into_path());
            }
        }
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../tests/unit/filestore.rs"]
mod tests;

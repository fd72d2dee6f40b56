use std::path::{Path, PathBuf};

use xxhash_rust::xxh3::xxh3_64;

use crate::filestore::FileStore;
use crate::foundation::error::{SkinError, SkinResult};
use crate::paths::PathLayout;
use crate::postprocess::working_set::WorkingSet;

/// Where a strategy writes its output.
///
/// Order-dependent strategies read the whole working set while writing, so they write
/// into `temp/post-process/<strategy>/<token>` and mirror back once every image is done.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Staging {
    dir: Option<PathBuf>,
}

impl Staging {
    /// Write over the packaged images directly.
    pub fn in_place() -> Self {
        Self { dir: None }
    }

    /// A private directory keyed by a random token.
    pub fn isolated(paths: &PathLayout, strategy: &str) -> SkinResult<Self> {
        Ok(Self {
            dir: Some(paths.staging(strategy, &random_token()?)),
        })
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Output path for `original`.
    pub fn save_path(&self, original: &Path) -> PathBuf {
        match (&self.dir, original.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => original.to_path_buf(),
        }
    }

    /// Copy each staged `<file name>` over its packaged path.
    ///
    /// Absent staged files are skipped; copy failures are logged and do not fail the
    /// strategy.
    pub fn mirror_back(&self, files: &dyn FileStore, set: &WorkingSet) {
        let Some(dir) = &self.dir else {
            return;
        };
        for item in set.iter() {
            let staged = dir.join(&item.file_name);
            if !files.exists(&staged) {
                continue;
            }
            if let Err(e) = files.copy(&staged, &item.path) {
                tracing::error!(
                    staged = %staged.display(),
                    packaged = %item.path.display(),
                    "{e}"
                );
            }
        }
    }
}

/// 16 hex digits from an xxh3 of OS randomness.
pub fn random_token() -> SkinResult<String> {
    let mut seed = [0u8; 16];
    getrandom::getrandom(&mut seed)
        .map_err(|e| SkinError::render(format!("cannot read random seed: {e}")))?;
    Ok(format!("{:016x}", xxh3_64(&seed)))
}

#[cfg(test)]
#[path = "../../tests/unit/postprocess/staging.rs"]
mod tests;

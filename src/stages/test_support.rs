//! A scratch install with a rom folder, plus a subprocess that only records.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::filestore::LocalFileStore;
use crate::foundation::error::SkinResult;
use crate::names::NamesProvider;
use crate::paths::PathLayout;
use crate::postprocess::test_support::FixedAdvanceCanvas;
use crate::process::{Subprocess, SubprocessOutput, SubprocessRequest};
use crate::stages::StageEnv;

type Effect = Box<dyn Fn(&SubprocessRequest) + Send + Sync>;

/// Records each request and the files under its working directory at call time.
pub(crate) struct RecordingSubprocess {
    succeed: bool,
    effect: Option<Effect>,
    pub requests: Mutex<Vec<SubprocessRequest>>,
    pub cwd_files: Mutex<Vec<String>>,
}

impl RecordingSubprocess {
    pub fn ok() -> Self {
        Self {
            succeed: true,
            effect: None,
            requests: Mutex::new(Vec::new()),
            cwd_files: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Self::ok()
        }
    }

    /// Succeeds after running `effect`, standing in for what the tool writes.
    pub fn with_effect(effect: impl Fn(&SubprocessRequest) + Send + Sync + 'static) -> Self {
        Self {
            effect: Some(Box::new(effect)),
            ..Self::ok()
        }
    }

    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.argv.clone())
            .collect()
    }
}

impl Subprocess for RecordingSubprocess {
    fn run(&self, request: &SubprocessRequest) -> SkinResult<SubprocessOutput> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(cwd) = &request.cwd {
            let mut files = self.cwd_files.lock().unwrap();
            for entry in walkdir::WalkDir::new(cwd).into_iter().flatten() {
                if entry.file_type().is_file() {
                    let rel = entry.path().strip_prefix(cwd).unwrap();
                    files.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        if let Some(effect) = &self.effect {
            effect(request);
        }
        Ok(SubprocessOutput {
            success: self.succeed,
            stdout: String::new(),
            stderr: if self.succeed { String::new() } else { "boom".into() },
        })
    }
}

/// `<base>/roms/SNES/rom01.sfc`, `rom02.sfc` with a matching config.
pub(crate) struct Workspace {
    pub dir: tempfile::TempDir,
    pub config: AppConfig,
    pub subprocess: Arc<RecordingSubprocess>,
    pub canvas: Arc<FixedAdvanceCanvas>,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let roms = dir.path().join("roms");
        std::fs::create_dir_all(roms.join("SNES")).unwrap();
        for rom in ["rom01.sfc", "rom02.sfc"] {
            std::fs::write(roms.join("SNES").join(rom), b"").unwrap();
        }
        let mut config = AppConfig {
            rom_folder: roms,
            romset_name: "full".into(),
            skyscraper_config_folder_path: dir.path().join(".skyscraper"),
            ..AppConfig::default()
        };
        config.folders.insert("SNES".into(), "snes".into());
        config.package.insert("snes".into(), "Nintendo SNES".into());
        config.rom_extensions.insert("snes".into(), vec!["*.sfc".into()]);
        Self {
            dir,
            config,
            subprocess: Arc::new(RecordingSubprocess::ok()),
            canvas: Arc::new(FixedAdvanceCanvas::new(0.5)),
        }
    }

    pub fn with_subprocess(mut self, subprocess: RecordingSubprocess) -> Self {
        self.subprocess = Arc::new(subprocess);
        self
    }

    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    pub fn paths(&self) -> PathLayout {
        PathLayout::new(self.base(), "full")
    }

    pub fn rom(&self, name: &str) -> PathBuf {
        self.config.rom_folder.join("SNES").join(name)
    }

    /// Write `contents` at `rel` below the base directory.
    pub fn touch(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.base().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.base().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.base().join(rel).exists()
    }

    pub fn env(&self) -> StageEnv {
        StageEnv {
            config: self.config.clone(),
            paths: self.paths(),
            files: Arc::new(LocalFileStore),
            canvas: self.canvas.clone(),
            subprocess: self.subprocess.clone(),
            names: Arc::new(NamesProvider::from_map(Default::default())),
        }
    }
}

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, anyhow};
use wait_timeout::ChildExt;

use crate::foundation::error::{SkinError, SkinResult};

/// One external program invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubprocessRequest {
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl SubprocessRequest {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            cwd: None,
            timeout: None,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Program name, for messages.
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubprocessOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external tools (scraper, zip, scp, magick).
pub trait Subprocess: Send + Sync {
    fn run(&self, request: &SubprocessRequest) -> SkinResult<SubprocessOutput>;
}

/// [`Subprocess`] backed by `std::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemSubprocess;

impl Subprocess for SystemSubprocess {
    #[tracing::instrument(level = "debug", skip(self), fields(program = request.program()))]
    fn run(&self, request: &SubprocessRequest) -> SkinResult<SubprocessOutput> {
        let (program, args) = request
            .argv
            .split_first()
            .ok_or_else(|| SkinError::validation("subprocess argv must not be empty"))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &request.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {program:?} with args {args:?}"))?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match request.timeout {
            None => child.wait().context("failed to wait for process")?,
            Some(timeout) => match child
                .wait_timeout(timeout)
                .context("failed to wait with timeout")?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!("command {program:?} timed out after {timeout:?}").into());
                }
            },
        };

        Ok(SubprocessOutput {
            success: status.success(),
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

fn drain(mut stream: impl Read + Send + 'static) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

#[cfg(test)]
#[path = "../tests/unit/process.rs"]
mod tests;

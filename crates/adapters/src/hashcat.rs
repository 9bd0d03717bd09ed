// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hashcat runner.
//!
//! Spawns the cracking binary for one job and exposes a non-blocking poll of
//! its exit code. The exit code alone decides the job outcome; output is read
//! separately from the job's potfile.

use hf_core::{HashType, HashTypeError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};

/// Exit code reported for a process that ended without one (killed by a
/// signal).
pub const SIGNALLED_EXIT_CODE: i32 = -1;

#[derive(Debug, Error)]
pub enum HashcatError {
    #[error(transparent)]
    HashType(#[from] HashTypeError),
    #[error("cracking binary not found: {0}")]
    BinaryNotFound(PathBuf),
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to poll cracking process: {0}")]
    Wait(std::io::Error),
    #[error("failed to kill cracking process: {0}")]
    Kill(std::io::Error),
}

/// Inputs for one cracking run.
#[derive(Debug, Clone)]
pub struct HashcatJob<'a> {
    pub hash_type: &'a HashType,
    pub hashes: &'a Path,
    pub output: &'a Path,
    pub wordlist: &'a Path,
    pub rule: Option<&'a Path>,
}

impl HashcatJob<'_> {
    /// Straight (dictionary) attack, `hash:plain` outfile, local potfile off.
    pub fn args(&self) -> Result<Vec<OsString>, HashcatError> {
        let mode = self.hash_type.mode()?;
        let mut args: Vec<OsString> = vec![
            "-a".into(),
            "0".into(),
            "-m".into(),
            mode.to_string().into(),
            "-o".into(),
            self.output.into(),
            "--outfile-format".into(),
            "1,2".into(),
            "--potfile-disable".into(),
            "--quiet".into(),
            self.hashes.into(),
            self.wordlist.into(),
        ];
        if let Some(rule) = self.rule {
            args.push("-r".into());
            args.push(rule.into());
        }
        Ok(args)
    }

    /// Start the binary at `binary` for this job.
    pub fn spawn(&self, binary: &Path) -> Result<HashcatProcess, HashcatError> {
        let args = self.args()?;
        let child = Command::new(binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HashcatError::Spawn { binary: binary.to_path_buf(), source })?;
        tracing::debug!(binary = %binary.display(), pid = ?child.id(), "spawned cracking binary");
        Ok(HashcatProcess { child, exit_code: None })
    }
}

/// Handle to a running cracking process. Dropping it kills the process.
#[derive(Debug)]
pub struct HashcatProcess {
    child: Child,
    exit_code: Option<i32>,
}

impl HashcatProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Exit code if the process has finished, `None` while it runs.
    pub fn try_exit_code(&mut self) -> Result<Option<i32>, HashcatError> {
        if let Some(code) = self.exit_code {
            return Ok(Some(code));
        }
        let status = self.child.try_wait().map_err(HashcatError::Wait)?;
        self.exit_code = status.map(|s| s.code().unwrap_or(SIGNALLED_EXIT_CODE));
        Ok(self.exit_code)
    }

    /// Send a kill signal. Killing a process that already exited is a no-op.
    pub fn kill(&mut self) -> Result<(), HashcatError> {
        if self.try_exit_code()?.is_some() {
            return Ok(());
        }
        match self.child.start_kill() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(HashcatError::Kill(e)),
        }
    }

    /// Wait for the process to finish.
    pub async fn wait(&mut self) -> Result<i32, HashcatError> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }
        let status = self.child.wait().await.map_err(HashcatError::Wait)?;
        let code = status.code().unwrap_or(SIGNALLED_EXIT_CODE);
        self.exit_code = Some(code);
        Ok(code)
    }
}

/// Locate the cracking binary: a path with a separator must exist as given;
/// a bare name is looked up on `PATH`.
pub fn resolve_binary(binary: &Path) -> Result<PathBuf, HashcatError> {
    if binary.components().count() > 1 || binary.is_absolute() {
        return if binary.is_file() {
            Ok(binary.to_path_buf())
        } else {
            Err(HashcatError::BinaryNotFound(binary.to_path_buf()))
        };
    }
    std::env::var_os("PATH")
        .iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| HashcatError::BinaryNotFound(binary.to_path_buf()))
}

#[cfg(test)]
#[path = "hashcat_tests.rs"]
mod tests;

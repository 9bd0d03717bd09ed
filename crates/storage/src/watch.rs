// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change subscriptions over one instance's folder.
//!
//! Two implementations share one event handler: the platform's native
//! watcher, and a polling watcher that compares file contents for shared
//! filesystems that do not deliver native events.

use crate::atomic::is_temp_file;
use crate::layout::record_for_path;
use crate::StorageError;
use hf_core::JobId;
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 256;

/// Which record under the watched instance changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataChange {
    Instance,
    Job(JobId),
}

/// Classify a changed path against the records of the instance at
/// `instance_dir`.
pub fn classify(instance_dir: &Path, path: &Path) -> Option<MetadataChange> {
    if is_temp_file(path) {
        return None;
    }
    match record_for_path(instance_dir, path)? {
        None => Some(MetadataChange::Instance),
        Some(job) => Some(MetadataChange::Job(job)),
    }
}

/// How a subscription learns about changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Native,
    Poll { interval: Duration },
}

impl WatchMode {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Name accepted by `FromStr`. The poll interval is not carried.
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchMode::Native => "native",
            WatchMode::Poll { .. } => "poll",
        }
    }
}

impl FromStr for WatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(WatchMode::Native),
            "poll" => Ok(WatchMode::Poll { interval: Self::DEFAULT_POLL_INTERVAL }),
            other => Err(format!("unknown watch mode: {other}")),
        }
    }
}

/// A live subscription. Dropping it stops the watcher.
pub struct Subscription {
    rx: mpsc::Receiver<MetadataChange>,
    _watcher: Box<dyn Watcher + Send>,
}

impl Subscription {
    pub(crate) fn start(instance_dir: PathBuf, mode: WatchMode) -> Result<Self, StorageError> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let dir = instance_dir.clone();
        let handler = move |res: Result<NotifyEvent, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "watch error");
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }
            for path in &event.paths {
                if let Some(change) = classify(&dir, path) {
                    let _ = tx.blocking_send(change);
                }
            }
        };

        let mut watcher: Box<dyn Watcher + Send> = match mode {
            WatchMode::Native => Box::new(notify::recommended_watcher(handler)?),
            WatchMode::Poll { interval } => {
                let config = notify::Config::default()
                    .with_poll_interval(interval)
                    .with_compare_contents(true);
                Box::new(notify::PollWatcher::new(handler, config)?)
            }
        };
        watcher.watch(&instance_dir, RecursiveMode::Recursive)?;
        tracing::debug!(dir = %instance_dir.display(), ?mode, "watching instance");

        Ok(Self { rx, _watcher: watcher })
    }

    /// Next change, or `None` once the watcher has shut down.
    pub async fn recv(&mut self) -> Option<MetadataChange> {
        self.rx.recv().await
    }

    /// Next change if one is already buffered.
    pub fn try_recv(&mut self) -> Option<MetadataChange> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always available. With the `file-logging` feature,
//! [`init_logging`] also writes per-crate files into a timestamped run folder
//! and prunes old runs.

use anyhow::{anyhow, Result};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;

/// Build the filter for `debug_flags` over `base_level`
pub fn build_filter(debug_flags: &CrateDebugFlags, base_level: &str) -> Result<EnvFilter> {
    let directives = debug_flags.to_filter_string(base_level);
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow!("Invalid log filter '{}': {}", directives, e))
}

/// Install a console subscriber
///
/// # Errors
///
/// Fails on an unparseable `base_level` or when a global subscriber is
/// already installed.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, base_level: &str) -> Result<()> {
    let filter = build_filter(debug_flags, base_level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug_flags.any_enabled())
        .finish()
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}

#[cfg(feature = "file-logging")]
pub use file::*;

#[cfg(feature = "file-logging")]
mod file {
    use std::path::{Path, PathBuf};

    use anyhow::{anyhow, Context, Result};
    use chrono::{DateTime, NaiveDateTime, Utc};
    use tracing_appender::non_blocking::WorkerGuard;
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer, Registry};

    use super::build_filter;
    use crate::cli::CrateDebugFlags;

    const RUN_PREFIX: &str = "run_";
    const RUN_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Keeps the file writers alive; logs are flushed when dropped
    pub struct LoggingGuard {
        _file_guards: Vec<WorkerGuard>,
        log_dir: PathBuf,
    }

    impl LoggingGuard {
        /// Run folder of this process
        pub fn log_dir(&self) -> &Path {
            &self.log_dir
        }
    }

    /// Retention policy for old run folders
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Retention {
        pub days: u64,
        pub runs: usize,
    }

    impl Default for Retention {
        fn default() -> Self {
            Self { days: 30, runs: 10 }
        }
    }

    /// Initialize console and file logging
    ///
    /// ```text
    /// <log_dir>/
    ///   └── run_20250101_120000/
    ///       ├── spikeconv-connectivity.log
    ///       └── spikeconv.log (combined)
    /// ```
    pub fn init_logging(
        debug_flags: &CrateDebugFlags,
        base_level: &str,
        log_dir: &Path,
        retention: Retention,
    ) -> Result<LoggingGuard> {
        let run_folder = log_dir.join(run_folder_name(Utc::now()));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_logs(log_dir, retention, Utc::now())?;

        let mut layers = Vec::new();
        let mut file_guards = Vec::new();

        layers.push(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_filter(build_filter(debug_flags, base_level)?)
                .boxed(),
        );

        for crate_name in crate::KNOWN_CRATES.iter().filter(|c| **c != crate::NETWORK_TARGET) {
            let appender = rolling::never(&run_folder, format!("{}.log", crate_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_guards.push(guard);

            let crate_filter = EnvFilter::try_new(format!("{}=debug,off", crate_name))
                .map_err(|e| anyhow!("Invalid log filter for {}: {}", crate_name, e))?;
            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(crate_filter)
                    .boxed(),
            );
        }

        let combined = rolling::never(&run_folder, "spikeconv.log");
        let (writer, guard) = tracing_appender::non_blocking(combined);
        file_guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(build_filter(debug_flags, base_level)?)
                .boxed(),
        );

        Registry::default()
            .with(layers)
            .try_init()
            .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

        Ok(LoggingGuard {
            _file_guards: file_guards,
            log_dir: run_folder,
        })
    }

    pub(crate) fn run_folder_name(at: DateTime<Utc>) -> String {
        format!("{}{}", RUN_PREFIX, at.format(RUN_FORMAT))
    }

    pub(crate) fn parse_run_folder(name: &str) -> Option<DateTime<Utc>> {
        let stamp = name.strip_prefix(RUN_PREFIX)?;
        NaiveDateTime::parse_from_str(stamp, RUN_FORMAT)
            .ok()
            .map(|dt| dt.and_utc())
    }

    /// Runs to delete: older than `retention.days`, then the oldest beyond
    /// `retention.runs`. `runs` must be sorted oldest first.
    pub(crate) fn expired_runs(
        runs: &[(PathBuf, DateTime<Utc>)],
        retention: Retention,
        now: DateTime<Utc>,
    ) -> Vec<PathBuf> {
        let cutoff = now - chrono::Duration::days(retention.days as i64);
        let (old, recent): (Vec<_>, Vec<_>) = runs.iter().partition(|(_, dt)| *dt < cutoff);
        let surplus = recent.len().saturating_sub(retention.runs);

        old.into_iter()
            .chain(recent.into_iter().take(surplus))
            .map(|(path, _)| path.clone())
            .collect()
    }

    fn cleanup_old_logs(base_log_dir: &Path, retention: Retention, now: DateTime<Utc>) -> Result<()> {
        if !base_log_dir.exists() {
            return Ok(());
        }

        let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let stamp = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_run_folder);
            if let Some(dt) = stamp {
                runs.push((path, dt));
            }
        }
        runs.sort_by_key(|(_, dt)| *dt);

        for path in expired_runs(&runs, retention, now) {
            if let Err(e) = std::fs::remove_dir_all(&path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_debug_flags() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-spikeconv-connectivity".to_string()]);
        assert!(build_filter(&flags, "warn").is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage_level() {
        assert!(build_filter(&CrateDebugFlags::default(), "spikeconv=loudest").is_err());
    }
}

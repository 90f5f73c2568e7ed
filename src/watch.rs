//! Directory watcher that converts every new `.json` export it sees.
//!
//! Files already present at startup are ignored. A created (or renamed-in)
//! file is converted once that file has seen no events for the settle
//! period, so exports still being written are not picked up half-way.
//! Activity on other files does not delay it.
//! Failed conversions are logged and never retried.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{error, info, warn};

use crate::config::{CsvConfig, CsvFormat};
use crate::convert::{ConversionSummary, convert_file};
use crate::error::{ConvertError, Result};
use crate::pivot::TimestampOrder;

pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: CsvFormat,
    pub timestamp_order: TimestampOrder,
    pub settle: Duration,
}

impl WatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            format: CsvFormat::default(),
            timestamp_order: TimestampOrder::default(),
            settle: DEFAULT_SETTLE,
        }
    }
}

/// Whether `path` names a trend export (`.json`, case-sensitive).
pub fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// `<output_dir>/<stem>.csv` for an input file.
pub fn output_path_for(input: &Path, output_dir: &Path) -> Option<PathBuf> {
    let mut name = input.file_stem()?.to_os_string();
    name.push(".csv");
    Some(output_dir.join(name))
}

/// Converts one newly seen file, logging the outcome.
pub fn handle_new_file(path: &Path, config: &WatchConfig) -> Option<ConversionSummary> {
    let output = output_path_for(path, &config.output_dir)?;
    let csv = CsvConfig::new(config.format, output);

    match convert_file(path, &csv, config.timestamp_order) {
        Ok(summary) => {
            info!(
                input = %path.display(),
                output = %summary.output.display(),
                rows = summary.rows,
                "conversion succeeded"
            );
            Some(summary)
        }
        Err(e) => {
            error!(input = %path.display(), "conversion failed: {e}");
            None
        }
    }
}

/// Quiet-period tracking for newly seen exports, one deadline per path.
#[derive(Debug)]
pub struct Debouncer {
    settle: Duration,
    pending: BTreeMap<PathBuf, Instant>,
}

impl Debouncer {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            pending: BTreeMap::new(),
        }
    }

    /// Records an event. Creations and renames start tracking a `.json`
    /// path; any other event on a tracked path restarts its quiet period.
    pub fn observe(&mut self, event: Event, now: Instant) {
        let added = matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(_))
        );
        for path in event.paths.into_iter().filter(|p| is_json(p)) {
            if added {
                self.pending.insert(path, now);
            } else if let Some(seen) = self.pending.get_mut(&path) {
                *seen = now;
            }
        }
    }

    /// Time until the earliest tracked path becomes due.
    pub fn next_wait(&self, now: Instant) -> Duration {
        self.pending
            .values()
            .map(|seen| (*seen + self.settle).saturating_duration_since(now))
            .min()
            .unwrap_or(self.settle)
    }

    /// Removes and returns every path quiet for at least the settle period.
    pub fn take_due(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut due = Vec::new();
        self.pending.retain(|path, seen| {
            let quiet = now.saturating_duration_since(*seen) >= self.settle;
            if quiet {
                due.push(path.clone());
            }
            !quiet
        });
        due
    }
}

/// Watches `config.input_dir` until the watcher channel closes.
pub fn watch(config: &WatchConfig) -> Result<()> {
    fs::create_dir_all(&config.output_dir).map_err(|source| ConvertError::OutputDirectory {
        path: config.output_dir.clone(),
        source,
    })?;

    let watch_error = |source| ConvertError::Watch {
        path: config.input_dir.clone(),
        source,
    };
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx).map_err(watch_error)?;
    watcher
        .watch(&config.input_dir, RecursiveMode::NonRecursive)
        .map_err(watch_error)?;

    info!(
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        "watching for new JSON files"
    );

    let mut debouncer = Debouncer::new(config.settle);
    loop {
        match rx.recv_timeout(debouncer.next_wait(Instant::now())) {
            Ok(Ok(event)) => debouncer.observe(event, Instant::now()),
            Ok(Err(e)) => warn!("watch error: {e}"),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
        }

        for path in debouncer.take_due(Instant::now()) {
            if path.is_file() {
                handle_new_file(&path, config);
            }
        }
    }
}

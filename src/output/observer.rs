//! Abstract download progress events.
//!
//! The download executor reports per-task byte progress through this trait;
//! the terminal rendering lives behind it and can be swapped out or dropped
//! entirely (quiet mode, tests).

use std::collections::HashMap;
use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Consumer of download progress events.
pub trait ProgressObserver: Send + Sync {
    /// A download task started streaming. `total_bytes` is the declared
    /// content length when known.
    fn task_started(&self, label: &str, total_bytes: Option<u64>);

    /// A chunk of `bytes_delta` bytes was written.
    fn task_advanced(&self, label: &str, bytes_delta: u64);

    /// The task finished, successfully or not.
    fn task_finished(&self, label: &str);
}

/// Observer that ignores all events.
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn task_started(&self, _label: &str, _total_bytes: Option<u64>) {}
    fn task_advanced(&self, _label: &str, _bytes_delta: u64) {}
    fn task_finished(&self, _label: &str) {}
}

/// Observer rendering one indicatif bar per in-flight task.
pub struct IndicatifObserver {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl IndicatifObserver {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-")
    }
}

impl Default for IndicatifObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for IndicatifObserver {
    fn task_started(&self, label: &str, total_bytes: Option<u64>) {
        let bar = self.multi.add(ProgressBar::new(total_bytes.unwrap_or(0)));
        bar.set_style(Self::bar_style());
        bar.set_message(label.to_string());
        self.bars.lock().unwrap().insert(label.to_string(), bar);
    }

    fn task_advanced(&self, label: &str, bytes_delta: u64) {
        if let Some(bar) = self.bars.lock().unwrap().get(label) {
            bar.inc(bytes_delta);
        }
    }

    fn task_finished(&self, label: &str) {
        if let Some(bar) = self.bars.lock().unwrap().remove(label) {
            bar.finish_and_clear();
        }
    }
}

//! Colored terminal progress reporting for a batch run. Library crates
//! never print; this sink is the only place colored output happens.

use std::sync::Mutex;

use colored::Colorize;
use recspec_types::ProgressSink;

/// Renders one progress line per call, prefixed with the file's display
/// name so a `concurrency > 1` run's interleaved progress stays
/// attributable.
pub struct ColoredProgressSink {
    names: Vec<String>,
    last_reported: Mutex<Vec<f32>>,
}

impl ColoredProgressSink {
    pub fn new(names: Vec<String>) -> Self {
        let last_reported = Mutex::new(vec![-1.0; names.len()]);
        Self { names, last_reported }
    }

    fn display_name(&self, index: usize) -> &str {
        self.names.get(index).map(String::as_str).unwrap_or("?")
    }
}

impl ProgressSink for ColoredProgressSink {
    fn report(&self, index: usize, message: &str, progress: f32) {
        let mut last = self.last_reported.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = last.get_mut(index) {
            // Collapse runs of identical percentages so a per-sample scan
            // doesn't flood the terminal with a line per poll interval.
            let pct = (progress * 100.0).round();
            if (*slot - pct).abs() < 1.0 {
                return;
            }
            *slot = pct;
        }
        eprintln!(
            "  {} {} {}",
            format!("[{}]", self.display_name(index)).dimmed(),
            message.cyan(),
            format!("{:.0}%", progress * 100.0).dimmed()
        );
    }
}

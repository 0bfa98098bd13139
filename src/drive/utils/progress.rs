use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::drive::utils::size::format_size;

/// A minimal progress reporter that prints percentage updates to stdout.
pub struct ConsoleProgressReporter {
    label: String,
    total_bytes: Option<u64>,
    step_bytes: u64,
    next_report: u64,
}

impl ConsoleProgressReporter {
    pub fn new(label: impl Into<String>, total_bytes: Option<u64>, step_bytes: u64) -> Self {
        let step_bytes = step_bytes.max(1);
        Self {
            label: label.into(),
            total_bytes,
            step_bytes,
            next_report: step_bytes,
        }
    }

    /// Print progress if the next reporting threshold has been crossed.
    pub fn maybe_report(&mut self, processed_bytes: u64) {
        let Some(total) = self.total_bytes.filter(|total| *total > 0) else {
            return;
        };
        if processed_bytes < self.next_report {
            return;
        }
        while self.next_report <= processed_bytes {
            self.next_report += self.step_bytes;
        }
        print!("\r {}: {}%", self.label, percent(processed_bytes, total));
        let _ = io::stdout().flush();
    }

    /// Terminate the progress line once the transfer is complete.
    pub fn finish(&mut self, processed_bytes: u64) {
        if self.next_report > self.step_bytes {
            // Something was printed on the current line
            let total = self.total_bytes.unwrap_or(processed_bytes);
            println!("\r {}: {}%", self.label, percent(processed_bytes, total));
        }
    }
}

fn percent(processed: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    (processed.saturating_mul(100) / total).min(100)
}

/// Completion line with size, elapsed time and throughput.
pub fn transfer_summary(bytes: u64, elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    let speed = if seconds > 0.0 {
        (bytes as f64 / seconds) as u64
    } else {
        bytes
    };
    format!(
        "File size: {}, Time taken: {seconds:.2} seconds, Speed: {}/s",
        format_size(bytes),
        format_size(speed)
    )
}

/// Tracks the elapsed time of a single transfer.
pub struct TransferTimer {
    started: Instant,
}

impl TransferTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn summary(&self, bytes: u64) -> String {
        transfer_summary(bytes, self.started.elapsed())
    }
}

//! Phase timing for a generation run
//!
//! Each pipeline step (metadata, download, introspection, rendering,
//! validation) is timed and the breakdown is logged at debug level when the
//! run finishes.

use std::time::{Duration, Instant};

/// Timings of one generation run
#[derive(Debug)]
pub struct GenerationMetrics {
    /// When measurement started
    start: Instant,
    /// Individual phase timings in execution order
    phases: Vec<(String, Duration)>,
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationMetrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            phases: Vec::new(),
        }
    }

    /// Add a phase timing
    pub fn add_phase(&mut self, name: impl Into<String>, duration: Duration) {
        self.phases.push((name.into(), duration));
    }

    /// Time a closure and record it as a phase
    pub fn time_phase<F, R>(&mut self, name: impl Into<String>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let phase_start = Instant::now();
        let result = f();
        self.phases.push((name.into(), phase_start.elapsed()));
        result
    }

    /// Recorded phases
    pub fn phases(&self) -> &[(String, Duration)] {
        &self.phases
    }

    /// Duration of a named phase
    pub fn phase(&self, name: &str) -> Option<Duration> {
        self.phases
            .iter()
            .find(|(phase, _)| phase == name)
            .map(|(_, d)| *d)
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Format a duration for display
    fn format_duration(d: Duration) -> String {
        let ms = d.as_secs_f64() * 1000.0;
        if ms < 1.0 {
            format!("{}µs", d.as_micros())
        } else if ms < 1000.0 {
            format!("{:.2}ms", ms)
        } else {
            format!("{:.2}s", d.as_secs_f64())
        }
    }

    /// Generate a formatted timing report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();
        lines.push("=== Generation Timing ===".to_string());
        lines.push(format!(
            "Total elapsed: {}",
            Self::format_duration(self.elapsed())
        ));

        if !self.phases.is_empty() {
            lines.push(String::new());
            lines.push("--- Phases ---".to_string());
            for (name, duration) in &self.phases {
                lines.push(format!(
                    "  {:<20} {:>10}",
                    name,
                    Self::format_duration(*duration)
                ));
            }
        }

        lines.push("=".repeat(40));
        lines.join("\n")
    }

    /// Log the report using tracing
    pub fn log_report(&self) {
        for line in self.report().lines() {
            if line.is_empty() {
                continue;
            }
            tracing::debug!(target: "tapgen::metrics", "{}", line);
        }
    }
}

//! Progress reporting for file operations.
//!
//! The pipeline only talks to [`ProgressReporter`]. The binary picks the
//! implementation once at startup: an indicatif bar on interactive terminals, a
//! plain counter line otherwise.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Write};

/// Receives completed/total updates, one unit per file operation.
pub trait ProgressReporter {
    /// Begins a phase with a known number of units.
    fn start(&mut self, total: u64, label: &str);
    /// Marks one unit as done.
    fn advance(&mut self);
    /// Ends the current phase.
    fn finish(&mut self);
}

/// Picks the progress implementation for this process.
pub fn select(plain: bool) -> Box<dyn ProgressReporter> {
    if plain || !std::io::stderr().is_terminal() {
        Box::new(LineProgress::new(std::io::stderr()))
    } else {
        Box::new(BarProgress::default())
    }
}

/// Progress bar drawn with indicatif.
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl ProgressReporter for BarProgress {
    fn start(&mut self, total: u64, label: &str) {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        let bar = ProgressBar::new(total);
        bar.set_style(style);
        bar.set_message(label.to_string());
        if let Some(old) = self.bar.replace(bar) {
            old.finish_and_clear();
        }
    }

    fn advance(&mut self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}

/// Counter printed on a single line, redrawn at most once per percent.
pub struct LineProgress<W: Write> {
    out: W,
    label: String,
    total: u64,
    done: u64,
    last_printed: u64,
}

impl<W: Write> LineProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            label: String::new(),
            total: 0,
            done: 0,
            last_printed: 0,
        }
    }

    /// Consumes the reporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn step(&self) -> u64 {
        (self.total / 100).max(1)
    }
}

impl<W: Write> ProgressReporter for LineProgress<W> {
    fn start(&mut self, total: u64, label: &str) {
        self.label = label.to_string();
        self.total = total;
        self.done = 0;
        self.last_printed = 0;
        let _ = write!(self.out, "{}: 0/{}", self.label, self.total);
        let _ = self.out.flush();
    }

    fn advance(&mut self) {
        self.done += 1;
        if self.done - self.last_printed >= self.step() {
            let _ = write!(self.out, "\r{}: {}/{}", self.label, self.done, self.total);
            let _ = self.out.flush();
            self.last_printed = self.done;
        }
    }

    fn finish(&mut self) {
        let _ = writeln!(
            self.out,
            "\r{}: {}/{} - Done!",
            self.label, self.done, self.total
        );
        let _ = self.out.flush();
    }
}

/// Reporter that shows nothing.
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn start(&mut self, _total: u64, _label: &str) {}
    fn advance(&mut self) {}
    fn finish(&mut self) {}
}

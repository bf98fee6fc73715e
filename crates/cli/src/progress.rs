//! Spinner shown while waiting on the backend

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// A single network wait backed by an indicatif spinner.
///
/// Create with [`Step::new`], then call [`Step::finish`] or [`Step::fail`]
/// when the call returns. On a non-TTY the spinner draws nothing, but the
/// finish lines are still emitted via `eprintln!`.
pub struct Step {
    pb: ProgressBar,
    label: String,
}

impl Step {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("  {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("{}...", label));
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { pb, label }
    }

    /// Clears the spinner without printing anything.
    pub fn done(&self) {
        self.pb.finish_and_clear();
    }

    /// Prints `"  label... done"`.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
        eprintln!("  {}... {}", self.label, "done".green());
    }

    /// Prints `"  label... failed"`.
    pub fn fail(&self) {
        self.pb.finish_and_clear();
        eprintln!("  {}... {}", self.label, "failed".red());
    }

    /// Runs `f` under the spinner, clearing it either way.
    pub fn run<T, E>(label: impl Into<String>, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let step = Step::new(label);
        let result = f();
        step.done();
        result
    }
}

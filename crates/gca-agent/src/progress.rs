//! Terminal spinner shown while the completion service is working.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Spinner factory; draws on stderr so stdout stays reserved for the generated code.
pub struct GenerationProgress {
    enabled: bool,
}

/// A running spinner, cleared when dropped.
pub struct Spinner {
    bar: ProgressBar,
}

impl GenerationProgress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Start spinning with a message until the returned guard is dropped.
    pub fn start(&self, msg: &str) -> Spinner {
        let bar = if self.enabled {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())
        } else {
            ProgressBar::hidden()
        };
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg} [{elapsed}]")
                .expect("valid template"),
        );
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Spinner { bar }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

//! Loading spinner shown while waiting for the first byte

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_CHARS: &[&str] = &["⣾ ", "⣽ ", "⣻ ", "⢿ ", "⡿ ", "⣟ ", "⣯ ", "⣷ "];

pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start() -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner}Loading")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICK_CHARS);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Spinner { bar }
    }

    /// Must run before the first response byte prints; leaves the line clean
    pub fn stop(self) {
        self.bar.finish_and_clear();
    }
}

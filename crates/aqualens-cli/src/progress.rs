use indicatif::{ProgressBar, ProgressStyle};

use aqualens_core::pipeline::types::{MessageKey, ProgressSink};

/// Adapts the engine's progress callback to an indicatif bar.
pub struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:32} [{bar:40}] {pos:>3}%")
                .expect("static template parses")
                .progress_chars("=> "),
        );
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarSink {
    fn report(&self, key: MessageKey, percent: u8) {
        self.bar.set_position(percent as u64);
        self.bar.set_message(key.to_string());
    }
}

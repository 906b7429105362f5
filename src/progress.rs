//! Terminal progress bars for console reads and writes

use avrterm_term::Progress;
use indicatif::{ProgressBar, ProgressStyle};

/// Draws an indicatif bar for each labelled phase
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(&mut self, total: usize, label: &str) {
        let pb = ProgressBar::new(total as u64);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(e) => log::debug!("progress template: {}", e),
        }
        pb.set_message(label.to_string());
        self.bar = Some(pb);
    }
}

impl Progress for BarProgress {
    fn report(&mut self, step: usize, total: usize, label: Option<&str>) {
        if let Some(label) = label {
            self.start(total, label);
        }
        if let Some(pb) = &self.bar {
            pb.set_length(total as u64);
            pb.set_position(step as u64);
            if step >= total {
                pb.finish_and_clear();
                self.bar = None;
            }
        }
    }
}

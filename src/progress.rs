//! Optional terminal progress bar over the candidate list.

use indicatif::{ProgressBar, ProgressStyle};

fn count_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
         elapsed: {elapsed_precise}  eta: {eta_precise}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏  ")
}

/// Count-style progress (items processed out of total). A disabled scope is a
/// hidden bar, so callers never branch on whether progress is shown.
pub struct ProgressScope {
    pb: ProgressBar,
}

impl ProgressScope {
    pub fn count(label: impl Into<String>, total: u64, enabled: bool) -> Self {
        if !enabled {
            return Self { pb: ProgressBar::hidden() };
        }
        let pb = ProgressBar::new(total);
        pb.set_style(count_style());
        let label = label.into();
        if !label.is_empty() {
            pb.set_message(label);
        }
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    #[inline]
    pub fn inc(&self) {
        self.pb.inc(1);
    }

    pub fn finish(&self, msg: impl Into<String>) {
        self.pb.finish_with_message(msg.into());
    }
}

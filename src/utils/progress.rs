//! Progress indicators for long-running operations
//!
//! The only long-running step of a `generate` run is downloading a generator
//! artifact. [`ProgressBar`] wraps `indicatif` with the styles used for that
//! download and for the spinner shown while rendering.
//!
//! # Environment Variables
//!
//! - `DEPLOYKF_NO_PROGRESS`: Set to any value to disable all progress indicators
//!
//! Progress output also disappears when `--no-progress` is passed (which sets the
//! variable for the rest of the process) and when stderr is not a terminal, since
//! `indicatif` draws nothing in that case.
//!
//! # Examples
//!
//! ```rust,no_run
//! use deploykf_cli::utils::progress::ProgressBar;
//!
//! let progress = ProgressBar::new_download(Some(1024), "deploykf-0.1.5-generator.zip");
//! progress.inc(512);
//! progress.inc(512);
//! progress.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Environment variable that disables progress output.
pub const NO_PROGRESS_ENV: &str = "DEPLOYKF_NO_PROGRESS";

fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// A progress indicator that is hidden when progress output is disabled.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Creates a byte-count bar for a download.
    ///
    /// When the server did not announce a length a spinner counting bytes is shown
    /// instead.
    pub fn new_download(total_bytes: Option<u64>, name: &str) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            match total_bytes {
                Some(len) => {
                    let bar = IndicatifBar::new(len);
                    bar.set_style(download_style());
                    bar
                }
                None => {
                    let bar = IndicatifBar::new_spinner();
                    bar.set_style(download_spinner_style());
                    bar.enable_steady_tick(Duration::from_millis(100));
                    bar
                }
            }
        };
        bar.set_prefix(name.to_string());

        Self {
            inner: bar,
        }
    }

    /// Creates a spinner for work of unknown length.
    pub fn new_spinner(msg: impl Into<String>) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        bar.set_message(msg.into());

        Self {
            inner: bar,
        }
    }

    /// Advances the bar by `delta` units (bytes for downloads).
    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    /// Current position of the bar.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Finishes the bar and removes it from the screen.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

fn download_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
}

fn download_spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{prefix:.bold.cyan} {spinner:.cyan} {bytes}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal progress bars and logger setup for the `delitos` binary.
//!
//! [`init_logger`] routes `pretty_env_logger` through
//! `indicatif-log-bridge`, so log lines print above the bars instead of
//! tearing them. When stderr is not a terminal the bars are replaced by
//! [`LogProgress`].

use std::io::IsTerminal as _;
use std::sync::Arc;
use std::time::Duration;

use delitos_source::progress::{LogProgress, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Color of a bar, one per kind of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    /// Pipeline stages.
    Stages,
    /// Files in a batch.
    Files,
}

impl BarKind {
    const fn color(self) -> &'static str {
        match self {
            Self::Stages => "cyan",
            Self::Files => "yellow",
        }
    }
}

/// A spinner that turns into a bar once its length is known.
pub struct IndicatifProgress {
    bar: ProgressBar,
    sized_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Adds a spinner to `multi`.
    #[must_use]
    pub fn new(multi: &MultiProgress, message: &str, kind: BarKind) -> Self {
        let color = kind.color();

        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_style(
            ProgressStyle::with_template(&format!("{{spinner:.{color}}} {{msg}}"))
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let sized_style = ProgressStyle::with_template(&format!(
            "  {{msg}} {{wide_bar:.{color}/dim}} {{pos}}/{{len}} [{{elapsed_precise}}]"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");

        Self { bar, sized_style }
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.sized_style.clone());
        self.bar.set_length(total);
        self.bar.reset();
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// A progress sink for one step: a bar on a terminal, log lines otherwise.
#[must_use]
pub fn progress(multi: &MultiProgress, message: &str, kind: BarKind) -> Arc<dyn ProgressCallback> {
    if std::io::stderr().is_terminal() {
        Arc::new(IndicatifProgress::new(multi, message, kind))
    } else {
        log::info!("{message}");
        Arc::new(LogProgress::default())
    }
}

/// Installs the global logger. The filter comes from `RUST_LOG` and
/// defaults to `info`.
///
/// Every progress bar must be added to the returned [`MultiProgress`].
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let max_level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(max_level);
    }

    multi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_accept_progress_updates() {
        let multi = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        let bar = IndicatifProgress::new(&multi, "Loading", BarKind::Files);
        bar.set_total(3);
        bar.inc(2);
        bar.set_message("almost".to_string());
        bar.finish("done".to_string());
    }

    #[test]
    fn kinds_have_distinct_colors() {
        assert_ne!(BarKind::Stages.color(), BarKind::Files.color());
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal progress and logging for the `crime_dash` binary.
//!
//! A dataset load reports rows as pages arrive. Loads that page by offset
//! never learn a total and stay a spinner. Loads partitioned by year know
//! their year count up front and switch to a bar of years done.

use std::sync::Arc;
use std::time::Duration;

use crime_dash_source::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

const ROWS_TEMPLATE: &str = "{spinner:.cyan} [{prefix}] {human_pos} rows {msg} [{elapsed}]";
const YEARS_TEMPLATE: &str = "  [{prefix}] {wide_bar:.cyan/dim} {pos}/{len} years [{eta}]";
const DATASETS_TEMPLATE: &str = "{msg} {wide_bar:.green/dim} {pos}/{len} [{elapsed_precise}]";

fn style(template: &str, fallback: fn() -> ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| fallback())
        .progress_chars("##-")
}

/// A [`ProgressBar`] driven by the loader's [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Applied when [`ProgressCallback::set_total`] reports a length.
    sized_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Progress for loading `dataset_id`: a row spinner that becomes a
    /// year bar if the load announces how many years it will request.
    #[must_use]
    pub fn dataset_bar(multi: &MultiProgress, dataset_id: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(style(ROWS_TEMPLATE, ProgressStyle::default_spinner));
        bar.set_prefix(dataset_id.to_string());

        Arc::new(Self {
            bar,
            sized_style: style(YEARS_TEMPLATE, ProgressStyle::default_bar),
        })
    }

    /// Counts finished datasets out of `total`.
    #[must_use]
    pub fn datasets_bar(multi: &MultiProgress, total: u64) -> Arc<dyn ProgressCallback> {
        let sized_style = style(DATASETS_TEMPLATE, ProgressStyle::default_bar);
        let bar = multi.add(ProgressBar::new(total).with_style(sized_style.clone()));
        bar.set_message("Datasets");

        Arc::new(Self { bar, sized_style })
    }

    #[cfg(test)]
    fn hidden(total: Option<u64>) -> Self {
        let bar = ProgressBar::hidden();
        if let Some(total) = total {
            bar.set_length(total);
        }
        Self {
            bar,
            sized_style: style(YEARS_TEMPLATE, ProgressStyle::default_bar),
        }
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.sized_style.clone());
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

/// Installs `pretty_env_logger` behind `indicatif-log-bridge` so log lines
/// print above the bars instead of through them. `RUST_LOG` picks the
/// level; without it, `info` and above are shown.
///
/// Returns the [`MultiProgress`] every bar must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_err()
    {
        log::debug!("Logger already installed");
    }
    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_total_resets_the_row_count() {
        let progress = IndicatifProgress::hidden(None);
        progress.inc(500);

        progress.set_total(24);
        progress.inc(1);

        assert_eq!(progress.bar.length(), Some(24));
        assert_eq!(progress.bar.position(), 1);
    }

    #[test]
    fn finish_keeps_the_final_count() {
        let progress = IndicatifProgress::hidden(Some(2));
        progress.inc(2);
        progress.finish("Datasets loaded".to_string());

        assert!(progress.bar.is_finished());
        assert_eq!(progress.bar.position(), 2);
    }
}

//! Time windows and bucket key derivation.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Reporting window for page view counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsWindow {
    /// Current calendar hour
    Hour,
    /// Current calendar day
    Day,
    /// Current ISO week
    Week,
}

impl StatsWindow {
    /// Expiry applied to a bucket of this window on the remote store.
    pub fn ttl(&self) -> Duration {
        match self {
            StatsWindow::Hour => Duration::from_secs(3600),
            StatsWindow::Day => Duration::from_secs(86400),
            StatsWindow::Week => Duration::from_secs(604800),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatsWindow::Hour => "hour",
            StatsWindow::Day => "day",
            StatsWindow::Week => "week",
        }
    }

    /// Truncate `now` to this window.
    ///
    /// Uses `%G`/`%V` for weeks so that the ISO year is used around
    /// new year (2024-12-30 belongs to 2025W01).
    pub fn truncate(&self, now: DateTime<Utc>) -> String {
        let format = match self {
            StatsWindow::Hour => "%Y%m%d%H",
            StatsWindow::Day => "%Y%m%d",
            StatsWindow::Week => "%GW%V",
        };
        now.format(format).to_string()
    }

    /// Build the bucket key for this window at `now`.
    pub fn bucket_key(&self, prefix: &str, now: DateTime<Utc>) -> String {
        format!("{}{}_{}", prefix, self.label(), self.truncate(now))
    }
}

/// The three bucket keys an event at a given instant belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketKeys {
    pub hour: String,
    pub day: String,
    pub week: String,
}

impl BucketKeys {
    pub fn at(prefix: &str, now: DateTime<Utc>) -> Self {
        Self {
            hour: StatsWindow::Hour.bucket_key(prefix, now),
            day: StatsWindow::Day.bucket_key(prefix, now),
            week: StatsWindow::Week.bucket_key(prefix, now),
        }
    }

    /// Keys paired with their window, in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (StatsWindow, &str)> {
        [
            (StatsWindow::Hour, self.hour.as_str()),
            (StatsWindow::Day, self.day.as_str()),
            (StatsWindow::Week, self.week.as_str()),
        ]
        .into_iter()
    }
}

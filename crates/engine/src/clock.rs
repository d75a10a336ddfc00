//! The wall-clock instant a run is dated by.

use std::path::PathBuf;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const LOG_TIMESTAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Wall-clock instant captured once at the start of a run.
///
/// The date directory, the locator's "strictly before today" cutoff, and the
/// log timestamp all derive from this single value, so a run that straddles
/// midnight stays internally consistent.
#[derive(Clone, Copy, Debug)]
pub struct RunClock {
    started: OffsetDateTime,
}

impl RunClock {
    /// Captures the current local time, falling back to UTC when the local
    /// offset cannot be determined.
    #[must_use]
    pub fn now() -> Self {
        let started = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self { started }
    }

    /// Builds a clock from an explicit instant; used by hosts and tests that
    /// need to pin the run date.
    #[must_use]
    pub const fn from_datetime(started: OffsetDateTime) -> Self {
        Self { started }
    }

    /// Returns the calendar date of the run.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.started.date()
    }

    /// Returns the run's `YYYY/MM/DD` date directory.
    #[must_use]
    pub fn date_dir(&self) -> PathBuf {
        let date = self.date();
        pdumpfs_paths::date_dir(date.year(), u8::from(date.month()), date.day())
    }

    /// Formats the run instant for the log line.
    #[must_use]
    pub fn log_timestamp(&self) -> String {
        self.started
            .format(LOG_TIMESTAMP)
            .unwrap_or_else(|_| String::from("0000-00-00T00:00:00"))
    }
}

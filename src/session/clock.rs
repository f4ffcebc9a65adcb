//! Interpreting the device's `date` output

use super::drop_trailing_prompt;
use crate::buffer::clean_lines;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Command sent to print the device time.
pub const CLOCK_COMMAND: &str = "date +\"%F %T %Z\"";

/// Years before this mean the RTC was never set.
pub const RTC_UNSET_BEFORE_YEAR: i32 = 2005;

static LEADING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})-").expect("static regex is valid"));

/// Real-time clock state as reported by the device.
///
/// Purely diagnostic: none of these variants fails a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockStatus {
    /// Still at the factory default, so the fallback password is expected.
    Unset {
        /// Parsed year
        year: i32,
        /// Line the year came from
        raw: String,
    },
    /// Set to a plausible date.
    Set {
        /// Parsed year
        year: i32,
        /// Line the year came from
        raw: String,
    },
    /// A line came back but did not start with a year.
    Unrecognized {
        /// The unexpected line
        raw: String,
    },
    /// Nothing but the command echo came back.
    NoResponse,
}

impl ClockStatus {
    /// Interpret the raw bytes read after sending [`CLOCK_COMMAND`].
    ///
    /// The command echo and a trailing shell prompt are skipped; the first
    /// remaining line is used.
    ///
    /// # Examples
    ///
    /// ```
    /// use synoshell::ClockStatus;
    ///
    /// let status = ClockStatus::parse(b"date +\"%F %T %Z\"\r\n2000-01-01 00:01:02 UTC\r\n# ");
    /// assert!(status.is_unset());
    /// ```
    pub fn parse(output: &[u8]) -> Self {
        let mut lines = clean_lines(output);
        drop_trailing_prompt(&mut lines);

        let Some(line) = lines
            .into_iter()
            .find(|line| !line.trim_end().ends_with(CLOCK_COMMAND))
        else {
            return ClockStatus::NoResponse;
        };

        let raw = line.trim().to_string();
        let year = LEADING_YEAR
            .captures(&raw)
            .and_then(|caps| caps[1].parse::<i32>().ok());

        match year {
            Some(year) if year < RTC_UNSET_BEFORE_YEAR => ClockStatus::Unset { year, raw },
            Some(year) => ClockStatus::Set { year, raw },
            None => ClockStatus::Unrecognized { raw },
        }
    }

    /// Whether the clock is at its factory default.
    pub fn is_unset(&self) -> bool {
        matches!(self, ClockStatus::Unset { .. })
    }
}

impl fmt::Display for ClockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockStatus::Unset { raw, .. } => write!(f, "default/unset ({raw})"),
            ClockStatus::Set { raw, .. } => write!(f, "set ({raw})"),
            ClockStatus::Unrecognized { raw } => write!(f, "unrecognized ({raw})"),
            ClockStatus::NoResponse => f.write_str("no response"),
        }
    }
}

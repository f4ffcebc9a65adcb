//! Daily telnet credentials
//!
//! The root password of the telnet service rotates every day. It is derived
//! from the month and day only:
//!
//! ```text
//! <month hex><month 2-digit>-<day 2-digit hex><gcd(month, day) 2-digit>
//! ```
//!
//! A unit whose clock was never set believes it is January 1st, whose
//! password is [`FALLBACK_PASSWORD`].

use chrono::{Datelike, Local, NaiveDate};
use std::fmt;

/// Password of a device whose real-time clock is still at factory default.
pub const FALLBACK_PASSWORD: &str = "101-0101";

/// Which of the two known passwords a [`Credential`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Derived from the current date.
    Rotating,
    /// The fixed no-RTC default.
    Fallback,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::Rotating => f.write_str("rotating"),
            CredentialKind::Fallback => f.write_str("fallback"),
        }
    }
}

/// A telnet password together with where it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    kind: CredentialKind,
    secret: String,
}

impl Credential {
    /// The rotating credential for `date`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use synoshell::Credential;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 10, 20).unwrap();
    /// assert_eq!(Credential::rotating(date).secret(), "a10-1410");
    /// ```
    pub fn rotating(date: NaiveDate) -> Self {
        Self {
            kind: CredentialKind::Rotating,
            secret: rotating_password(date.month(), date.day()),
        }
    }

    /// The rotating credential for the local calendar date.
    pub fn today() -> Self {
        Self::rotating(Local::now().date_naive())
    }

    /// The fixed fallback credential.
    pub fn fallback() -> Self {
        Self {
            kind: CredentialKind::Fallback,
            secret: FALLBACK_PASSWORD.to_string(),
        }
    }

    /// Which variant this is.
    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    /// The password text.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

// Keep passwords out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Password for `month` (1-12) and `day` (1-31).
pub fn rotating_password(month: u32, day: u32) -> String {
    format!("{month:x}{month:02}-{day:02x}{:02}", gcd(month, day))
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_dates() {
        assert_eq!(rotating_password(10, 20), "a10-1410");
        assert_eq!(rotating_password(1, 1), "101-0101");
        assert_eq!(rotating_password(12, 31), "c12-1f01");
        assert_eq!(rotating_password(6, 18), "606-1206");
        assert_eq!(rotating_password(2, 29), "202-1d01");
        assert_eq!(rotating_password(9, 3), "909-0303");
    }

    #[test]
    fn test_fallback_matches_new_year() {
        assert_eq!(
            Credential::rotating(date(2000, 1, 1)).secret(),
            FALLBACK_PASSWORD
        );
        assert_eq!(Credential::fallback().secret(), FALLBACK_PASSWORD);
        assert_eq!(Credential::fallback().kind(), CredentialKind::Fallback);
    }

    #[test]
    fn test_year_does_not_matter() {
        assert_eq!(
            Credential::rotating(date(2005, 7, 14)),
            Credential::rotating(date(2031, 7, 14))
        );
    }

    #[test]
    fn test_today_is_rotating() {
        assert_eq!(Credential::today().kind(), CredentialKind::Rotating);
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", Credential::fallback());
        assert!(!rendered.contains(FALLBACK_PASSWORD));
        assert!(rendered.contains("Fallback"));
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(10, 20), 10);
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 31), 1);
    }
}

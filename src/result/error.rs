//! Error types for synoshell

use crate::session::State;
use std::time::Duration;
use thiserror::Error;

/// Errors that end a remote-shell session.
///
/// Read timeouts are absent: a marker that does not show up in
/// time is reported as [`ReadStatus::TimedOut`](crate::ReadStatus) and the
/// driver carries on.
///
/// # Examples
///
/// ```no_run
/// use synoshell::{SessionConfig, SessionDriver, SessionError};
///
/// # async fn example() {
/// let driver = SessionDriver::new(SessionConfig::default());
/// match driver.connect_and_run("192.168.1.20").await {
///     Ok(report) => println!("logged in after {} attempt(s)", report.login_attempts),
///     Err(SessionError::Authentication { attempts }) => {
///         eprintln!("both passwords rejected ({attempts} attempts)");
///     }
///     Err(e) => eprintln!("session failed: {e}"),
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum SessionError {
    /// The TCP connection was refused or the host was unreachable.
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        /// Address that was dialed
        addr: String,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// The TCP connection did not complete within the connect deadline.
    #[error("Timed out connecting to {addr} (after {after:?})")]
    ConnectTimeout {
        /// Address that was dialed
        addr: String,
        /// Connect deadline that elapsed
        after: Duration,
    },

    /// Both the rotating and the fallback credential were rejected.
    #[error("Authentication failed: both credentials rejected after {attempts} attempts")]
    Authentication {
        /// Number of login attempts made
        attempts: u8,
    },

    /// A hard I/O failure (reset, broken pipe) while the session was live.
    #[error("I/O error while {state}: {source}")]
    Io {
        /// State the driver was in when the failure happened
        state: State,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },
}

impl SessionError {
    /// Whether the failure happened after a connection was established.
    pub fn is_mid_session(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Io { .. })
    }
}

/// Errors from the HTTP call that enables telnet on the device.
#[derive(Error, Debug)]
pub enum ActivationError {
    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (DNS, refused, timeout).
    #[error("Activation request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The device answered with a non-2xx status.
    #[error("Activation endpoint returned {0}")]
    Status(reqwest::StatusCode),

    /// The body was not valid JSON.
    #[error("Failed to parse activation response: {0}")]
    Decode(#[source] reqwest::Error),

    /// The body parsed but `success` was false or missing.
    #[error("API did not return success: {body}")]
    Rejected {
        /// The JSON body returned by the device
        body: serde_json::Value,
    },
}

/// Errors related to marker creation.
#[derive(Error, Debug)]
pub enum PatternError {
    /// Empty marker.
    ///
    /// An empty marker would match at offset zero of any buffer and so could
    /// never act as a synchronization point.
    #[error("Marker cannot be empty")]
    EmptyPattern,
}

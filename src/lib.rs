//! synoshell: scripted telnet bring-up for NAS appliances
//!
//! synoshell enables the telnet service of a NAS through its management API,
//! logs in as root with the daily rotating password (falling back to the
//! factory default for units whose clock was never set), checks the
//! real-time clock and starts a background command.
//!
//! # Features
//!
//! - **Marker-synchronized**: every step waits for a literal prompt
//!   (`login: `, `Password: `, `# `) with an explicit deadline
//! - **Split-tolerant reads**: markers arriving across several packets are
//!   still found, and no received byte is dropped
//! - **Timeouts are not errors**: a missing prompt is logged and the session
//!   proceeds; only a rejected login or a broken socket aborts it
//! - **Testable**: the driver runs over any `AsyncRead + AsyncWrite` stream
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use synoshell::BringUp;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> std::process::ExitCode {
//!     let outcome = BringUp::new("192.168.1.20").run().await;
//!     outcome.exit_code()
//! }
//! ```
//!
//! # Driving a session directly
//!
//! ```rust,no_run
//! use synoshell::{ClockStatus, SessionDriver};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = SessionDriver::builder()
//!     .read_timeout(Duration::from_secs(5))
//!     .driver();
//!
//! let report = driver.connect_and_run("192.168.1.20").await?;
//! if let ClockStatus::Unset { .. } = report.clock {
//!     println!("clock was never set");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Passwords
//!
//! ```rust
//! use chrono::NaiveDate;
//! use synoshell::{Credential, FALLBACK_PASSWORD};
//!
//! let oct20 = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
//! assert_eq!(Credential::rotating(oct20).secret(), "a10-1410");
//! assert_eq!(FALLBACK_PASSWORD, "101-0101");
//! ```

#![warn(missing_docs)]

mod activation;
mod bringup;
mod buffer;
mod credential;
mod pattern;
mod result;
mod session;

// Public API exports
pub use activation::{enable_telnet, ActivationConfig, ACTIVATION_PATH, DEFAULT_API_PORT};
pub use bringup::BringUp;
pub use buffer::{clean_lines, strip_ansi, strip_telnet_commands};
pub use credential::{rotating_password, Credential, CredentialKind, FALLBACK_PASSWORD};
pub use pattern::{Marker, Match, LOGIN_INCORRECT, LOGIN_PROMPT, PASSWORD_PROMPT, SHELL_PROMPT};
pub use result::{
    ActivationError, LaunchReport, Outcome, PatternError, SessionError, SessionReport,
};
pub use session::{
    read_until, read_until_any, touch_loop, ClockStatus, ReadOutcome, ReadStatus, Session,
    SessionBuilder, SessionConfig, SessionDriver, State, CLOCK_COMMAND, DEFAULT_CHECK_FILE,
    DEFAULT_COMPLETION_TOKEN, DEFAULT_TELNET_PORT, DEFAULT_USERNAME, READ_CHUNK_SIZE,
    RTC_UNSET_BEFORE_YEAR,
};

//! Result types for a bring-up run

mod error;

pub use error::{ActivationError, PatternError, SessionError};

use crate::credential::CredentialKind;
use crate::session::{ClockStatus, State};
use std::process::ExitCode;

/// What the driver observed after a successful login.
///
/// Only authentication is a gate; the clock and launch fields are
/// informational and are filled in on a best-effort basis.
///
/// # Examples
///
/// ```no_run
/// use synoshell::{ClockStatus, SessionConfig, SessionDriver};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = SessionDriver::new(SessionConfig::default())
///     .connect_and_run("192.168.1.20")
///     .await?;
///
/// if let ClockStatus::Unset { raw, .. } = &report.clock {
///     println!("RTC never set ({raw}), fallback password expected");
/// }
/// println!("loop started: {}", report.launch.token_seen);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Which credential the device accepted.
    pub credential: CredentialKind,

    /// Number of passwords sent (1 or 2).
    pub login_attempts: u8,

    /// States visited, in order, ending with [`State::Verified`].
    pub states: Vec<State>,

    /// Result of the real-time clock inspection.
    pub clock: ClockStatus,

    /// Output captured after launching the background command.
    pub launch: LaunchReport,
}

/// Output of the background command launch.
///
/// There is no synchronous signal that a detached loop is running, so this
/// only records what the shell echoed back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchReport {
    /// Output lines with the command echo removed.
    pub lines: Vec<String>,

    /// Whether the completion token appeared in the output.
    pub token_seen: bool,
}

impl LaunchReport {
    /// Output lines joined with newlines.
    pub fn output(&self) -> String {
        self.lines.join("\n")
    }
}

/// Final result of activation followed by the shell session.
#[derive(Debug)]
pub enum Outcome {
    /// The management API call failed; no connection was attempted.
    ActivationFailed(ActivationError),

    /// The session could not connect, authenticate or stay up.
    SessionFailed(SessionError),

    /// Authentication succeeded.
    Succeeded(SessionReport),
}

impl Outcome {
    /// Whether the overall sequence succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    /// Whether both credentials were rejected.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Outcome::SessionFailed(SessionError::Authentication { .. })
        )
    }

    /// Numeric process exit code: 0 on success, 1 otherwise.
    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Process exit code for `main`.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

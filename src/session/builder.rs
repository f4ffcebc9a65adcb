//! Session configuration

use super::SessionDriver;
use chrono::NaiveDate;
use std::time::Duration;

/// Default telnet port
pub const DEFAULT_TELNET_PORT: u16 = 23;

/// Default user name sent at the login prompt
pub const DEFAULT_USERNAME: &str = "root";

/// Default TCP connect deadline (in seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default deadline for login and prompt reads (in seconds)
const DEFAULT_READ_TIMEOUT_SECS: u64 = 10;

/// Default deadline for clock and launch output (in seconds)
const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 2;

/// Default pause between sending a command and reading its output (in seconds)
const DEFAULT_SETTLE_DELAY_SECS: u64 = 1;

/// File touched by the background loop
pub const DEFAULT_CHECK_FILE: &str = "/tmp/installable_check_pass";

/// Token echoed right after the loop is put in the background
pub const DEFAULT_COMPLETION_TOKEN: &str = "__LOOP_STARTED__";

/// Everything the driver needs besides the stream.
///
/// Use [`SessionBuilder`] to change individual values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Telnet port on the device.
    pub port: u16,
    /// User name sent at the login prompt.
    pub username: String,
    /// TCP connect deadline.
    pub connect_timeout: Duration,
    /// Deadline for the login, password and shell prompt reads.
    pub read_timeout: Duration,
    /// Deadline for reading clock and launch output.
    pub verify_timeout: Duration,
    /// Pause after sending a command before its output is read.
    pub settle_delay: Duration,
    /// Command started in the background.
    pub command: String,
    /// Token echoed once the command is backgrounded.
    pub completion_token: String,
    /// File listed after launch to show the command's side effect.
    pub check_file: String,
    /// Date used for the rotating password; `None` means today.
    pub credential_date: Option<NaiveDate>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_TELNET_PORT,
            username: DEFAULT_USERNAME.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            verify_timeout: Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS),
            settle_delay: Duration::from_secs(DEFAULT_SETTLE_DELAY_SECS),
            command: touch_loop(DEFAULT_CHECK_FILE),
            completion_token: DEFAULT_COMPLETION_TOKEN.to_string(),
            check_file: DEFAULT_CHECK_FILE.to_string(),
            credential_date: None,
        }
    }
}

impl SessionConfig {
    /// Start from the defaults.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// The full line sent in the launch step.
    ///
    /// ```
    /// use synoshell::SessionConfig;
    ///
    /// let line = SessionConfig::builder()
    ///     .command("sleep 60")
    ///     .check_file("/tmp/done")
    ///     .build()
    ///     .launch_line();
    /// assert_eq!(line, "sleep 60 & echo __LOOP_STARTED__ && ls -l /tmp/done");
    /// ```
    pub fn launch_line(&self) -> String {
        format!(
            "{} & echo {} && ls -l {}",
            self.command, self.completion_token, self.check_file
        )
    }
}

/// Infinite loop re-creating `file` every second.
pub fn touch_loop(file: &str) -> String {
    format!("while true; do touch {file}; sleep 1; done")
}

/// Builder for configuring session drivers.
///
/// # Defaults
///
/// - Port: 23, user `root`
/// - Connect timeout: 5 seconds
/// - Read timeout: 10 seconds
/// - Verify timeout: 2 seconds
/// - Settle delay: 1 second
/// - Command: a loop touching `/tmp/installable_check_pass` every second
///
/// # Examples
///
/// ```
/// use synoshell::SessionDriver;
/// use std::time::Duration;
///
/// let driver = SessionDriver::builder()
///     .port(2323)
///     .read_timeout(Duration::from_secs(3))
///     .driver();
/// assert_eq!(driver.config().port, 2323);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    config: SessionConfig,
}

impl SessionBuilder {
    /// Create a new session builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the telnet port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the login user name.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    /// Set the TCP connect deadline.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the deadline for login and prompt reads.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Set the deadline for clock and launch output.
    pub fn verify_timeout(mut self, timeout: Duration) -> Self {
        self.config.verify_timeout = timeout;
        self
    }

    /// Set the pause between sending a command and reading its output.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    /// Replace the background command.
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.config.command = command.into();
        self
    }

    /// Replace the completion token.
    pub fn completion_token(mut self, token: impl Into<String>) -> Self {
        self.config.completion_token = token.into();
        self
    }

    /// Replace the file listed after launch. The command is left as is.
    pub fn check_file(mut self, file: impl Into<String>) -> Self {
        self.config.check_file = file.into();
        self
    }

    /// Compute the rotating password for `date` instead of today.
    pub fn credential_date(mut self, date: NaiveDate) -> Self {
        self.config.credential_date = Some(date);
        self
    }

    /// Finish and return the configuration.
    pub fn build(self) -> SessionConfig {
        self.config
    }

    /// Finish and return a driver.
    pub fn driver(self) -> SessionDriver {
        SessionDriver::new(self.config)
    }
}

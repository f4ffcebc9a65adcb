//! Scripted telnet session with the device
//!
//! The remote side is an interactive login shell: there is no framing, only
//! text. Each step sends a line and then waits for a [`Marker`] with a
//! deadline. A marker that never shows up is logged and the driver moves on;
//! only a rejected login or a broken socket ends the session early.

mod builder;
mod clock;
mod reader;

pub use builder::{
    touch_loop, SessionBuilder, SessionConfig, DEFAULT_CHECK_FILE, DEFAULT_COMPLETION_TOKEN,
    DEFAULT_TELNET_PORT, DEFAULT_USERNAME,
};
pub use clock::{ClockStatus, CLOCK_COMMAND, RTC_UNSET_BEFORE_YEAR};
pub use reader::{read_until, read_until_any, ReadOutcome, ReadStatus, READ_CHUNK_SIZE};

use crate::buffer::{clean_lines, ReadBuffer};
use crate::credential::{Credential, CredentialKind};
use crate::pattern::{Marker, LOGIN_INCORRECT, SHELL_PROMPT};
use crate::result::{LaunchReport, SessionError, SessionReport};
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Steps of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Opening the TCP connection.
    Connecting,
    /// Waiting for `login: ` before sending the user name.
    AwaitingLogin,
    /// Sending one of the two passwords.
    AwaitingPassword(CredentialKind),
    /// Draining the shell prompt after login.
    AwaitingPrompt,
    /// Reading the device clock.
    ClockCheck,
    /// Starting the background command.
    CommandLaunch,
    /// Logged in; clock and launch steps done.
    Verified,
    /// Both passwords rejected.
    Failed,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Connecting => f.write_str("connecting"),
            State::AwaitingLogin => f.write_str("waiting for the login prompt"),
            State::AwaitingPassword(kind) => write!(f, "sending the {kind} password"),
            State::AwaitingPrompt => f.write_str("waiting for the shell prompt"),
            State::ClockCheck => f.write_str("checking the clock"),
            State::CommandLaunch => f.write_str("launching the command"),
            State::Verified => f.write_str("verified"),
            State::Failed => f.write_str("failed"),
        }
    }
}

/// One live connection to the device.
///
/// Owns the stream; dropping the session closes the connection.
pub struct Session<S> {
    stream: S,
    authenticated: bool,
    transcript: ReadBuffer,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already connected stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            authenticated: false,
            transcript: ReadBuffer::new(),
        }
    }

    /// Send `line` followed by a newline.
    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');

        self.stream.write_all(&data).await?;
        self.stream.flush().await
    }

    /// Read until `marker` or `timeout`; see [`read_until`].
    pub async fn read_until(
        &mut self,
        marker: &Marker,
        timeout: Duration,
    ) -> io::Result<ReadOutcome> {
        let outcome = read_until(&mut self.stream, marker, timeout).await?;
        self.transcript.append(&outcome.data);
        Ok(outcome)
    }

    /// Read until any of `markers` or `timeout`; see [`read_until_any`].
    pub async fn read_until_any(
        &mut self,
        markers: &[Marker],
        timeout: Duration,
    ) -> io::Result<ReadOutcome> {
        let outcome = read_until_any(&mut self.stream, markers, timeout).await?;
        self.transcript.append(&outcome.data);
        Ok(outcome)
    }

    /// Whether a password has been accepted.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Everything read from the device so far.
    pub fn transcript(&self) -> &[u8] {
        self.transcript.as_bytes()
    }

    /// Give the stream back.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// Drives login, clock check and command launch over one connection.
///
/// # Examples
///
/// ```no_run
/// use synoshell::SessionDriver;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let driver = SessionDriver::builder()
///     .read_timeout(Duration::from_secs(5))
///     .driver();
///
/// let report = driver.connect_and_run("192.168.1.20").await?;
/// println!("clock: {}", report.clock);
/// println!("{}", report.launch.output());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionDriver {
    config: SessionConfig,
}

/// Mutable bookkeeping for one run.
struct Progress {
    states: Vec<State>,
    attempts: u8,
    credential: CredentialKind,
    clock: ClockStatus,
    launch: LaunchReport,
}

impl SessionDriver {
    /// Create a driver from a configuration.
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Configure a driver, starting from the defaults.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// The configuration in use.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Connect to `host` on the configured port and run the session.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Connect`] / [`SessionError::ConnectTimeout`] if the
    ///   TCP connection cannot be opened
    /// - [`SessionError::Authentication`] if both passwords are rejected
    /// - [`SessionError::Io`] on a socket failure mid-session
    pub async fn connect_and_run(&self, host: &str) -> Result<SessionReport, SessionError> {
        let stream = self.connect(host).await?;
        self.run(stream).await
    }

    /// Open the TCP connection within the connect deadline.
    pub async fn connect(&self, host: &str) -> Result<TcpStream, SessionError> {
        let addr = display_addr(host, self.config.port);
        tracing::debug!(%addr, "connecting");

        match tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect((host, self.config.port)),
        )
        .await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(SessionError::Connect { addr, source }),
            Err(_) => Err(SessionError::ConnectTimeout {
                addr,
                after: self.config.connect_timeout,
            }),
        }
    }

    /// Run the session over an already connected stream.
    ///
    /// The stream is dropped, and so closed, before this returns.
    pub async fn run<S>(&self, stream: S) -> Result<SessionReport, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut session = Session::new(stream);
        let result = self.drive(&mut session).await;
        tracing::debug!(authenticated = session.is_authenticated(), "session closed");
        tracing::trace!(
            transcript = %session.transcript.to_string_lossy(),
            "session transcript"
        );
        result
    }

    async fn drive<S>(&self, session: &mut Session<S>) -> Result<SessionReport, SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut progress = Progress {
            states: vec![State::Connecting],
            attempts: 0,
            credential: CredentialKind::Rotating,
            clock: ClockStatus::NoResponse,
            launch: LaunchReport::default(),
        };
        let mut state = State::AwaitingLogin;

        loop {
            progress.states.push(state);
            tracing::debug!(%state, "entering state");

            let step = match state {
                State::Connecting => Ok(State::AwaitingLogin),
                State::AwaitingLogin => self.await_login(session).await,
                State::AwaitingPassword(kind) => {
                    self.send_password(session, kind, &mut progress).await
                }
                State::AwaitingPrompt => self.await_prompt(session).await,
                State::ClockCheck => self.check_clock(session, &mut progress).await,
                State::CommandLaunch => self.launch_command(session, &mut progress).await,
                State::Verified => break,
                State::Failed => {
                    return Err(SessionError::Authentication {
                        attempts: progress.attempts,
                    });
                }
            };

            state = step.map_err(|source| SessionError::Io { state, source })?;
        }

        Ok(SessionReport {
            credential: progress.credential,
            login_attempts: progress.attempts,
            states: progress.states,
            clock: progress.clock,
            launch: progress.launch,
        })
    }

    async fn await_login<S>(&self, session: &mut Session<S>) -> io::Result<State>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // Carry on without the prompt: telnetd always asks for a password next.
        let outcome = session
            .read_until(&Marker::login(), self.config.read_timeout)
            .await?;
        if !outcome.matched() {
            tracing::warn!(
                status = ?outcome.status,
                "no login prompt seen, sending user name anyway"
            );
        }

        session.send_line(&self.config.username).await?;
        Ok(State::AwaitingPassword(CredentialKind::Rotating))
    }

    async fn send_password<S>(
        &self,
        session: &mut Session<S>,
        kind: CredentialKind,
        progress: &mut Progress,
    ) -> io::Result<State>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let credential = match kind {
            CredentialKind::Rotating => self.rotating_credential(),
            CredentialKind::Fallback => {
                session.send_line(&self.config.username).await?;
                Credential::fallback()
            }
        };

        let outcome = session
            .read_until(&Marker::password(), self.config.read_timeout)
            .await?;
        if !outcome.matched() {
            tracing::warn!(status = ?outcome.status, "no password prompt seen");
        }

        progress.attempts += 1;
        session.send_line(credential.secret()).await?;

        let response = session
            .read_until_any(
                &[Marker::shell_prompt(), Marker::login()],
                self.config.read_timeout,
            )
            .await?;

        if !response.contains(LOGIN_INCORRECT.as_bytes()) {
            session.authenticated = true;
            progress.credential = kind;
            tracing::info!(credential = %kind, "telnet login successful");
            return Ok(State::AwaitingPrompt);
        }

        Ok(match kind {
            CredentialKind::Rotating => {
                tracing::warn!("rotating password failed, trying fallback");
                State::AwaitingPassword(CredentialKind::Fallback)
            }
            CredentialKind::Fallback => {
                tracing::error!("both passwords failed, aborting");
                State::Failed
            }
        })
    }

    async fn await_prompt<S>(&self, session: &mut Session<S>) -> io::Result<State>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        session
            .read_until(&Marker::shell_prompt(), self.config.read_timeout)
            .await?;
        Ok(State::ClockCheck)
    }

    async fn check_clock<S>(
        &self,
        session: &mut Session<S>,
        progress: &mut Progress,
    ) -> io::Result<State>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        session.send_line(CLOCK_COMMAND).await?;
        self.settle().await;

        let outcome = session
            .read_until(&Marker::shell_prompt(), self.config.verify_timeout)
            .await?;
        let clock = ClockStatus::parse(&outcome.data);

        match &clock {
            ClockStatus::Unset { raw, .. } => {
                tracing::info!("RTC appears default/unset ({raw}); fallback password expected")
            }
            ClockStatus::Set { raw, .. } => tracing::info!("RTC is set correctly: {raw}"),
            ClockStatus::Unrecognized { raw } => tracing::warn!("unexpected RTC format: {raw}"),
            ClockStatus::NoResponse => {
                tracing::info!("no RTC response; assuming default/unset state")
            }
        }

        progress.clock = clock;
        Ok(State::CommandLaunch)
    }

    async fn launch_command<S>(
        &self,
        session: &mut Session<S>,
        progress: &mut Progress,
    ) -> io::Result<State>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        session.send_line(&self.config.launch_line()).await?;
        self.settle().await;

        let outcome = session
            .read_until(&Marker::shell_prompt(), self.config.verify_timeout)
            .await?;

        let mut lines = clean_lines(&outcome.data);
        drop_trailing_prompt(&mut lines);
        lines.retain(|line| !line.starts_with(&self.config.command));
        let token_seen = lines
            .iter()
            .any(|line| line.trim() == self.config.completion_token);

        if token_seen {
            tracing::info!("background command started");
        } else {
            tracing::warn!("completion token not seen in launch output");
        }
        tracing::debug!(output = %lines.join("\n"), "command output");

        progress.launch = LaunchReport { lines, token_seen };
        Ok(State::Verified)
    }

    fn rotating_credential(&self) -> Credential {
        self.config
            .credential_date
            .map(Credential::rotating)
            .unwrap_or_else(Credential::today)
    }

    async fn settle(&self) {
        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }
    }
}

/// Remove the shell prompt the read stopped at, if it is the last line.
fn drop_trailing_prompt(lines: &mut Vec<String>) {
    if lines.last().is_some_and(|line| line.ends_with(SHELL_PROMPT)) {
        lines.pop();
    }
}

fn display_addr(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

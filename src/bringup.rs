//! Activation followed by the telnet session

use crate::activation::{enable_telnet, ActivationConfig};
use crate::result::Outcome;
use crate::session::{SessionConfig, SessionDriver};

/// Configuration for a complete bring-up run against one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BringUp {
    /// Device host name or IP address.
    pub host: String,
    /// Management API settings.
    pub activation: ActivationConfig,
    /// Telnet session settings.
    pub session: SessionConfig,
}

impl BringUp {
    /// Default settings for `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            activation: ActivationConfig::default(),
            session: SessionConfig::default(),
        }
    }

    /// Enable telnet, then log in, check the clock and launch the command.
    ///
    /// No connection is attempted when activation fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use synoshell::BringUp;
    ///
    /// # async fn example() {
    /// let outcome = BringUp::new("192.168.1.20").run().await;
    /// std::process::exit(outcome.exit_status().into());
    /// # }
    /// ```
    pub async fn run(&self) -> Outcome {
        if let Err(e) = enable_telnet(&self.host, &self.activation).await {
            tracing::error!("failed to enable telnet: {e}");
            return Outcome::ActivationFailed(e);
        }

        let driver = SessionDriver::new(self.session.clone());
        match driver.connect_and_run(&self.host).await {
            Ok(report) => Outcome::Succeeded(report),
            Err(e) => {
                tracing::error!("telnet session failed: {e}");
                Outcome::SessionFailed(e)
            }
        }
    }
}

//! Enabling the telnet service through the management API

use crate::result::ActivationError;
use serde_json::Value;
use std::time::Duration;

/// Default port of the management web server
pub const DEFAULT_API_PORT: u16 = 5000;

/// Endpoint that starts telnetd on the device
pub const ACTIVATION_PATH: &str = "/webman/start_telnet.cgi";

/// Default request timeout (in seconds)
const DEFAULT_ACTIVATION_TIMEOUT_SECS: u64 = 5;

/// Where and how long to wait for the activation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationConfig {
    /// Management API port.
    pub port: u16,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_API_PORT,
            timeout: Duration::from_secs(DEFAULT_ACTIVATION_TIMEOUT_SECS),
        }
    }
}

impl ActivationConfig {
    /// Full activation URL for `host`.
    ///
    /// ```
    /// use synoshell::ActivationConfig;
    ///
    /// let url = ActivationConfig::default().url("192.168.1.20");
    /// assert_eq!(url, "http://192.168.1.20:5000/webman/start_telnet.cgi");
    /// ```
    pub fn url(&self, host: &str) -> String {
        if host.contains(':') {
            format!("http://[{host}]:{}{ACTIVATION_PATH}", self.port)
        } else {
            format!("http://{host}:{}{ACTIVATION_PATH}", self.port)
        }
    }
}

/// Ask the device at `host` to start its telnet service.
///
/// Succeeds only for a 2xx response whose JSON body has `"success": true`.
/// The call is made once; retrying is left to the operator.
pub async fn enable_telnet(host: &str, config: &ActivationConfig) -> Result<(), ActivationError> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(ActivationError::Client)?;

    let url = config.url(host);
    tracing::debug!(%url, "requesting telnet activation");

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(ActivationError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ActivationError::Status(status));
    }

    let body: Value = response.json().await.map_err(ActivationError::Decode)?;
    if !is_success(&body) {
        return Err(ActivationError::Rejected { body });
    }

    tracing::info!(%host, "telnet enabled");
    Ok(())
}

fn is_success(body: &Value) -> bool {
    body.get("success") == Some(&Value::Bool(true))
}

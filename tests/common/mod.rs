//! Fake device endpoints for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use synoshell::SessionConfig;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const PROMPT: &str = "ash-4.4# ";

/// Session settings that keep tests fast.
pub fn fast_session(port: u16) -> SessionConfig {
    SessionConfig::builder()
        .port(port)
        .connect_timeout(Duration::from_secs(2))
        .read_timeout(Duration::from_millis(300))
        .verify_timeout(Duration::from_millis(500))
        .settle_delay(Duration::ZERO)
        .credential_date(chrono::NaiveDate::from_ymd_opt(2024, 10, 20).unwrap())
        .build()
}

/// Management API answering every request with the same response.
pub struct FakeApi {
    pub port: u16,
    pub requests: Arc<AtomicUsize>,
}

pub async fn spawn_api(status: &'static str, body: &'static str) -> FakeApi {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);

            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&chunk[..n]),
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    FakeApi { port, requests }
}

/// Scripted telnetd with a busybox-style login.
pub struct FakeDevice {
    /// Passwords `login` accepts.
    pub accepted: Vec<String>,
    /// Line printed by `date`.
    pub clock: String,
}

impl FakeDevice {
    pub fn accepting(passwords: &[&str]) -> Self {
        Self {
            accepted: passwords.iter().map(|p| p.to_string()).collect(),
            clock: "2026-10-17 11:05:00 CST".to_string(),
        }
    }

    pub fn with_clock(mut self, clock: &str) -> Self {
        self.clock = clock.to_string();
        self
    }
}

/// Device listening on a local port; the handle yields every line received.
pub struct RunningDevice {
    pub port: u16,
    pub lines: JoinHandle<Vec<String>>,
}

pub async fn spawn_device(device: FakeDevice) -> RunningDevice {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let lines = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut writer) = socket.into_split();
        let mut reader = BufReader::new(read_half);
        let mut received = Vec::new();

        // Option negotiation the client is expected to ignore
        let _ = writer
            .write_all(b"\xFF\xFD\x18\xFF\xFD\x20\xFF\xFB\x01\r\nDiskStation login: ")
            .await;

        loop {
            if next_line(&mut reader, &mut received).await.is_none() {
                return received;
            }
            let _ = writer.write_all(b"Password: ").await;

            let Some(password) = next_line(&mut reader, &mut received).await else {
                return received;
            };
            if device.accepted.contains(&password) {
                let banner = format!("\r\n\r\nBusyBox v1.30.1 built-in shell (ash)\r\n\r\n{PROMPT}");
                let _ = writer.write_all(banner.as_bytes()).await;
                break;
            }
            let _ = writer
                .write_all(b"\r\nLogin incorrect\r\nDiskStation login: ")
                .await;
        }

        while let Some(line) = next_line(&mut reader, &mut received).await {
            let reply = if line.starts_with("date") {
                format!("{line}\r\n{}\r\n{PROMPT}", device.clock)
            } else if line.contains("& echo __LOOP_STARTED__") {
                format!(
                    "{line}\r\n__LOOP_STARTED__\r\n\
                     -rw-r--r--    1 root     root             0 Oct 17 11:05 \
                     /tmp/installable_check_pass\r\n{PROMPT}"
                )
            } else {
                format!("{line}\r\n{PROMPT}")
            };
            let _ = writer.write_all(reply.as_bytes()).await;
        }

        received
    });

    RunningDevice { port, lines }
}

async fn next_line(
    reader: &mut BufReader<OwnedReadHalf>,
    received: &mut Vec<String>,
) -> Option<String> {
    let mut line = String::new();
    match reader.read_line(&mut line).await {
        Ok(0) | Err(_) => None,
        Ok(_) => {
            let line = line.trim_end_matches(['\r', '\n']).to_string();
            received.push(line.clone());
            Some(line)
        }
    }
}

//! Turning raw terminal output into plain lines

/// Telnet "interpret as command" escape
const IAC: u8 = 0xFF;
/// Subnegotiation begin
const SB: u8 = 0xFA;
/// Subnegotiation end
const SE: u8 = 0xF0;
/// WILL, WONT, DO, DONT take a one-byte option argument
const WILL: u8 = 0xFB;
const DONT: u8 = 0xFE;

/// Strip ANSI escape sequences from a byte slice
pub fn strip_ansi(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        if data[i] == b'\x1b' && i + 1 < data.len() {
            match data[i + 1] {
                b'[' => {
                    // CSI: parameters up to the final letter
                    i += 2;
                    while i < data.len() {
                        let ch = data[i];
                        i += 1;
                        if ch.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
                b']' => {
                    // OSC: terminated by BEL or ESC \
                    i += 2;
                    while i < data.len() {
                        if data[i] == b'\x07' {
                            i += 1;
                            break;
                        }
                        if data[i] == b'\x1b' && i + 1 < data.len() && data[i + 1] == b'\\' {
                            i += 2;
                            break;
                        }
                        i += 1;
                    }
                }
                b'(' | b')' => {
                    i = (i + 3).min(data.len());
                }
                _ => {
                    i += 2;
                }
            }
        } else {
            result.push(data[i]);
            i += 1;
        }
    }

    result
}

/// Strip telnet IAC command sequences from a byte slice.
///
/// The session never negotiates options, but telnetd still sends its
/// negotiation requests inline with the text.
pub fn strip_telnet_commands(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        if data[i] != IAC {
            result.push(data[i]);
            i += 1;
            continue;
        }

        match data.get(i + 1) {
            // Escaped 0xFF data byte
            Some(&IAC) => {
                result.push(IAC);
                i += 2;
            }
            Some(&SB) => {
                i += 2;
                while i < data.len() {
                    if data[i] == IAC && data.get(i + 1) == Some(&SE) {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            Some(&cmd) if (WILL..=DONT).contains(&cmd) => {
                i = (i + 3).min(data.len());
            }
            Some(_) => i += 2,
            None => i += 1,
        }
    }

    result
}

/// Decode terminal output into non-blank lines without escape sequences
/// or trailing carriage returns.
pub fn clean_lines(data: &[u8]) -> Vec<String> {
    let plain = strip_ansi(&strip_telnet_commands(data));
    String::from_utf8_lossy(&plain)
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .filter(|line| !line.trim().is_empty())
        .collect()
}

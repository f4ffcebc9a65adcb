//! Literal markers used to synchronize with the remote shell

mod matcher;

pub use matcher::{ExactMatcher, Match};

use crate::result::PatternError;
use std::fmt;

/// Prompt printed by the device when it asks for a user name.
pub const LOGIN_PROMPT: &str = "login: ";

/// Prompt printed by the device when it asks for a password.
pub const PASSWORD_PROMPT: &str = "Password: ";

/// Tail of the root shell prompt.
pub const SHELL_PROMPT: &str = "# ";

/// Phrase printed by `login` when a credential is rejected.
pub const LOGIN_INCORRECT: &str = "Login incorrect";

/// A literal byte pattern marking a protocol state boundary.
///
/// Markers are only ever used as synchronization signals: the reader looks
/// for them anywhere in the accumulated output and never interprets the
/// surrounding bytes.
///
/// # Examples
///
/// ```
/// use synoshell::Marker;
///
/// let prompt = Marker::shell_prompt();
/// assert_eq!(prompt.find(b"ash-4.4# ").map(|m| m.start), Some(7));
///
/// let custom = Marker::new("Continue? ").unwrap();
/// assert_eq!(custom.len(), 10);
/// ```
#[derive(Clone)]
pub struct Marker {
    matcher: ExactMatcher,
}

impl Marker {
    /// Create a marker from arbitrary bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::EmptyPattern`] for an empty marker, which
    /// would otherwise match at every position.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, PatternError> {
        Ok(Self {
            matcher: ExactMatcher::new(bytes)?,
        })
    }

    fn from_static(text: &'static str) -> Self {
        Self {
            matcher: ExactMatcher::compile(text.as_bytes().to_vec()),
        }
    }

    /// The `"login: "` prompt.
    pub fn login() -> Self {
        Self::from_static(LOGIN_PROMPT)
    }

    /// The `"Password: "` prompt.
    pub fn password() -> Self {
        Self::from_static(PASSWORD_PROMPT)
    }

    /// The `"# "` root shell prompt.
    pub fn shell_prompt() -> Self {
        Self::from_static(SHELL_PROMPT)
    }

    /// Raw marker bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.matcher.pattern()
    }

    /// Marker length in bytes (never zero).
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Always `false`; empty markers cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Find the first occurrence of this marker in `haystack`.
    pub fn find(&self, haystack: &[u8]) -> Option<Match> {
        self.matcher.find(haystack)
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Marker {}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Marker")
            .field(&String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

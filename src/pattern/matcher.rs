//! Exact byte-string matcher

use crate::result::PatternError;

/// Location of a marker inside a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Start position of the match
    pub start: usize,
    /// End position of the match (exclusive)
    pub end: usize,
}

/// Exact byte-string matcher using the Boyer-Moore-Horspool algorithm
#[derive(Clone)]
pub struct ExactMatcher {
    pattern: Vec<u8>,
    bad_char_table: [usize; 256],
}

impl ExactMatcher {
    /// Create a new exact matcher, rejecting empty patterns
    pub fn new(pattern: impl Into<Vec<u8>>) -> Result<Self, PatternError> {
        let pattern = pattern.into();

        if pattern.is_empty() {
            return Err(PatternError::EmptyPattern);
        }

        Ok(Self::compile(pattern))
    }

    /// Build the skip table. Callers guarantee `pattern` is non-empty.
    pub(crate) fn compile(pattern: Vec<u8>) -> Self {
        let mut bad_char_table = [pattern.len(); 256];
        for (i, &byte) in pattern
            .iter()
            .enumerate()
            .take(pattern.len().saturating_sub(1))
        {
            bad_char_table[byte as usize] = pattern.len() - 1 - i;
        }

        Self {
            pattern,
            bad_char_table,
        }
    }

    /// The raw pattern bytes
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Find the first occurrence of the pattern in `buffer`
    pub fn find(&self, buffer: &[u8]) -> Option<Match> {
        let len = self.pattern.len();
        if buffer.len() < len {
            return None;
        }

        let mut pos = 0;
        while pos + len <= buffer.len() {
            if buffer[pos..pos + len] == self.pattern[..] {
                return Some(Match {
                    start: pos,
                    end: pos + len,
                });
            }

            let shift_char = buffer[pos + len - 1];
            pos += self.bad_char_table[shift_char as usize];
        }

        None
    }
}

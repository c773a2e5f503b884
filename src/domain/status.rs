//! Status-code patterns such as `2XX` or `404`

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const WILDCARD: u8 = b'X';

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid status code pattern: '{0}'")]
pub struct StatusPatternError(pub String);

/// Three positions, each a digit or the wildcard `X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusPattern([u8; 3]);

impl StatusPattern {
    /// Returns the first candidate whose digits match every non-wildcard
    /// position of this pattern, in candidate order.
    ///
    /// Candidates are compared after trimming and upper-casing; anything that
    /// is not three characters long (e.g. `default`) never matches.
    pub fn first_match<'a, I>(&self, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates.into_iter().find(|candidate| self.matches(candidate))
    }

    /// Whether a declared status key satisfies this pattern.
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.trim().to_ascii_uppercase();
        let bytes = candidate.as_bytes();
        bytes.len() == 3
            && self
                .0
                .iter()
                .zip(bytes)
                .all(|(expected, actual)| *expected == WILDCARD || expected == actual)
    }

    /// HTTP status with every wildcard position filled with `0`.
    pub fn concrete_code(&self) -> u16 {
        self.0.iter().fold(0u16, |code, position| {
            let digit = if *position == WILDCARD { 0 } else { position - b'0' };
            code * 10 + u16::from(digit)
        })
    }
}

impl FromStr for StatusPattern {
    type Err = StatusPatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let bytes: [u8; 3] = normalized
            .as_bytes()
            .try_into()
            .map_err(|_| StatusPatternError(s.to_string()))?;
        if bytes.iter().all(|b| b.is_ascii_digit() || *b == WILDCARD) {
            Ok(Self(bytes))
        } else {
            Err(StatusPatternError(s.to_string()))
        }
    }
}

impl fmt::Display for StatusPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Always ASCII by construction
        f.write_str(std::str::from_utf8(&self.0).unwrap_or("???"))
    }
}

/// Turns a declared response key into an HTTP status code.
///
/// Wildcards are filled with `0`; keys that are not patterns (`default`)
/// fall back to `fallback`.
pub fn declared_status_code(key: &str, fallback: &StatusPattern) -> u16 {
    key.parse::<StatusPattern>()
        .map(|pattern| pattern.concrete_code())
        .unwrap_or_else(|_| fallback.concrete_code())
}

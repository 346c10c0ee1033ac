// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session tokens.
//!
//! Every start of playback, stop and beat change opens a new session.
//! Asynchronous work captures the token that was current when it was
//! launched and is ignored on return unless that token is still current.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter so tokens never repeat, even across players
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque, strictly increasing session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    /// Get raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues session tokens and knows which one is current
#[derive(Debug)]
pub struct SessionAuthority {
    current: SessionToken,
}

impl SessionAuthority {
    /// Create an authority with a fresh current session
    pub fn new() -> Self {
        Self {
            current: Self::issue(),
        }
    }

    fn issue() -> SessionToken {
        SessionToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    /// Open a new session, invalidating every earlier token
    pub fn new_session(&mut self) -> SessionToken {
        self.current = Self::issue();
        self.current
    }

    /// Check whether a token is the current one
    pub fn is_current(&self, token: SessionToken) -> bool {
        self.current == token
    }

    /// Get current token
    pub fn current(&self) -> SessionToken {
        self.current
    }
}

impl Default for SessionAuthority {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_strictly_increase() {
        let mut authority = SessionAuthority::new();
        let first = authority.current();
        let second = authority.new_session();
        let third = authority.new_session();

        assert!(first < second);
        assert!(second < third);
        assert!(authority.is_current(third));
        assert!(!authority.is_current(second));
        assert!(!authority.is_current(first));
    }

    #[test]
    fn test_independent_authorities_never_share_tokens() {
        let mut a = SessionAuthority::new();
        let mut b = SessionAuthority::new();
        let ta = a.new_session();
        let tb = b.new_session();

        assert_ne!(ta, tb);
        assert!(!a.is_current(tb));
        assert!(!b.is_current(ta));
    }
}

//! Signing secrets for the two token families.

use std::fmt;
use std::sync::Arc;

/// Which family a token belongs to.
///
/// Session tokens and magic-link login tokens are signed with separate
/// secrets so one can never be replayed as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Stateless cookie session token.
    Session,
    /// Long-lived, database-persisted magic-link login token.
    MagicLink,
}

/// Holds the HMAC secrets for both token kinds.
///
/// Cheap to clone; secrets are shared, never copied.
#[derive(Clone)]
pub struct TokenKeys {
    session: Arc<[u8]>,
    magic_link: Arc<[u8]>,
}

impl TokenKeys {
    /// Creates token keys from the two configured secrets.
    pub fn new(session_secret: impl AsRef<[u8]>, magic_link_secret: impl AsRef<[u8]>) -> Self {
        Self {
            session: Arc::from(session_secret.as_ref()),
            magic_link: Arc::from(magic_link_secret.as_ref()),
        }
    }

    /// Returns the signing secret for the given token kind.
    #[inline]
    pub fn key(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Session => &self.session,
            TokenKind::MagicLink => &self.magic_link,
        }
    }
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("session", &"***")
            .field("magic_link", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_kind_scoped() {
        let keys = TokenKeys::new("session-secret", "magic-link-secret");
        assert_eq!(keys.key(TokenKind::Session), b"session-secret");
        assert_eq!(keys.key(TokenKind::MagicLink), b"magic-link-secret");
        assert_ne!(keys.key(TokenKind::Session), keys.key(TokenKind::MagicLink));
    }

    #[test]
    fn debug_redacts_secrets() {
        let keys = TokenKeys::new("super-secret", "other-secret");
        let debug = format!("{:?}", keys);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("other-secret"));
    }
}

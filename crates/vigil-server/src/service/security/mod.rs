//! Security primitives: password hashing and signed token handling.

mod password_hasher;
mod token_codec;
mod token_keys;

pub use password_hasher::PasswordHasher;
pub use token_codec::{TokenCodec, TokenError};
pub use token_keys::{TokenKeys, TokenKind};

/// Name of the session cookie issued on login.
///
/// The frontend's auth library expects this exact name, so it is not
/// configurable.
pub const SESSION_COOKIE_NAME: &str = "next-auth.session-token";

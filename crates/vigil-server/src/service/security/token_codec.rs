//! Compact signed token encoding and verification.
//!
//! Tokens are three dot-separated, URL-safe base64 segments: a fixed
//! header, a JSON claims payload, and an HMAC-SHA256 signature computed
//! over `header.payload`. The format is wire-compatible with HS256 JWTs
//! so existing frontend token handling keeps working.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Fixed token header; the algorithm is never negotiated.
const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Errors produced while encoding or verifying tokens.
///
/// Verification reports the first failure in order: malformed input,
/// then a bad signature, then expiry. Expiry is checked by the claims
/// type after decoding, so a forged-but-expired token is always
/// reported as invalid rather than expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The token does not have the expected structure.
    #[error("token is malformed")]
    InvalidFormat,
    /// The signature does not match the payload.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The token's expiry time has passed.
    #[error("token has expired")]
    Expired,
    /// The claims could not be serialized or the key is unusable.
    #[error("token could not be signed")]
    Signing,
}

/// Stateless encoder/verifier for signed claim tokens.
#[derive(Debug, Clone, Copy)]
pub struct TokenCodec;

impl TokenCodec {
    /// Encodes claims into a signed token string.
    pub fn encode<T: Serialize>(claims: &T, secret: &[u8]) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Signing)?;

        let header_b64 = URL_SAFE_NO_PAD.encode(TOKEN_HEADER.as_bytes());
        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload);
        let signing_input = format!("{}.{}", header_b64, payload_b64);

        let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::Signing)?;
        mac.update(signing_input.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature_b64))
    }

    /// Verifies a token's signature and decodes its claims.
    ///
    /// Does not check expiry; the claims type owns that decision since
    /// only it knows which field carries the expiry timestamp.
    pub fn decode<T: DeserializeOwned>(token: &str, secret: &[u8]) -> Result<T, TokenError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::InvalidFormat);
        };

        URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| TokenError::InvalidFormat)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::InvalidFormat)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::InvalidFormat)?;

        let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::Signing)?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        // Constant-time comparison.
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        serde_json::from_slice(&payload).map_err(|_| TokenError::InvalidFormat)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
    }

    const SECRET: &[u8] = b"test-secret";

    fn claims() -> TestClaims {
        TestClaims {
            sub: "operator".into(),
            exp: 4_102_444_800,
        }
    }

    #[test]
    fn encode_then_decode() {
        let token = TokenCodec::encode(&claims(), SECRET).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let decoded: TestClaims = TokenCodec::decode(&token, SECRET).unwrap();
        assert_eq!(decoded, claims());
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = TokenCodec::encode(&claims(), SECRET).unwrap();
        let result = TokenCodec::decode::<TestClaims>(&token, b"other-secret");
        assert_eq!(result.unwrap_err(), TokenError::InvalidSignature);
    }

    #[test]
    fn rejects_tampered_payload() {
        let token = TokenCodec::encode(&claims(), SECRET).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(br#"{"sub":"admin","exp":4102444800}"#);
        parts[1] = &forged;
        let tampered = parts.join(".");

        let result = TokenCodec::decode::<TestClaims>(&tampered, SECRET);
        assert_eq!(result.unwrap_err(), TokenError::InvalidSignature);
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in ["", "only-one", "two.parts", "a.b.c.d", "!!!.???.###"] {
            let result = TokenCodec::decode::<TestClaims>(token, SECRET);
            assert_eq!(result.unwrap_err(), TokenError::InvalidFormat, "{token}");
        }
    }

    #[test]
    fn format_error_takes_precedence_over_signature() {
        // Malformed base64 in the signature segment is a format error
        // even though the signature check would also fail.
        let token = TokenCodec::encode(&claims(), SECRET).unwrap();
        let (head, _) = token.rsplit_once('.').unwrap();
        let broken = format!("{}.{}", head, "not base64!");

        let result = TokenCodec::decode::<TestClaims>(&broken, SECRET);
        assert_eq!(result.unwrap_err(), TokenError::InvalidFormat);
    }
}

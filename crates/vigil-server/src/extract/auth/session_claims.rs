//! Session token claims.

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use vigil_postgres::model::User;
use vigil_postgres::types::UserRole;

use crate::service::{AccessPolicy, TokenCodec, TokenError, TokenKeys, TokenKind};

/// Claims carried by session and magic-link tokens.
///
/// The payload is a snapshot of the user at issue time; cookie-based
/// sessions are stateless, so role or group changes only take effect on
/// the next sign-in. Field names follow the wire format the frontend's
/// auth library expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionClaims {
    /// Subject: the username, duplicated for JWT-standard consumers.
    pub sub: String,
    /// User id.
    pub id: Uuid,
    /// Username at issue time.
    pub username: String,
    /// Numeric group the user belongs to.
    #[serde(rename = "groupId")]
    pub group_id: i32,
    /// Display name of the user's area.
    #[serde(rename = "areaName")]
    pub area_name: String,
    /// Role at issue time.
    pub role: UserRole,
    /// Issued-at, seconds since the Unix epoch.
    #[serde(deserialize_with = "lenient_unix_secs")]
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    #[serde(deserialize_with = "lenient_unix_secs")]
    pub exp: i64,
}

/// Accepts both integer and float epoch values.
///
/// Some token producers serialize `iat`/`exp` as JSON floats; the
/// fraction carries no information, so it is truncated.
fn lenient_unix_secs<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value as i64)
}

impl SessionClaims {
    /// Builds claims for a user with the given lifetime.
    pub fn for_user(user: &User, lifetime_secs: i64) -> Self {
        let now = Timestamp::now().as_second();
        Self {
            sub: user.username.clone(),
            id: user.id,
            username: user.username.clone(),
            group_id: user.group_id,
            area_name: user.area_name.clone(),
            role: user.role,
            iat: now,
            exp: now + lifetime_secs,
        }
    }

    /// Returns `true` once the expiry timestamp has passed.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.exp <= Timestamp::now().as_second()
    }

    /// Signs the claims into a token of the given kind.
    pub fn encode(&self, keys: &TokenKeys, kind: TokenKind) -> Result<String, TokenError> {
        TokenCodec::encode(self, keys.key(kind))
    }

    /// Verifies a token of the given kind and decodes its claims.
    ///
    /// Expiry is checked after the signature, so tampered tokens never
    /// report as merely expired.
    pub fn decode(token: &str, keys: &TokenKeys, kind: TokenKind) -> Result<Self, TokenError> {
        let claims: Self = TokenCodec::decode(token, keys.key(kind))?;

        if claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Builds the access policy for the user these claims describe.
    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.role, self.group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp_offset: i64) -> SessionClaims {
        let now = Timestamp::now().as_second();
        SessionClaims {
            sub: "operator".to_string(),
            id: Uuid::new_v4(),
            username: "operator".to_string(),
            group_id: 3,
            area_name: "North Yard".to_string(),
            role: UserRole::BasicUser,
            iat: now,
            exp: now + exp_offset,
        }
    }

    #[test]
    fn encode_then_decode_session_token() {
        let keys = TokenKeys::new("session", "magic-link");
        let claims = claims(3600);

        let token = claims.encode(&keys, TokenKind::Session).unwrap();
        let decoded = SessionClaims::decode(&token, &keys, TokenKind::Session).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let keys = TokenKeys::new("session", "magic-link");
        let token = claims(3600).encode(&keys, TokenKind::MagicLink).unwrap();

        let result = SessionClaims::decode(&token, &keys, TokenKind::Session);
        assert_eq!(result.unwrap_err(), TokenError::InvalidSignature);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = TokenKeys::new("session", "magic-link");
        let token = claims(-60).encode(&keys, TokenKind::Session).unwrap();

        let result = SessionClaims::decode(&token, &keys, TokenKind::Session);
        assert_eq!(result.unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn decode_accepts_float_timestamps() {
        let keys = TokenKeys::new("session", "magic-link");
        let json = serde_json::json!({
            "sub": "operator",
            "id": Uuid::new_v4(),
            "username": "operator",
            "groupId": 3,
            "areaName": "North Yard",
            "role": "Basic User",
            "iat": 1_700_000_000.25,
            "exp": 4_102_444_800.75,
        });

        let token = TokenCodec::encode(&json, keys.key(TokenKind::Session)).unwrap();
        let decoded = SessionClaims::decode(&token, &keys, TokenKind::Session).unwrap();

        assert_eq!(decoded.iat, 1_700_000_000);
        assert_eq!(decoded.exp, 4_102_444_800);
    }

    #[test]
    fn wire_format_uses_camel_case_keys() {
        let claims = claims(3600);
        let json = serde_json::to_value(&claims).unwrap();

        assert!(json.get("groupId").is_some());
        assert!(json.get("areaName").is_some());
        assert!(json.get("group_id").is_none());
    }
}

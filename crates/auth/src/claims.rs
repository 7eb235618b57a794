use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_core::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    Access,
    Refresh,
    ResetPassword,
    VerifyEmail,
}

/// Bearer token claims. Times are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Id of the user the token was issued to.
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token type {0:?} cannot authenticate requests")]
    WrongTokenType(TokenType),

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate decoded claims.
///
/// Signature verification happens in [`crate::JwtValidator`] implementations.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    if claims.token_type != TokenType::Access {
        return Err(TokenValidationError::WrongTokenType(claims.token_type));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(iat: i64, exp: i64, token_type: TokenType) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            iat,
            exp,
            token_type,
        }
    }

    #[test]
    fn time_window_checks() {
        let now = Utc::now();
        let t = now.timestamp();
        assert_eq!(validate_claims(&claims(t - 10, t + 10, TokenType::Access), now), Ok(()));
        assert_eq!(
            validate_claims(&claims(t - 20, t - 10, TokenType::Access), now),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims(t + 10, t + 20, TokenType::Access), now),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&claims(t, t, TokenType::Access), now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn only_access_tokens_authenticate() {
        let now = Utc::now();
        let t = now.timestamp();
        assert_eq!(
            validate_claims(&claims(t - 1, t + 60, TokenType::Refresh), now),
            Err(TokenValidationError::WrongTokenType(TokenType::Refresh))
        );
    }

    #[test]
    fn type_claim_uses_wire_names() {
        let json = serde_json::to_value(claims(1, 2, TokenType::ResetPassword)).unwrap();
        assert_eq!(json["type"], "resetPassword");
    }
}

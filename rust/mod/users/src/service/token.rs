use std::fmt;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use accounts_core::now_unix;

use crate::model::{Claims, Role};

/// Default access token lifetime.
pub const DEFAULT_TTL_HOURS: u32 = 1;

const SECS_PER_HOUR: i64 = 3600;

/// Token verification / issuance failures.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    /// Bad signature, wrong algorithm or malformed token.
    #[error("invalid token: {0}")]
    InvalidSignature(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Signing configuration, fixed for the lifetime of the process.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret. Must be provided; there is no built-in default.
    pub secret: String,
    /// Token lifetime in hours.
    pub ttl_hours: u32,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours: DEFAULT_TTL_HOURS,
        }
    }

    pub fn with_ttl_hours(mut self, ttl_hours: u32) -> Self {
        self.ttl_hours = ttl_hours;
        self
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// Issues and verifies HS256 bearer tokens.
///
/// Stateless: a token is valid until `exp` and cannot be revoked.
pub struct TokenCodec {
    ttl_hours: u32,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against an explicit clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            ttl_hours: config.ttl_hours,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    pub fn ttl_hours(&self) -> u32 {
        self.ttl_hours
    }

    /// Lifetime of tokens issued by [`TokenCodec::issue`], in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_hours as i64 * SECS_PER_HOUR
    }

    /// Issue a token with the configured lifetime.
    pub fn issue(
        &self,
        subject_id: impl fmt::Display,
        identifier: &str,
        role: Role,
    ) -> Result<String, TokenError> {
        self.issue_at(subject_id, identifier, role, self.ttl_hours, now_unix())
    }

    /// Issue a token valid from `now` for `ttl_hours`.
    pub fn issue_at(
        &self,
        subject_id: impl fmt::Display,
        identifier: &str,
        role: Role,
        ttl_hours: u32,
        now: i64,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject_id.to_string(),
            cpf: identifier.to_string(),
            role,
            iat: now,
            exp: now + ttl_hours as i64 * SECS_PER_HOUR,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, now_unix())
    }

    /// Verify signature and structure, then expiry as of `now`.
    ///
    /// A token is expired once `now >= exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::InvalidSignature(e.to_string()))?;

        let claims = data.claims;
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";
    const NOW: i64 = 1_700_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::new(TokenConfig::new(SECRET))
    }

    #[test]
    fn test_round_trip_recovers_claims() {
        let codec = codec();
        let token = codec.issue(42, "52998224725", Role::User).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.cpf, "52998224725");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_large_numeric_subject_survives() {
        let codec = codec();
        let id: u64 = 9_007_199_254_740_993;
        let token = codec.issue(id, "52998224725", Role::Admin).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, "9007199254740993");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_token_has_three_segments() {
        let token = codec().issue("1", "52998224725", Role::User).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_different_secret_fails_signature() {
        let token = codec().issue("1", "52998224725", Role::User).unwrap();
        let other = TokenCodec::new(TokenConfig::new("another-secret"));
        assert!(matches!(other.verify(&token), Err(TokenError::InvalidSignature(_))));
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let codec = codec();
        let token = codec.issue_at("1", "52998224725", Role::User, 0, NOW).unwrap();
        assert!(matches!(codec.verify_at(&token, NOW), Err(TokenError::Expired)));
        assert!(matches!(codec.verify_at(&token, NOW + 1), Err(TokenError::Expired)));
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = codec();
        let token = codec.issue_at("1", "52998224725", Role::User, 1, NOW).unwrap();
        assert!(codec.verify_at(&token, NOW + 3599).is_ok());
        assert!(matches!(codec.verify_at(&token, NOW + 3600), Err(TokenError::Expired)));
    }

    #[test]
    fn test_forged_expired_token_reports_invalid() {
        let token = TokenCodec::new(TokenConfig::new("forger"))
            .issue_at("1", "52998224725", Role::Admin, 0, NOW)
            .unwrap();
        assert!(matches!(
            codec().verify_at(&token, NOW + 10),
            Err(TokenError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        let codec = codec();
        for token in ["", "abc", "a.b.c", "this.is.not.a.valid.jwt"] {
            assert!(matches!(codec.verify(token), Err(TokenError::InvalidSignature(_))));
        }
    }

    #[test]
    fn test_tampered_claims_are_invalid() {
        let codec = codec();
        let token = codec.issue("1", "52998224725", Role::User).unwrap();
        let admin = codec.issue("1", "52998224725", Role::Admin).unwrap();

        // Splice the admin payload onto the user signature.
        let parts: Vec<&str> = token.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], admin_parts[1], parts[2]);
        assert!(matches!(codec.verify(&spliced), Err(TokenError::InvalidSignature(_))));
    }

    #[test]
    fn test_configured_ttl_is_used() {
        let codec = TokenCodec::new(TokenConfig::new(SECRET).with_ttl_hours(5));
        assert_eq!(codec.ttl_secs(), 5 * 3600);
        let claims = codec.verify(&codec.issue("1", "x", Role::User).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 5 * 3600);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let dbg = format!("{:?}", TokenConfig::new(SECRET));
        assert!(!dbg.contains(SECRET));
    }
}

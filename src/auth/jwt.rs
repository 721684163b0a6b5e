use crate::types::PrincipalKind;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default access token lifetime in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 1800;

/// Upper bound on the token lifetime (one year).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// JWT payload. The subject is the numeric id of the principal in the table
/// selected by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub kind: PrincipalKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Why a token was refused. Callers see one 401 either way; this is for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is invalid: {0}")]
    Invalid(String),
    #[error("token has expired")]
    Expired,
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds at the moment of issue
    pub expires_in: i64,
}

/// Identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject_id: i64,
    pub kind: PrincipalKind,
    pub expires_at: DateTime<Utc>,
}

/// Immutable signing settings, built once at startup.
#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub algorithm: Algorithm,
    /// Token lifetime in seconds
    pub token_ttl: i64,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Signs and verifies bearer tokens.
///
/// Stateless apart from the keys derived from the configured secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    token_ttl: i64,
}

impl TokenService {
    /// Creates a token service from immutable settings.
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            algorithm: settings.algorithm,
            token_ttl: settings.token_ttl,
        }
    }

    /// Configured lifetime in seconds.
    pub fn ttl(&self) -> i64 {
        self.token_ttl
    }

    /// Issues a token for `subject_id` of the given kind.
    pub fn issue(&self, subject_id: i64, kind: PrincipalKind) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(self.token_ttl)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                TokenError::Invalid(format!("token lifetime {}s is out of range", self.token_ttl))
            })?;
        let claims = Claims {
            sub: subject_id.to_string(),
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Invalid(format!("failed to sign token: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: self.token_ttl,
        })
    }

    /// Verifies signature, structure and expiry.
    ///
    /// A token is expired once the current time reaches `exp`; no leeway.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let claims = self.decode_claims(token)?;

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        let subject_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Invalid("subject is not a numeric id".to_string()))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::Invalid("expiry out of range".to_string()))?;

        Ok(VerifiedToken {
            subject_id,
            kind: claims.kind,
            expires_at,
        })
    }

    /// Signature and claim-presence check; expiry is left to the caller.
    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(secret: &str, ttl: i64) -> AuthSettings {
        AuthSettings {
            secret: secret.to_string(),
            algorithm: Algorithm::HS256,
            token_ttl: ttl,
        }
    }

    fn create_test_service() -> TokenService {
        TokenService::new(&settings(
            "test-secret-key-that-is-at-least-32-chars",
            DEFAULT_TOKEN_TTL_SECS,
        ))
    }

    #[test]
    fn test_round_trip() {
        let service = create_test_service();
        let issued = service
            .issue(42, PrincipalKind::UnverifiedDeveloper)
            .expect("should issue token");
        let verified = service.verify(&issued.token).expect("should verify");

        assert_eq!(verified.subject_id, 42);
        assert_eq!(verified.kind, PrincipalKind::UnverifiedDeveloper);
        assert_eq!(verified.expires_at.timestamp(), issued.expires_at.timestamp());
        assert_eq!(issued.expires_in, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_tokens_are_unique() {
        let service = create_test_service();
        let a = service.issue(1, PrincipalKind::Buyer).unwrap();
        let b = service.issue(1, PrincipalKind::Buyer).unwrap();
        assert_ne!(a.token, b.token, "jti should make every token distinct");
    }

    #[test]
    fn test_zero_ttl_token_expires() {
        let service = TokenService::new(&settings(
            "test-secret-key-that-is-at-least-32-chars",
            0,
        ));
        let issued = service.issue(1, PrincipalKind::Buyer).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));

        assert_eq!(service.verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_out_of_range_ttl_is_an_error() {
        let service = TokenService::new(&settings(
            "test-secret-key-that-is-at-least-32-chars",
            100_000_000_000_000,
        ));

        assert!(matches!(
            service.issue(1, PrincipalKind::Buyer),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let service = create_test_service();
        let result = service.verify("invalid.token.here");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let one = TokenService::new(&settings("secret-one-that-is-32-chars-long", 900));
        let two = TokenService::new(&settings("secret-two-that-is-32-chars-long", 900));

        let issued = one.issue(5, PrincipalKind::Buyer).unwrap();
        assert!(matches!(two.verify(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_missing_kind_claim_is_invalid() {
        #[derive(Serialize)]
        struct LegacyClaims {
            sub: String,
            iat: i64,
            exp: i64,
        }

        let secret = "test-secret-key-that-is-at-least-32-chars";
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &LegacyClaims {
                sub: "buyer@example.com".to_string(),
                iat: now,
                exp: now + 600,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let service = TokenService::new(&settings(secret, 900));
        assert!(matches!(service.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_non_numeric_subject_is_invalid() {
        let secret = "test-secret-key-that-is-at-least-32-chars";
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                sub: "buyer@example.com".to_string(),
                kind: PrincipalKind::Buyer,
                iat: now,
                exp: now + 600,
                jti: "j".to_string(),
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let service = TokenService::new(&settings(secret, 900));
        assert!(matches!(service.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_claims_expiration_window() {
        let service = TokenService::new(&settings(
            "test-secret-key-that-is-at-least-32-chars",
            900,
        ));
        let issued = service.issue(3, PrincipalKind::Admin).unwrap();
        let now = Utc::now().timestamp();
        let exp = issued.expires_at.timestamp();

        assert!(exp >= now + 895 && exp <= now + 900);
    }

    #[test]
    fn test_settings_debug_redacts_secret() {
        let rendered = format!("{:?}", settings("super-secret-value-xxxxxxxxxxxxxx", 1));
        assert!(!rendered.contains("super-secret"));
    }
}

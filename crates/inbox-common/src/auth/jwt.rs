//! Supabase access-token validation
//!
//! Supabase signs user sessions (and the service-role key) as HS256 JWTs with
//! the project's JWT secret. Tokens are only decoded here; issuing happens in
//! Supabase Auth.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Role claim carried by service-role keys
pub const SERVICE_ROLE: &str = "service_role";

/// JWT claims issued by Supabase Auth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (auth user ID); absent on service-role keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Postgres role: `authenticated`, `anon` or `service_role`
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    /// Claims for a signed-in user, used by tests and tooling
    #[must_use]
    pub fn for_user(user_id: Uuid, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: Some(user_id.to_string()),
            exp: now + ttl_secs,
            iat: Some(now),
            role: "authenticated".to_string(),
            email: None,
            aud: Some("authenticated".to_string()),
        }
    }

    /// Claims equivalent to the project's service-role key
    #[must_use]
    pub fn service_role(ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: None,
            exp: now + ttl_secs,
            iat: Some(now),
            role: SERVICE_ROLE.to_string(),
            email: None,
            aud: None,
        }
    }

    /// Get the auth user ID
    ///
    /// # Errors
    /// Returns an error if the subject is missing or not a UUID
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.sub
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or(AppError::InvalidToken)
    }

    #[must_use]
    pub fn is_service_role(&self) -> bool {
        self.role == SERVICE_ROLE
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Validates Supabase-issued tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    /// Create a service for the project's JWT secret
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Supabase sets `aud` to the role; access is decided by the role claim
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign claims with the project secret
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// Decode and validate a token
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                    _ => AppError::InvalidToken,
                }
            })?;

        Ok(token_data.claims)
    }

    /// Validate a bearer token presented to the API
    ///
    /// Accepts signed-in users and the service role; rejects `anon`.
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or anonymous
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if claims.is_service_role() {
            return Ok(claims);
        }
        if claims.role != "authenticated" {
            return Err(AppError::InvalidToken);
        }
        claims.user_id()?;

        Ok(claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("super-secret-jwt-token-with-at-least-32-characters")
    }

    #[test]
    fn test_user_token_round_trip() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.encode(&Claims::for_user(user_id, 3600)).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert!(!claims.is_service_role());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_service_role_token() {
        let service = create_test_service();
        let token = service.encode(&Claims::service_role(3600)).unwrap();

        let claims = service.validate_access_token(&token).unwrap();
        assert!(claims.is_service_role());
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn test_anon_token_rejected() {
        let service = create_test_service();
        let mut claims = Claims::service_role(3600);
        claims.role = "anon".to_string();
        let token = service.encode(&claims).unwrap();

        assert!(matches!(
            service.validate_access_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let service = create_test_service();
        let token = service
            .encode(&Claims::for_user(Uuid::new_v4(), -3600))
            .unwrap();

        assert!(matches!(
            service.decode_token(&token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let token = JwtService::new("another-secret-that-is-also-long-enough")
            .encode(&Claims::for_user(Uuid::new_v4(), 3600))
            .unwrap();

        assert!(matches!(
            create_test_service().decode_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let result = create_test_service().decode_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}

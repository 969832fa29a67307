use super::model::{AuthenticatedUser, Claims};
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::time::Duration;

/// Verifies HS256 bearer tokens issued with the shared secret.
pub struct JwtValidator {
    decoding_key: DecodingKey,
    leeway: u64,
}

impl JwtValidator {
    pub fn new(secret: &str, leeway: Duration) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            leeway: leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        if header.alg != Algorithm::HS256 {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Only HS256 is allowed",
                header.alg
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid or expired token: {}", e)))?;

        Ok(AuthenticatedUser {
            user_id: token_data.claims.id,
            role: token_data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token(secret: &str, exp: u64) -> String {
        let claims = Claims {
            id: 42,
            role: Role::Moderator,
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    #[test]
    fn test_valid_token_resolves_user() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(0));
        let user = validator.validate_token(&token(SECRET, future_exp())).unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.role, Role::Moderator);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(0));
        let result = validator.validate_token(&token("other-secret", future_exp()));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(0));
        let expired = (chrono::Utc::now().timestamp() - 3600) as u64;
        let result = validator.validate_token(&token(SECRET, expired));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let validator = JwtValidator::new(SECRET, Duration::from_secs(0));
        assert!(validator.validate_token("not-a-jwt").is_err());
    }
}

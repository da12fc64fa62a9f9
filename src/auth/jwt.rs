use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth::claims::Claims,
    errors::{AppError, AppResult},
    models::domain::user::{UserProfile, UserRole},
};

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration_hours: i64,
    admin_email: String,
}

impl JwtService {
    pub fn new(secret: &SecretString, expiration_hours: i64, admin_email: &str) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation: Validation::default(),
            expiration_hours,
            admin_email: admin_email.trim().to_lowercase(),
        }
    }

    /// The configured admin address gets the admin role; everyone else is a
    /// regular user.
    pub fn role_for(&self, email: &str) -> UserRole {
        if email.trim().to_lowercase() == self.admin_email {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }

    pub fn create_token(&self, profile: &UserProfile) -> AppResult<String> {
        let claims = Claims::new(profile, self.role_for(&profile.email), self.expiration_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to create JWT: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn jwt_service() -> JwtService {
        let config = Config::test_config();
        JwtService::new(&config.jwt_secret, 1, &config.admin_email)
    }

    #[test]
    fn test_jwt_create_and_validate() {
        let jwt_service = jwt_service();
        let profile = UserProfile::new("uid-1", "john@example.com");

        let token = jwt_service.create_token(&profile).unwrap();
        assert!(!token.is_empty());

        let claims = jwt_service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "uid-1");
        assert_eq!(claims.email, "john@example.com");
        assert_eq!(claims.role, UserRole::User);
    }

    #[test]
    fn test_admin_email_gets_admin_role() {
        let jwt_service = jwt_service();
        let profile = UserProfile::new("uid-admin", "Admin@Example.com");

        let token = jwt_service.create_token(&profile).unwrap();
        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn test_jwt_invalid_token() {
        let result = jwt_service().validate_token("invalid.token.here");

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = JwtService::new(
            &SecretString::from("another_secret_entirely".to_string()),
            1,
            "admin@example.com",
        );
        let token = other
            .create_token(&UserProfile::new("uid-1", "john@example.com"))
            .unwrap();

        assert!(jwt_service().validate_token(&token).is_err());
    }
}

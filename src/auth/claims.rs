use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::user::{UserProfile, UserRole};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: UserRole,
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub iat: usize, // Issued at (as UTC timestamp)
}

impl Claims {
    pub fn new(profile: &UserProfile, role: UserRole, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: profile.uid.clone(),
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            role,
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let mut profile = UserProfile::new("uid-42", "john@example.com");
        profile.display_name = Some("John".to_string());

        let claims = Claims::new(&profile, UserRole::User, 24);

        assert_eq!(claims.sub, "uid-42");
        assert_eq!(claims.email, "john@example.com");
        assert_eq!(claims.display_name.as_deref(), Some("John"));
        assert!(!claims.is_admin());
        assert!(claims.exp > claims.iat);
    }
}

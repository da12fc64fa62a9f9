use secrecy::SecretString;
use std::{env, time::Duration};

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub admin_email: String,
    pub seed_dir: String,
    pub leaderboard_size: i64,
    pub session_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "quizzes-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: SecretString::from(
                env::var("JWT_SECRET")
                    .unwrap_or_else(|_| "dev_secret_key_change_in_production".to_string()),
            ),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@quizzes.dev".to_string()),
            seed_dir: env::var("SEED_DIR").unwrap_or_else(|_| "seed".to_string()),
            leaderboard_size: env::var("LEADERBOARD_SIZE")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(10),
            session_idle_secs: env::var("SESSION_IDLE_SECS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(30 * 60),
        }
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == "dev_secret_key_change_in_production" {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if self.admin_email == "admin@quizzes.dev" {
            panic!("FATAL: ADMIN_EMAIL is using default value! Set ADMIN_EMAIL environment variable.");
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quizzes-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            admin_email: "admin@example.com".to_string(),
            seed_dir: "seed".to_string(),
            leaderboard_size: 10,
            session_idle_secs: 60,
        }
    }
}

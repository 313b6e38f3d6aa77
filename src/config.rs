// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds. Defaults to 7 days.
    pub jwt_expiration: u64,
    pub rust_log: String,
    /// Primary question source. When unset, only the local file is used.
    pub questions_api_url: Option<String>,
    /// Local fallback question file.
    pub questions_file: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(604_800);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let questions_api_url = env::var("QUESTIONS_API_URL").ok().filter(|v| !v.is_empty());

        let questions_file =
            env::var("QUESTIONS_FILE").unwrap_or_else(|_| "data/questions.json".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            questions_api_url,
            questions_file,
        }
    }
}

use std::env;

use crate::error::AppError;
use crate::messages::Locale;
use crate::password::DEFAULT_HASH_COST;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub app_mode: AppMode,
    pub locale: Locale,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| AppError::InternalServerError("SERVER_PORT must be a number".into()))?;

        let app_mode = match env::var("APP_MODE").as_deref() {
            Ok("dev") => AppMode::Dev,
            _ => AppMode::Prod,
        };

        let locale = env::var("APP_LOCALE")
            .unwrap_or_else(|_| "en".to_string())
            .parse::<Locale>()
            .map_err(|e| AppError::InternalServerError(format!("APP_LOCALE: {}", e)))?;

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(cost) => cost.parse::<u32>().map_err(|_| {
                AppError::InternalServerError("BCRYPT_COST must be a number".into())
            })?,
            Err(_) => DEFAULT_HASH_COST,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            server_port,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            app_mode,
            locale,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn playground_enabled(&self) -> bool {
        self.app_mode == AppMode::Dev
    }
}

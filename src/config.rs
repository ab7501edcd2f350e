use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    pub environment: String,
    pub jwt_secret: String,
    pub jwt_expires_in_hours: i64,
    pub openai_api_key: Option<String>,
    pub ai_model: String,
    pub ai_confidence_threshold: u8,
    pub audio_dir: String,
    pub upload_dir: String,
    pub audio_max_age_hours: u64,
    pub audio_cleanup_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/binbot.db".to_string());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set for token signing")?;

        let jwt_expires_in_hours = env::var("JWT_EXPIRES_IN")
            .map(|v| parse_duration_hours(&v))
            .unwrap_or(Ok(24))
            .map_err(|_| "Invalid JWT_EXPIRES_IN")?;

        // Optional: requests to the image-classification endpoint fail with a
        // configuration error when absent, everything else keeps working.
        let openai_api_key = env::var("OPENAI_API_KEY").ok();

        let ai_model = env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let ai_confidence_threshold = env::var("AI_CONFIDENCE_THRESHOLD")
            .unwrap_or_else(|_| "40".to_string())
            .parse()
            .map_err(|_| "Invalid AI_CONFIDENCE_THRESHOLD")?;

        let audio_dir = env::var("AUDIO_DIR").unwrap_or_else(|_| "./audio".to_string());
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());

        let audio_max_age_hours = env::var("AUDIO_MAX_AGE_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .map_err(|_| "Invalid AUDIO_MAX_AGE_HOURS")?;

        let audio_cleanup_interval_secs = env::var("AUDIO_CLEANUP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|_| "Invalid AUDIO_CLEANUP_INTERVAL_SECS")?;

        Ok(Config {
            server_host,
            server_port,
            database_path,
            allowed_origins,
            environment,
            jwt_secret,
            jwt_expires_in_hours,
            openai_api_key,
            ai_model,
            ai_confidence_threshold,
            audio_dir,
            upload_dir,
            audio_max_age_hours,
            audio_cleanup_interval_secs,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parse a token lifetime such as "1d", "24h" or a plain hour count
fn parse_duration_hours(value: &str) -> Result<i64, String> {
    let v = value.trim();
    if let Some(days) = v.strip_suffix('d') {
        return days
            .parse::<i64>()
            .map(|d| d * 24)
            .map_err(|_| format!("Invalid duration: {}", value));
    }
    if let Some(hours) = v.strip_suffix('h') {
        return hours
            .parse::<i64>()
            .map_err(|_| format!("Invalid duration: {}", value));
    }
    v.parse::<i64>()
        .map_err(|_| format!("Invalid duration: {}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_hours() {
        assert_eq!(parse_duration_hours("1d").unwrap(), 24);
        assert_eq!(parse_duration_hours("7d").unwrap(), 168);
        assert_eq!(parse_duration_hours("12h").unwrap(), 12);
        assert_eq!(parse_duration_hours("36").unwrap(), 36);
        assert!(parse_duration_hours("soon").is_err());
    }
}

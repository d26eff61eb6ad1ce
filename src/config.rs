use std::env;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub database_url: String,
    pub access_token_secret: String,
    /// Access token expiry in minutes.
    pub access_token_expiry_minutes: i64,
    /// Comma-separated list of allowed CORS origins.
    pub allowed_origins: Vec<String>,
    /// Database connection pool settings.
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Whether to use JSON logging format (for production).
    pub json_logging: bool,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    // Matchmaking/room/job timing, overridable for tests (section 4.G).
    pub matchmaking_timeout_ms: i64,
    pub room_duration_secs: i64,
    pub run_job_ttl_secs: i64,
    pub submit_job_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let allowed_origins = env::var("CORS_ORIGIN")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]);

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            database_url: env::var("DATABASE_URL")?,
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")?,
            access_token_expiry_minutes: env::var("ACCESS_TOKEN_EXPIRY_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
            allowed_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            db_min_connections: env::var("DB_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .unwrap_or(2),
            db_acquire_timeout_secs: env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            json_logging: env::var("JSON_LOGGING")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            matchmaking_timeout_ms: env::var("MATCHMAKING_TIMEOUT_MS")
                .unwrap_or_else(|_| crate::matchmaking::MATCHMAKING_TIMEOUT_MS.to_string())
                .parse()
                .unwrap_or(crate::matchmaking::MATCHMAKING_TIMEOUT_MS),
            room_duration_secs: env::var("ROOM_DURATION_SECS")
                .unwrap_or_else(|_| crate::room_engine::ROOM_DURATION_SECS.to_string())
                .parse()
                .unwrap_or(crate::room_engine::ROOM_DURATION_SECS),
            run_job_ttl_secs: env::var("RUN_JOB_TTL_SECS")
                .unwrap_or_else(|_| crate::judge::RUN_JOB_TTL_SECS.to_string())
                .parse()
                .unwrap_or(crate::judge::RUN_JOB_TTL_SECS),
            submit_job_ttl_secs: env::var("SUBMIT_JOB_TTL_SECS")
                .unwrap_or_else(|_| crate::judge::SUBMIT_JOB_TTL_SECS.to_string())
                .parse()
                .unwrap_or(crate::judge::SUBMIT_JOB_TTL_SECS),
        })
    }
}

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. "sqlite:./shortener.db"
    pub database_url: String,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when building short links, e.g. "https://go.example.com"
    /// Must NOT have a trailing slash.
    pub base_url: String,

    /// Origins allowed to call the API from a browser.
    pub cors_allowed_origins: Vec<String>,

    /// Length of auto-generated aliases.
    pub alias_length: usize,

    /// How many random candidates to try before giving up on generation.
    pub max_alias_attempts: u32,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let base_url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let alias_length = std::env::var("ALIAS_LENGTH")
            .unwrap_or_else(|_| "7".into())
            .parse::<usize>()
            .context("ALIAS_LENGTH must be a positive integer")?;
        if alias_length == 0 {
            anyhow::bail!("ALIAS_LENGTH must be greater than zero");
        }

        let max_alias_attempts = std::env::var("MAX_ALIAS_ATTEMPTS")
            .unwrap_or_else(|_| "5".into())
            .parse::<u32>()
            .context("MAX_ALIAS_ATTEMPTS must be a positive integer")?;
        if max_alias_attempts == 0 {
            anyhow::bail!("MAX_ALIAS_ATTEMPTS must be greater than zero");
        }

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./shortener.db".into()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            base_url,
            cors_allowed_origins,
            alias_length,
            max_alias_attempts,
        })
    }

    /// Address string handed to the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

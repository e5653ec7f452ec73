use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// External prompt/output scanner service.
#[derive(Debug, Deserialize, Clone)]
pub struct ScannerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Policy when the scanner service is unreachable: `true` lets the turn
    /// proceed ungated (logged), `false` fails the turn with 502.
    pub fail_open: bool,
}

/// Generative model collaborator (Gemini-style REST API).
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub scanner: ScannerConfig,
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("scanner.base_url", "http://localhost:8000")?
            .set_default("scanner.timeout_secs", 30)?
            .set_default("scanner.fail_open", true)?
            .set_default("model.model", "gemini-2.5-flash")?
            .set_default(
                "model.base_url",
                "https://generativelanguage.googleapis.com",
            )?
            .set_default("model.timeout_secs", 60)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., PROMPTGATE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("PROMPTGATE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

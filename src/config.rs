use serde::Deserialize;

// Session cookies are signed; the key derivation needs this much material.
const MIN_SECRET_KEY_BYTES: usize = 64;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub secret_key: String,
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

// Loaded for deployments that relay mail; nothing in the request path
// reads these yet.
#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub server: Option<String>,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let config: Config = config.try_deserialize()?;
        if config.secret_key.len() < MIN_SECRET_KEY_BYTES {
            return Err(config::ConfigError::Message(format!(
                "secret_key must be at least {} bytes",
                MIN_SECRET_KEY_BYTES
            )));
        }
        Ok(config)
    }
}

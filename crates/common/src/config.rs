/// Default Telegram Bot API endpoint.
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Secret used to verify session tokens (HS256)
    pub auth_secret: String,

    /// Telegram bot token; without it Telegram subscribers are skipped
    pub telegram_bot_token: Option<String>,

    /// Telegram Bot API base URL (default: https://api.telegram.org)
    pub telegram_api_base: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 10)
    pub db_max_connections: u32,

    /// Socket address the HTTP server binds to (default: 0.0.0.0:3000)
    pub bind_addr: String,
}

/// Credentials and endpoints the fan-out dispatcher needs.
///
/// Handed to the notifier at construction instead of being read from the
/// process environment at delivery time.
#[derive(Debug, Clone, Default)]
pub struct NotifierConfig {
    pub telegram_bot_token: Option<String>,
    pub telegram_api_base: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let auth_secret = var("AUTH_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "AUTH_SECRET environment variable is required (generate one with `openssl rand -base64 32`)"
                )
            })?;

        Ok(Self {
            database_url: var("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            auth_secret,
            telegram_bot_token: var("TELEGRAM_BOT_TOKEN").filter(|s| !s.is_empty()),
            telegram_api_base: var("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
        })
    }

    /// Derive the notifier configuration.
    pub fn notifier(&self) -> NotifierConfig {
        NotifierConfig {
            telegram_bot_token: self.telegram_bot_token.clone(),
            telegram_api_base: self.telegram_api_base.clone(),
        }
    }
}

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub mail: MailConfig,
    pub reminders: ReminderConfig,
    pub recommend: RecommendConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mail = MailConfig {
            from: env::var("MAIL_FROM").unwrap_or_else(|_| "reminders@interntrack.dev".to_string()),
            username: env::var("MAIL_USER").ok(),
            password: env::var("MAIL_PASSWORD").ok(),
        };

        let reminders = ReminderConfig {
            window_days: parse_env_number("REMINDER_WINDOW_DAYS", 7)?,
            max_workers: parse_env_number("REMINDER_MAX_WORKERS", 4)?,
        };

        let recommend = RecommendConfig {
            min_training_examples: parse_env_number("RECOMMEND_MIN_EXAMPLES", 2)?,
            top_k: parse_env_number("RECOMMEND_TOP_K", 10)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            mail,
            reminders,
            recommend,
        })
    }
}

fn parse_env_number<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Credentials and sender identity for the outbound mail transport.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Settings for the deadline scanner and reminder batch cycle.
#[derive(Debug, Clone, Copy)]
pub struct ReminderConfig {
    /// Forward-looking window within which a deadline earns a reminder.
    pub window_days: i64,
    /// Upper bound on concurrent per-user workers in the batch cycle.
    pub max_workers: usize,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            max_workers: 4,
        }
    }
}

/// Settings for the recommendation scorer.
#[derive(Debug, Clone, Copy)]
pub struct RecommendConfig {
    /// Labeled history rows required before model training is attempted.
    pub min_training_examples: usize,
    pub top_k: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            min_training_examples: 2,
            top_k: 10,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Admin allow-list
    pub admin: AdminConfig,
    /// Identity provider used to verify admin bearer tokens
    pub identity: IdentityConfig,
    /// Anti-automation verification for public submissions
    pub recaptcha: RecaptchaConfig,
    /// Letterhead and signatory printed on rendered documents
    pub village: VillageConfig,
    /// Applicant notifications
    #[serde(default)]
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::PoolSettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Letter submissions allowed per client IP per minute (0 disables)
    #[serde(default = "default_submission_rate_limit")]
    pub submission_rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Comma-separated admin emails (`ADMIN_EMAILS`)
    #[serde(default)]
    pub emails: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProvider {
    /// Firebase ID tokens verified against Google's published keys
    Firebase,
    /// Tokens signed by a fixed RSA key (self-hosted identity or tests)
    Static,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_provider")]
    pub provider: IdentityProvider,

    /// Firebase project id; the expected audience of every token
    #[serde(default)]
    pub project_id: String,

    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,

    /// RSA public key in PEM format for the static provider
    #[serde(default)]
    pub public_key: String,

    /// Expected issuer for the static provider (empty skips the check)
    #[serde(default)]
    pub issuer: String,

    /// Leeway in seconds for clock skew tolerance
    #[serde(default = "default_identity_leeway")]
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecaptchaConfig {
    /// Server secret (`RECAPTCHA_SECRET_KEY`); submissions fail while empty
    #[serde(default)]
    pub secret_key: String,

    #[serde(default = "default_recaptcha_verify_url")]
    pub verify_url: String,

    /// Minimum score for score-based keys
    #[serde(default)]
    pub min_score: Option<f64>,

    #[serde(default = "default_recaptcha_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VillageConfig {
    pub name: String,
    pub district: String,
    pub regency: String,
    pub address: String,

    /// Place printed on the signature date line
    pub place: String,

    pub signatory_name: String,

    #[serde(default = "default_signatory_title")]
    pub signatory_title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationProvider {
    /// Logs a click-to-chat link instead of sending
    Log,
    /// Posts to a WhatsApp gateway
    Gateway,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_notification_provider")]
    pub provider: NotificationProvider,

    #[serde(default)]
    pub gateway_url: String,

    #[serde(default)]
    pub gateway_token: String,

    #[serde(default = "default_country_code")]
    pub country_code: String,

    #[serde(default = "default_notification_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_notification_provider(),
            gateway_url: String::new(),
            gateway_token: String::new(),
            country_code: default_country_code(),
            timeout_secs: default_notification_timeout(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    1_048_576
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_submission_rate_limit() -> u32 {
    5
}
fn default_identity_provider() -> IdentityProvider {
    IdentityProvider::Firebase
}
fn default_jwks_url() -> String {
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com"
        .to_string()
}
fn default_identity_leeway() -> u64 {
    60
}
fn default_recaptcha_verify_url() -> String {
    "https://www.google.com/recaptcha/api/siteverify".to_string()
}
fn default_recaptcha_timeout() -> u64 {
    10
}
fn default_signatory_title() -> String {
    "Kepala Desa".to_string()
}
fn default_notification_provider() -> NotificationProvider {
    NotificationProvider::Log
}
fn default_country_code() -> String {
    shared::validation::DEFAULT_COUNTRY_CODE.to_string()
}
fn default_notification_timeout() -> u64 {
    10
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Unprefixed variables honoured for compatibility with existing deployments.
const PLAIN_ENV_OVERRIDES: [(&str, &str); 4] = [
    ("DATABASE_URL", "database.url"),
    ("ADMIN_EMAILS", "admin.emails"),
    ("RECAPTCHA_SECRET_KEY", "recaptcha.secret_key"),
    ("FIREBASE_PROJECT_ID", "identity.project_id"),
];

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with DESA__ prefix
    /// 4. DATABASE_URL, ADMIN_EMAILS, RECAPTCHA_SECRET_KEY, FIREBASE_PROJECT_ID
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("DESA").separator("__"));

        for (var, key) in PLAIN_ENV_OVERRIDES {
            builder = builder.set_override_option(key, std::env::var(var).ok())?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// This method creates a config entirely from defaults and overrides,
    /// without relying on config files (which may not be accessible during tests).
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = ""

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            submission_rate_limit_per_minute = 5

            [admin]
            emails = "kades@desa.id"

            [identity]
            provider = "firebase"
            project_id = "desa-test"

            [recaptcha]
            secret_key = "test-secret"

            [village]
            name = "Sukamaju"
            district = "Cibadak"
            regency = "Sukabumi"
            address = "Jl. Raya Sukamaju No. 1"
            place = "Sukamaju"
            signatory_name = "H. Suparman"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "DESA__DATABASE__URL or DATABASE_URL must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        match self.identity.provider {
            IdentityProvider::Firebase if self.identity.project_id.is_empty() => {
                return Err(ConfigValidationError::MissingRequired(
                    "identity.project_id (FIREBASE_PROJECT_ID) is required for the firebase provider"
                        .to_string(),
                ));
            }
            IdentityProvider::Static if self.identity.public_key.is_empty() => {
                return Err(ConfigValidationError::MissingRequired(
                    "identity.public_key is required for the static provider".to_string(),
                ));
            }
            _ => {}
        }

        if self.village.signatory_name.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "village.signatory_name (DESA__VILLAGE__SIGNATORY_NAME) must be set".to_string(),
            ));
        }

        if self.notification.enabled
            && self.notification.provider == NotificationProvider::Gateway
            && self.notification.gateway_url.is_empty()
        {
            return Err(ConfigValidationError::MissingRequired(
                "notification.gateway_url is required for the gateway provider".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

use serde::Deserialize;
use thiserror::Error;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub security: SecurityConfig,
}

// Настройки приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

// Настройки базы данных
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Настройки почтового релея
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub default_sender: String,
    pub admin_email: String,
}

impl MailConfig {
    pub fn base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.server, self.port)
    }
}

// Секрет для CSRF-токенов формы
#[derive(Clone)]
pub struct SecurityConfig {
    pub secret_key: String,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("configuration error: {0}")]
    Source(#[from] config::ConfigError),
}

// Плоское представление переменных окружения (MAIL_SERVER -> mail_server)
#[derive(Debug, Deserialize)]
struct EnvSettings {
    host: String,
    port: u16,
    rust_log: String,
    log_format: LogFormat,
    database_url: Option<String>,
    db_pool_size: u32,
    mail_server: Option<String>,
    mail_port: u16,
    mail_use_tls: bool,
    mail_username: Option<String>,
    mail_password: Option<String>,
    mail_default_sender: Option<String>,
    admin_email: Option<String>,
    secret_key: Option<String>,
}

impl Config {
    /// Читает настройки из окружения процесса (`.env` подгружается в `main`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    /// Значения остаются строками: числа и bool разбираются при
    /// десериализации только там, где поле типизировано, так что пароль
    /// `007` не превращается в `7`.
    pub fn from_environment(environment: config::Environment) -> Result<Self, ConfigError> {
        Self::from_builder(Self::defaults()?.add_source(environment))
    }

    /// Значения по умолчанию для необязательных переменных.
    pub fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("rust_log", "jetquote=debug,tower_http=debug")?
            .set_default("log_format", "pretty")?
            .set_default("db_pool_size", 5)?
            .set_default("mail_port", 587)?
            .set_default("mail_use_tls", true)?)
    }

    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let env: EnvSettings = builder.build()?.try_deserialize()?;

        Ok(Config {
            app: AppConfig {
                host: env.host,
                port: env.port,
                rust_log: env.rust_log,
                log_format: env.log_format,
            },
            database: DatabaseConfig {
                url: required(env.database_url, "DATABASE_URL")?,
                pool_size: env.db_pool_size,
            },
            mail: MailConfig {
                server: required(env.mail_server, "MAIL_SERVER")?,
                port: env.mail_port,
                use_tls: env.mail_use_tls,
                username: env.mail_username.filter(|v| !v.is_empty()),
                password: env.mail_password.filter(|v| !v.is_empty()),
                default_sender: required(env.mail_default_sender, "MAIL_DEFAULT_SENDER")?,
                admin_email: required(env.admin_email, "ADMIN_EMAIL")?,
            },
            security: SecurityConfig {
                secret_key: required(env.secret_key, "SECRET_KEY")?,
            },
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

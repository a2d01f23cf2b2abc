//! Конфигурация клиента

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Ошибка загрузки настроек
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("API_BASE_URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),
}

/// Настройки клиента
#[derive(Debug, Clone)]
pub struct Settings {
    /// Базовый адрес REST API (без завершающего слэша)
    pub api_base_url: String,

    /// Готовый токен доступа, если вход уже выполнен
    pub api_token: Option<String>,

    /// Логин для входа при старте
    pub api_login: Option<String>,

    /// Пароль для входа при старте
    pub api_password: Option<String>,

    /// Период опроса списка заявок
    pub poll_interval: Duration,

    /// Таймаут одного HTTP запроса
    pub request_timeout: Duration,

    /// Уровень логирования по умолчанию
    pub log_level: String,
}

impl Settings {
    /// Загрузить настройки из переменных окружения
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url = optional("API_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(api_base_url));
        }

        let poll_interval = match optional("POLL_INTERVAL_SECS") {
            Some(v) => Duration::from_secs(parse_secs("POLL_INTERVAL_SECS", &v)?),
            None => defaults.poll_interval,
        };

        let request_timeout = match optional("REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_secs("REQUEST_TIMEOUT_SECS", &v)?),
            None => defaults.request_timeout,
        };

        Ok(Self {
            api_base_url,
            api_token: optional("API_TOKEN"),
            api_login: optional("API_LOGIN"),
            api_password: optional("API_PASSWORD"),
            poll_interval,
            request_timeout,
            log_level: optional("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Учётные данные для входа, если заданы оба значения
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.api_login, &self.api_password) {
            (Some(login), Some(password)) => Some((login.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// Read a variable, strip quotes, treat empty values as unset
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| strip_quotes(&v))
        .filter(|v| !v.is_empty())
}

fn parse_secs(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

/// Remove surrounding quotes from a string value
/// Handles both single and double quotes
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();

    if (trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2)
        || (trimmed.starts_with('\'') && trimmed.ends_with('\'') && trimmed.len() >= 2)
    {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            api_login: None,
            api_password: None,
            poll_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
        }
    }
}

//! Настройки приложения

mod settings;

pub use settings::{ConfigError, Settings};

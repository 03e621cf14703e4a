use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_dir: String,
    pub max_results: usize,
    pub tick_interval_ms: u64,
    pub locale: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: "./data".to_string(),
            max_results: 100,
            tick_interval_ms: 1000,
            locale: "en".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Config::default();

        let log_format = match get_env_or("LOG_FORMAT", "text").to_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        let config = Self {
            storage_dir: get_env_or("QUIZ_STORAGE_DIR", &defaults.storage_dir),
            max_results: get_env_parse_or("QUIZ_MAX_RESULTS", defaults.max_results)?,
            tick_interval_ms: get_env_parse_or("QUIZ_TICK_INTERVAL_MS", defaults.tick_interval_ms)?,
            locale: get_env_or("QUIZ_LOCALE", &defaults.locale),
            log_format,
        };

        if config.max_results == 0 {
            return Err(Error::Config("QUIZ_MAX_RESULTS must be positive".to_string()));
        }
        if config.tick_interval_ms == 0 {
            return Err(Error::Config(
                "QUIZ_TICK_INTERVAL_MS must be positive".to_string(),
            ));
        }

        Ok(config)
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global; keep every env mutation in this one test.
    #[test]
    fn from_env_reads_overrides_and_rejects_garbage() {
        env::set_var("QUIZ_MAX_RESULTS", "25");
        env::set_var("QUIZ_TICK_INTERVAL_MS", "250");
        env::set_var("QUIZ_LOCALE", "ja");
        env::set_var("LOG_FORMAT", "json");

        let config = Config::from_env().expect("config");
        assert_eq!(config.max_results, 25);
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.locale, "ja");
        assert_eq!(config.log_format, LogFormat::Json);

        env::set_var("QUIZ_MAX_RESULTS", "lots");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("QUIZ_MAX_RESULTS"));

        env::set_var("QUIZ_MAX_RESULTS", "0");
        assert!(matches!(Config::from_env(), Err(Error::Config(_))));

        for name in ["QUIZ_MAX_RESULTS", "QUIZ_TICK_INTERVAL_MS", "QUIZ_LOCALE", "LOG_FORMAT"] {
            env::remove_var(name);
        }
        let config = Config::from_env().expect("defaults");
        assert_eq!(config.max_results, 100);
        assert_eq!(config.log_format, LogFormat::Text);
    }
}

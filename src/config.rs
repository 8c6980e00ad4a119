use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;

/// Scraper configuration, loaded from `config.toml` when present.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Program listing page, relative to `base_url`.
    #[serde(default = "default_program_path")]
    pub program_path: String,
    /// The site prints event dates without a year; this supplies it.
    #[serde(default = "default_festival_year")]
    pub festival_year: i32,
    /// Upper bound on concurrent page fetches (politeness toward the site).
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_base_url() -> String {
    "https://www.lucernefestival.ch".to_string()
}

fn default_program_path() -> String {
    "/en/program/summer-festival-22".to_string()
}

fn default_festival_year() -> i32 {
    2022
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            program_path: default_program_path(),
            festival_year: default_festival_year(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to the
    /// built-in defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        match fs::read_to_string(config_path) {
            Ok(content) => {
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(ScraperError::Config(format!(
                "Failed to read config file '{config_path}': {e}"
            ))),
        }
    }

    pub fn program_url(&self) -> String {
        format!("{}{}", self.base_url, self.program_path)
    }
}

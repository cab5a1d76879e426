use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

use crate::mock::DiversityBias;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub core: CoreConfig,
    #[serde(default)]
    pub spongemock: SpongeMockConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Chats the bot answers in; empty means every chat
    #[serde(default)]
    pub allowed_chat_ids: Vec<i64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CoreConfig {
    /// Regex matched at the start of a line to spot bot commands
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpongeMockConfig {
    #[serde(default = "default_diversity_bias")]
    pub diversity_bias: f64,
    /// Fixed RNG seed, mostly useful for reproducing output
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_prefix() -> String {
    "/".to_string()
}

fn default_diversity_bias() -> f64 {
    DiversityBias::default().value()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

impl Default for SpongeMockConfig {
    fn default() -> Self {
        Self {
            diversity_bias: default_diversity_bias(),
            random_seed: None,
        }
    }
}

impl CoreConfig {
    pub fn prefix_regex(&self) -> Result<Regex> {
        Regex::new(&self.prefix)
            .with_context(|| format!("Invalid command prefix regex: {}", self.prefix))
    }
}

impl SpongeMockConfig {
    pub fn bias(&self) -> Result<DiversityBias> {
        DiversityBias::new(self.diversity_bias).context("Invalid [spongemock] section")
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        // Surface bad values at startup rather than on first use
        config.core.prefix_regex()?;
        config.spongemock.bias()?;

        Ok(config)
    }

    /// Whether the bot should react to events from `chat_id`
    pub fn is_chat_allowed(&self, chat_id: i64) -> bool {
        self.telegram.allowed_chat_ids.is_empty()
            || self.telegram.allowed_chat_ids.contains(&chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("[telegram]\nbot_token = \"t\"\n").unwrap();
        assert_eq!(config.core.prefix, "/");
        assert_eq!(config.spongemock.diversity_bias, 0.6);
        assert_eq!(config.spongemock.random_seed, None);
        assert!(config.is_chat_allowed(-100123));
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [telegram]
            bot_token = "abc"
            allowed_chat_ids = [-1001, 42]

            [core]
            prefix = "[.!]"

            [spongemock]
            diversity_bias = 0.9
            random_seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.telegram.bot_token, "abc");
        assert!(config.is_chat_allowed(42));
        assert!(!config.is_chat_allowed(43));
        assert!(config.core.prefix_regex().unwrap().is_match("!smock"));
        assert_eq!(config.spongemock.bias().unwrap().value(), 0.9);
        assert_eq!(config.spongemock.random_seed, Some(7));
    }

    #[test]
    fn test_bias_out_of_range_is_rejected() {
        let err = Config::parse(
            "[telegram]\nbot_token = \"t\"\n[spongemock]\ndiversity_bias = 1.5\n",
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_bad_prefix_is_rejected() {
        let err = Config::parse("[telegram]\nbot_token = \"t\"\n[core]\nprefix = \"(\"\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_telegram_section() {
        assert!(Config::parse("[spongemock]\ndiversity_bias = 0.5\n").is_err());
    }
}

// Runtime configuration: execution-service settings from the environment and
// per-language overrides from languages.json
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::error::ConfigError;
use crate::judge0::PollPolicy;
use crate::types::Language;

pub const DEFAULT_API_URL: &str = "http://localhost:2358";
pub const DEFAULT_AUTH_HEADER: &str = "X-Auth-Token";
pub const DEFAULT_LANGUAGES_PATH: &str = "config/languages.json";

/// CPU and memory caps sent with each submission
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub cpu_time_limit: f64,
    pub memory_limit_kb: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            cpu_time_limit: 2.0,
            memory_limit_kb: 128_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub auth_header: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub limits: ResourceLimits,
    pub languages_path: PathBuf,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
            poll_interval: Duration::from_millis(1000),
            max_poll_attempts: 30,
            limits: ResourceLimits::default(),
            languages_path: PathBuf::from(DEFAULT_LANGUAGES_PATH),
        }
    }
}

impl JudgeConfig {
    /// Read settings from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unparseable values keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup("JUDGE0_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_url);
        let auth_token = lookup("JUDGE0_AUTH_TOKEN").filter(|token| !token.is_empty());
        let auth_header = lookup("JUDGE0_AUTH_HEADER")
            .filter(|header| !header.is_empty())
            .unwrap_or(defaults.auth_header);

        let poll_interval_ms: u64 = parse_or(&lookup, "JUDGE_POLL_INTERVAL_MS", 1000);
        let max_poll_attempts = parse_or(&lookup, "JUDGE_MAX_POLL_ATTEMPTS", defaults.max_poll_attempts);
        let cpu_time_limit = parse_or(&lookup, "JUDGE_CPU_TIME_LIMIT", defaults.limits.cpu_time_limit);
        let memory_limit_kb = parse_or(&lookup, "JUDGE_MEMORY_LIMIT_KB", defaults.limits.memory_limit_kb);

        let languages_path = lookup("JUDGEKIT_LANGUAGES")
            .map(PathBuf::from)
            .unwrap_or(defaults.languages_path);

        Self {
            api_url,
            auth_token,
            auth_header,
            poll_interval: Duration::from_millis(poll_interval_ms),
            max_poll_attempts,
            limits: ResourceLimits {
                cpu_time_limit,
                memory_limit_kb,
            },
            languages_path,
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.poll_interval,
            max_attempts: self.max_poll_attempts,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key = key, value = %raw, default = ?default, "Invalid config value, using default");
                default
            }
        },
    }
}

/// One entry of languages.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
    pub language_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_time_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit_kb: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageEntry>,
}

/// Language configuration manager
#[derive(Debug, Clone, Default)]
pub struct LanguageConfigManager {
    entries: HashMap<Language, LanguageEntry>,
}

impl LanguageConfigManager {
    /// Load language configurations from a languages.json file
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::NotFound(config_path.display().to_string()));
        }

        let content = fs::read_to_string(config_path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let languages_json: LanguagesJson = serde_json::from_str(content)?;

        let mut entries = HashMap::new();
        for entry in languages_json.languages {
            let language: Language = entry.name.parse()?;
            entries.insert(language, entry);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, language: Language) -> Option<&LanguageEntry> {
        self.entries.get(&language)
    }

    /// Per-language limits, falling back field by field to `defaults`
    pub fn limits_for(&self, language: Language, defaults: ResourceLimits) -> ResourceLimits {
        match self.get(language) {
            Some(entry) => ResourceLimits {
                cpu_time_limit: entry.cpu_time_limit.unwrap_or(defaults.cpu_time_limit),
                memory_limit_kb: entry.memory_limit_kb.unwrap_or(defaults.memory_limit_kb),
            },
            None => defaults,
        }
    }

    /// Configured languages in a stable order
    pub fn list_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|language| self.entries.contains_key(language))
            .collect()
    }
}

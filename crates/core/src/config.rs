use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Env lookups scoped to a profile: `{PROFILE}_{KEY}` wins over `{KEY}`.
/// Empty values count as unset.
#[derive(Debug, Clone, Copy)]
struct ProfiledEnv<'a> {
    profile: &'a str,
}

impl<'a> ProfiledEnv<'a> {
    fn new(profile: &'a str) -> Self {
        Self { profile }
    }

    fn get(&self, key: &str) -> Option<String> {
        let read = |k: &str| env::var(k).ok().filter(|v| !v.is_empty());
        if self.profile.is_empty() {
            return read(key);
        }
        read(&format!("{}_{}", self.profile, key)).or_else(|| read(key))
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parsed value; unparsable input falls back to `default`.
    fn parsed<T: FromStr>(&self, key: &str, default: T) -> T {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }
}

// ── Top-level config ──────────────────────────────────────────

/// Process-level settings read from the environment. Thresholds live in
/// [`crate::quality_config::EngineConfig`], loaded from `quality_config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Path to the QualityConfig YAML document, if any.
    pub quality_config: Option<PathBuf>,
    pub llm: LlmConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `GUARDIAN_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env::var("GUARDIAN_PROFILE").unwrap_or_default();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let profile = profile.trim().to_uppercase();
        let env = ProfiledEnv::new(&profile);
        Self {
            quality_config: env.get("QUALITY_CONFIG").map(PathBuf::from),
            llm: LlmConfig::from_env(env),
            profile,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  quality:     config={}",
            self.quality_config
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(defaults)".to_string())
        );
        tracing::info!(
            "  llm:         provider={}, model={}, configured={}",
            self.llm.provider,
            self.llm.openai_model,
            self.llm.is_configured()
        );
    }
}

// ── LLM (OpenAI-compatible) ──────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "none" or "openai" (any OpenAI-compatible endpoint).
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env(env: ProfiledEnv<'_>) -> Self {
        Self {
            provider: env.string("LLM_PROVIDER", "none"),
            openai_api_key: env.get("OPENAI_API_KEY"),
            openai_model: env.string("OPENAI_MODEL", "gpt-4o-mini"),
            openai_base_url: env.string("OPENAI_BASE_URL", "https://api.openai.com"),
            temperature: env.parsed("LLM_TEMPERATURE", 0.4),
            max_tokens: env.parsed("LLM_MAX_TOKENS", 80),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_not_configured() {
        let llm = LlmConfig {
            provider: "none".to_string(),
            openai_api_key: Some("sk-test".to_string()),
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "http://localhost".to_string(),
            temperature: 0.4,
            max_tokens: 80,
        };
        assert!(!llm.is_configured());
        let openai = LlmConfig {
            provider: "openai".to_string(),
            ..llm
        };
        assert!(openai.is_configured());
    }

    #[test]
    fn profile_label_defaults() {
        let config = Config {
            profile: String::new(),
            quality_config: None,
            llm: LlmConfig::from_env(ProfiledEnv::new("GUARDIAN_TEST_UNSET_PROFILE")),
        };
        assert_eq!(config.profile_label(), "default");
    }

    #[test]
    fn profile_prefix_overrides_plain_key() {
        std::env::set_var("GDTEST_LLM_MAX_TOKENS", "120");
        std::env::set_var("GDTEST_LLM_TEMPERATURE", "warm");
        let config = Config::for_profile("gdtest");
        assert_eq!(config.profile, "GDTEST");
        assert_eq!(config.profile_label(), "GDTEST");
        assert_eq!(config.llm.max_tokens, 120);
        // unparsable values keep the default
        assert_eq!(config.llm.temperature, 0.4);
        std::env::remove_var("GDTEST_LLM_MAX_TOKENS");
        std::env::remove_var("GDTEST_LLM_TEMPERATURE");
    }
}

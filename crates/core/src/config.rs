use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub search: SearchConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            llm: LlmConfig::from_env(),
            search: SearchConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  llm:     model={}, configured={}",
            self.llm.anthropic_model,
            self.llm.is_configured()
        );
        tracing::info!("  search:  max_results={}", self.search.max_results);
    }
}

// ── LLM (Anthropic) ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub base_url: String,
    /// Pinned to 0 so answers are deterministic for a given conversation.
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env() -> Self {
        Self {
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            anthropic_model: env_or("ANTHROPIC_MODEL", "claude-3-5-haiku-20241022"),
            base_url: env_or("ANTHROPIC_BASE_URL", "https://api.anthropic.com"),
            temperature: 0.0,
            max_tokens: env_u32("LLM_MAX_TOKENS", 800),
        }
    }

    /// Without a key the process runs the deterministic simulation path.
    pub fn is_configured(&self) -> bool {
        self.anthropic_api_key.is_some()
    }
}

// ── Search ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub max_results: u32,
}

impl SearchConfig {
    fn from_env() -> Self {
        Self {
            max_results: env_u32("MAX_SEARCH_RESULTS", 5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_pinned_to_zero() {
        let cfg = LlmConfig {
            anthropic_api_key: None,
            anthropic_model: "claude-3-5-haiku-20241022".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            temperature: 0.0,
            max_tokens: 800,
        };
        assert!(!cfg.is_configured());
        assert_eq!(cfg.temperature, 0.0);
        assert_eq!(cfg.max_tokens, 800);
    }

    #[test]
    fn test_configured_with_key_present() {
        let cfg = Config {
            llm: LlmConfig {
                anthropic_api_key: Some("sk-secret".to_string()),
                anthropic_model: "claude-3-5-haiku-20241022".to_string(),
                base_url: "https://api.anthropic.com".to_string(),
                temperature: 0.0,
                max_tokens: 800,
            },
            search: SearchConfig { max_results: 5 },
        };
        assert!(cfg.llm.is_configured());
    }
}

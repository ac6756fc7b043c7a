use clap::{ArgAction, Parser, ValueEnum};
use std::time::Duration;
use thiserror::Error;

// Longest TTL accepted for cached answers (30 days)
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

// Wire protocol spoken by the self-hosted model server
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelServiceProtocol {
    // POST /api/v1/generate -> {text, model}
    Generate,
    // POST /api/generate -> {response, model}
    OllamaGenerate,
    // POST /api/chat -> {message: {content}, model}
    OllamaChat,
}

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "genai-gateway")]
#[command(about = "LLM provider gateway with mock fallback and response caching")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Answer with the mock unless a request names a provider explicitly
    #[arg(long, env = "USE_MOCK_LLM", default_value_t = true, action = ArgAction::Set)]
    pub force_mock: bool,

    // Provider used when a request does not name one: openai | oss | mock
    #[arg(long, env = "LLM_DEFAULT_PROVIDER", default_value = "openai")]
    pub default_provider: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub openai_model: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    // Hosted API timeout in seconds
    #[arg(long, env = "OPENAI_TIMEOUT_SECS", default_value_t = 30)]
    pub openai_timeout: u64,

    #[arg(long, env = "LLM_MAX_TOKENS", default_value_t = 400)]
    pub max_tokens: u32,

    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = 0.3)]
    pub temperature: f32,

    // Self-hosted model server base url
    #[arg(long, env = "MODEL_SERVICE_BASE_URL", default_value = "http://localhost:8001")]
    pub model_service_url: String,

    #[arg(long, env = "MODEL_SERVICE_PROTOCOL", value_enum, default_value_t = ModelServiceProtocol::Generate)]
    pub model_service_protocol: ModelServiceProtocol,

    #[arg(long, env = "OSS_MODEL", default_value = "llama3.2:3b")]
    pub oss_model: String,

    // Self-hosted model timeout in seconds
    #[arg(long, env = "OSS_TIMEOUT_SECS", default_value_t = 60)]
    pub oss_timeout: u64,

    // memory:// | redis://host:port/db | none
    #[arg(long, env = "CACHE_URL", default_value = "memory://")]
    pub cache_url: String,

    // Cache TTL in seconds
    #[arg(short, long, env = "CACHE_TTL_SECS", default_value_t = 3600)]
    pub cache_ttl: u64,

    #[arg(long, env = "CACHE_CONNECT_TIMEOUT_SECS", default_value_t = 2)]
    pub cache_connect_timeout: u64,

    // Entry cap for the in-process cache
    #[arg(long, env = "CACHE_MAX_ENTRIES", default_value_t = 10_000)]
    pub cache_max_entries: usize,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    // Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false, action = ArgAction::Set)]
    pub log_json: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("cache TTL must be at least one second")]
    ZeroTtl,
    #[error("cache TTL must not exceed 30 days, got {0} seconds")]
    TtlTooLong(u64),
    #[error("cache max entries must be positive")]
    ZeroMaxEntries,
    #[error("temperature must be within 0.0..=2.0, got {0}")]
    Temperature(f32),
    #[error("max tokens must be positive")]
    ZeroMaxTokens,
    #[error("{0} is required to construct the hosted backend")]
    MissingCredential(&'static str),
}

#[derive(Debug, Clone)]
pub struct HostedSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct ModelServiceSettings {
    pub base_url: String,
    pub protocol: ModelServiceProtocol,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub url: String,
    pub ttl: Duration,
    pub connect_timeout: Duration,
    pub max_entries: usize,
}

/// Process-wide configuration, built once at startup and handed to each
/// component's constructor.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub force_mock: bool,
    pub default_provider: String,
    pub hosted: HostedSettings,
    pub model_service: ModelServiceSettings,
    pub cache: CacheSettings,
    pub log_level: String,
    pub log_json: bool,
}

impl Settings {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.cache_ttl == 0 {
            return Err(ConfigError::ZeroTtl);
        }
        if args.cache_ttl > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::TtlTooLong(args.cache_ttl));
        }
        if args.cache_max_entries == 0 {
            return Err(ConfigError::ZeroMaxEntries);
        }
        if !(0.0..=2.0).contains(&args.temperature) {
            return Err(ConfigError::Temperature(args.temperature));
        }
        if args.max_tokens == 0 {
            return Err(ConfigError::ZeroMaxTokens);
        }

        Ok(Self {
            port: args.port,
            force_mock: args.force_mock,
            default_provider: args.default_provider.trim().to_lowercase(),
            hosted: HostedSettings {
                api_key: args.openai_api_key.filter(|k| !k.trim().is_empty()),
                model: args.openai_model,
                base_url: args.openai_base_url,
                timeout: Duration::from_secs(args.openai_timeout),
                max_tokens: args.max_tokens,
                temperature: args.temperature,
            },
            model_service: ModelServiceSettings {
                base_url: args.model_service_url,
                protocol: args.model_service_protocol,
                model: args.oss_model,
                timeout: Duration::from_secs(args.oss_timeout),
            },
            cache: CacheSettings {
                url: args.cache_url,
                ttl: Duration::from_secs(args.cache_ttl),
                connect_timeout: Duration::from_secs(args.cache_connect_timeout),
                max_entries: args.cache_max_entries,
            },
            log_level: args.log_level,
            log_json: args.log_json,
        })
    }
}

// Mirrors the CLI defaults without touching the environment
impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 8080,
            force_mock: true,
            default_provider: "openai".to_string(),
            hosted: HostedSettings {
                api_key: None,
                model: "gpt-4o-mini".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                timeout: Duration::from_secs(30),
                max_tokens: 400,
                temperature: 0.3,
            },
            model_service: ModelServiceSettings {
                base_url: "http://localhost:8001".to_string(),
                protocol: ModelServiceProtocol::Generate,
                model: "llama3.2:3b".to_string(),
                timeout: Duration::from_secs(60),
            },
            cache: CacheSettings {
                url: "memory://".to_string(),
                ttl: Duration::from_secs(3600),
                connect_timeout: Duration::from_secs(2),
                max_entries: 10_000,
            },
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["genai-gateway"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_are_mock_first_with_memory_cache() {
        let settings = Settings::from_args(args(&[])).unwrap();
        assert_eq!(settings.cache.ttl, Duration::from_secs(3600));
        assert_eq!(settings.cache.url, "memory://");
        assert_eq!(settings.model_service.protocol, ModelServiceProtocol::Generate);
    }

    #[test]
    fn flags_override_defaults() {
        let settings = Settings::from_args(args(&[
            "--force-mock",
            "false",
            "--default-provider",
            " OSS ",
            "--model-service-protocol",
            "ollama-chat",
            "--cache-ttl",
            "60",
        ]))
        .unwrap();
        assert!(!settings.force_mock);
        assert_eq!(settings.default_provider, "oss");
        assert_eq!(settings.model_service.protocol, ModelServiceProtocol::OllamaChat);
        assert_eq!(settings.cache.ttl, Duration::from_secs(60));
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let settings = Settings::from_args(args(&["--openai-api-key", "  "])).unwrap();
        assert!(settings.hosted.api_key.is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            Settings::from_args(args(&["--cache-ttl", "0"])).unwrap_err(),
            ConfigError::ZeroTtl
        );
        assert_eq!(
            Settings::from_args(args(&["--temperature", "3.5"])).unwrap_err(),
            ConfigError::Temperature(3.5)
        );
        assert_eq!(
            Settings::from_args(args(&["--cache-max-entries", "0"])).unwrap_err(),
            ConfigError::ZeroMaxEntries
        );
    }

    #[test]
    fn oversized_ttl_is_rejected() {
        assert_eq!(
            Settings::from_args(args(&["--cache-ttl", "18446744073709551615"])).unwrap_err(),
            ConfigError::TtlTooLong(u64::MAX)
        );
        let max = MAX_CACHE_TTL_SECS.to_string();
        let settings = Settings::from_args(args(&["--cache-ttl", max.as_str()])).unwrap();
        assert_eq!(settings.cache.ttl, Duration::from_secs(MAX_CACHE_TTL_SECS));
    }
}

use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub llm: LLMConfig,
    pub agent: AgentConfig,
    pub tools: ToolsConfig,
    pub weather: WeatherConfig,
    pub support: SupportConfig,
    pub system: SystemConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai/".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            request_timeout_ms: 30_000,
            max_retries: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl LLMConfig {
    /// Deadline for a single HTTP attempt
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Deadline for one model call: every attempt plus the backoff between them
    pub fn call_budget(&self) -> Duration {
        let attempts = self.max_retries.max(1);
        let backoff_ms = (0..attempts - 1)
            .map(|n| self.retry_base_delay_ms.saturating_mul(2_u64.saturating_pow(n)))
            .fold(0_u64, u64::saturating_add);

        Duration::from_millis(
            self.request_timeout_ms
                .saturating_mul(attempts as u64)
                .saturating_add(backoff_ms),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Upper bound on model calls within a single role run
    pub max_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_turns: 8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub faq_enabled: bool,
    pub order_status_enabled: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 2,
            faq_enabled: true,
            order_status_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "http://api.weatherapi.com".to_string(),
            api_key_env: "WEATHER_API_KEY".to_string(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportConfig {
    pub customer_id: String,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            customer_id: "CUST-1234".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub channel_buffer_size: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then `config/{CONFIG_ENV}` if present, then `APP__*` overrides
    pub fn new() -> Result<Self, ConfigError> {
        let config_env = env::var("CONFIG_ENV").unwrap_or_else(|_| "default".to_string());

        let config = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name(&format!("config/{}", config_env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from an explicit file, layered over the defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        config.try_deserialize()
    }

    pub fn api_key(&self) -> Result<String> {
        let var = &self.llm.api_key_env;
        env::var(var).map_err(|_| {
            anyhow::anyhow!("{} not found. Make sure it's set in your .env file.", var)
        })
    }

    /// The weather key is optional; without it the weather tool is never offered
    pub fn weather_api_key(&self) -> Option<String> {
        env::var(&self.weather.api_key_env).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_target_gemini_endpoint() {
        let settings = Settings::default();

        assert_eq!(settings.llm.model, "gemini-2.5-flash");
        assert!(settings.llm.base_url.contains("generativelanguage"));
        assert!(settings.tools.faq_enabled);
        assert!(settings.tools.order_status_enabled);
        assert_eq!(settings.support.customer_id, "CUST-1234");
    }

    #[test]
    fn test_from_file_overrides_only_given_keys() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[llm]\nmodel = \"local-model\"\n\n[tools]\norder_status_enabled = false\n"
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();

        assert_eq!(settings.llm.model, "local-model");
        assert!(!settings.tools.order_status_enabled);
        // Untouched keys keep their defaults
        assert!(settings.tools.faq_enabled);
        assert_eq!(settings.agent.max_turns, 8);
    }

    #[test]
    fn test_missing_api_key_names_the_variable() {
        let mut settings = Settings::default();
        settings.llm.api_key_env = "DESKBOT_TEST_UNSET_KEY".to_string();

        let err = settings.api_key().unwrap_err();
        assert!(err.to_string().contains("DESKBOT_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_call_budget_covers_every_attempt_and_backoff() {
        let mut llm = Settings::default().llm;
        llm.request_timeout_ms = 300;
        llm.max_retries = 3;
        llm.retry_base_delay_ms = 10;

        // 3 attempts of 300ms, then backoff of 10ms and 20ms between them
        assert_eq!(llm.call_budget(), Duration::from_millis(930));

        llm.max_retries = 0;
        assert_eq!(llm.call_budget(), llm.request_timeout());
    }
}

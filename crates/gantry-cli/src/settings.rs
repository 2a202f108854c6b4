use config::{Config, Environment, File};
use gantry::providers::configs::{OpenAiProviderConfig, OPENAI_HOST, OPENAI_MODEL};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing API key: set GANTRY_PROVIDER__API_KEY or OPENAI_API_KEY, or pass --api-key")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub host: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

impl ProviderSettings {
    /// Resolve the final provider config, falling back to `OPENAI_API_KEY`
    pub fn into_config(self) -> Result<OpenAiProviderConfig, ConfigError> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .or_else(|| env::var("OPENAI_API_KEY").ok())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(OpenAiProviderConfig {
            host: self.host,
            api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    pub system_prompt: String,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub agent: AgentSettings,
}

impl Settings {
    /// Defaults, then the optional config file, then `GANTRY_*` variables
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("provider.host", OPENAI_HOST)?
            .set_default("provider.model", OPENAI_MODEL)?
            .set_default("agent.system_prompt", DEFAULT_SYSTEM_PROMPT)?
            .set_default("agent.verbose", false)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("GANTRY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            ConfigError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("GANTRY_") {
                env::remove_var(&key);
            }
        }
        env::remove_var("OPENAI_API_KEY");
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.provider.host, "https://api.openai.com");
        assert_eq!(settings.provider.model, "gpt-4o");
        assert_eq!(settings.provider.api_key, None);
        assert_eq!(settings.agent.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert!(!settings.agent.verbose);
        assert_eq!(settings.agent.max_rounds, None);

        assert!(matches!(
            settings.provider.into_config(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("GANTRY_PROVIDER__API_KEY", "test-key");
        env::set_var("GANTRY_PROVIDER__MODEL", "gpt-4o-mini");
        env::set_var("GANTRY_PROVIDER__TEMPERATURE", "0.2");
        env::set_var("GANTRY_AGENT__MAX_ROUNDS", "4");
        env::set_var("GANTRY_AGENT__VERBOSE", "true");

        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.agent.max_rounds, Some(4));
        assert!(settings.agent.verbose);

        let config = settings.provider.into_config().unwrap();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.max_tokens, None);

        clean_env();
    }

    #[test]
    #[serial]
    fn test_openai_key_fallback() {
        clean_env();
        env::set_var("OPENAI_API_KEY", "from-openai-env");

        let settings = Settings::load(None).unwrap();
        let config = settings.provider.into_config().unwrap();
        assert_eq!(config.api_key, "from-openai-env");

        clean_env();
    }

    #[test]
    #[serial]
    fn test_file_then_environment() {
        clean_env();
        let path = env::temp_dir().join(format!("gantry-settings-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[provider]\nmodel = \"from-file\"\nhost = \"http://localhost:8080\"\n\n[agent]\nsystem_prompt = \"Be brief.\""
        )
        .unwrap();
        env::set_var("GANTRY_PROVIDER__MODEL", "from-env");

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.provider.model, "from-env");
        assert_eq!(settings.provider.host, "http://localhost:8080");
        assert_eq!(settings.agent.system_prompt, "Be brief.");

        std::fs::remove_file(&path).unwrap();
        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_file_is_an_error() {
        clean_env();
        let path = env::temp_dir().join("gantry-settings-does-not-exist.toml");
        assert!(matches!(
            Settings::load(Some(&path)),
            Err(ConfigError::Invalid(_))
        ));
    }
}

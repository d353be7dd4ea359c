use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub context: ContextConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-call deadline so a hung provider cannot block a request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            dims: None,
            url: None,
            batch_size: 32,
            max_retries: 5,
            timeout_secs: 10,
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_batch_size() -> usize {
    32
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    /// Top-k fragments fetched from the ranker per query.
    #[serde(default = "default_match_limit")]
    pub match_limit: usize,
    /// Compatibility fallback: claim files that have no session into
    /// the querying session when that session has no files of its
    /// own. Models "user uploaded before a session existed"; off by
    /// default because it can mis-assign files from an abandoned
    /// context.
    #[serde(default)]
    pub claim_unassigned_files: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            match_limit: default_match_limit(),
            claim_unassigned_files: false,
        }
    }
}

fn default_match_limit() -> usize {
    10
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.context.match_limit < 1 {
        anyhow::bail!("context.match_limit must be >= 1");
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" | "ollama" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, openai, or ollama.",
            other
        ),
    }

    if config.embedding.is_enabled() {
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.batch_size == 0 {
            anyhow::bail!("embedding.batch_size must be > 0");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.embedding.provider, "disabled");
        assert!(!config.embedding.is_enabled());
        assert_eq!(config.context.match_limit, 10);
        assert!(!config.context.claim_unassigned_files);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [embedding]
            provider = "openai"
            model = "text-embedding-3-small"
            dims = 1536
            timeout_secs = 15

            [context]
            match_limit = 20
            claim_unassigned_files = true
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        validate(&config).unwrap();
        assert!(config.embedding.is_enabled());
        assert_eq!(config.embedding.dims, Some(1536));
        assert_eq!(config.embedding.timeout_secs, 15);
        assert_eq!(config.context.match_limit, 20);
        assert!(config.context.claim_unassigned_files);
    }

    #[test]
    fn test_enabled_provider_requires_model_and_dims() {
        let config: Config = toml::from_str("[embedding]\nprovider = \"openai\"").unwrap();
        assert!(validate(&config).is_err());

        let config: Config =
            toml::from_str("[embedding]\nprovider = \"openai\"\nmodel = \"m\"").unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config: Config = toml::from_str("[embedding]\nprovider = \"cohere\"").unwrap();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("Unknown embedding provider"));
    }

    #[test]
    fn test_match_limit_validated() {
        let config: Config = toml::from_str("[context]\nmatch_limit = 0").unwrap();
        assert!(validate(&config).is_err());
    }
}

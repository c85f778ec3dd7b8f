// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::escalation::EscalationPolicy;
use crate::infra::errors::TownhallError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub reveal: RevealConfig,

    #[serde(default)]
    pub escalation: EscalationConfig,

    #[serde(default)]
    pub persona: PersonaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: crate::provider::openai::DEFAULT_MODEL.into(),
            temperature: crate::provider::DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Per-character reveal interval in milliseconds. Valid range 8–30.
    pub interval_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { interval_ms: 15 }
    }
}

impl RevealConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.clamp(8, 30))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// "conversation-window" or "last-turn".
    pub policy: String,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            policy: "conversation-window".into(),
        }
    }
}

impl EscalationConfig {
    pub fn policy(&self) -> Result<EscalationPolicy, TownhallError> {
        match self.policy.as_str() {
            "conversation-window" => Ok(EscalationPolicy::ConversationWindow),
            "last-turn" => Ok(EscalationPolicy::LastTurn),
            other => Err(TownhallError::Config(format!(
                "unknown escalation policy '{}' (expected 'conversation-window' or 'last-turn')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub name: Option<String>,
    pub system_prompt: Option<String>,
    pub refusal_sentence: Option<String>,
}

impl Config {
    /// Load from the default location, falling back to defaults when no
    /// config file exists.
    pub fn load() -> Result<Self, TownhallError> {
        let path = paths::config_file();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, TownhallError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| TownhallError::Config(format!("{}: {}", path.display(), e)))?;
        // Surface a bad policy string at load time, not mid-turn.
        config.escalation.policy()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.model.model, "gpt-4.1");
        assert_eq!(c.model.temperature, 0.7);
        assert_eq!(c.reveal.interval_ms, 15);
        assert_eq!(
            c.escalation.policy().unwrap(),
            EscalationPolicy::ConversationWindow
        );
    }

    #[test]
    fn test_reveal_interval_clamped() {
        let fast = RevealConfig { interval_ms: 1 };
        assert_eq!(fast.interval(), Duration::from_millis(8));
        let slow = RevealConfig { interval_ms: 500 };
        assert_eq!(slow.interval(), Duration::from_millis(30));
    }

    #[test]
    fn test_parse_partial_toml() {
        let c: Config = toml::from_str(
            r#"
            [escalation]
            policy = "last-turn"

            [persona]
            name = "Ben Vazquez"
            "#,
        )
        .unwrap();
        assert_eq!(c.escalation.policy().unwrap(), EscalationPolicy::LastTurn);
        assert_eq!(c.persona.name.as_deref(), Some("Ben Vazquez"));
        assert_eq!(c.model.model, "gpt-4.1");
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let c = EscalationConfig {
            policy: "both".into(),
        };
        assert!(c.policy().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[reveal]\ninterval_ms = 8\n").unwrap();
        let c = Config::load_from(&path).unwrap();
        assert_eq!(c.reveal.interval_ms, 8);
    }
}

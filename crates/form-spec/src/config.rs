use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Engine-wide settings supplied by the hosting application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Host every public form link starts with.
    pub share_base_url: String,
    /// Slug used when a title has no alphanumeric characters.
    pub fallback_slug: String,
    /// Upper bound (exclusive) of the link disambiguating suffix.
    pub suffix_range: u32,
    /// How many answers an open-text summary lists.
    pub recent_answers: usize,
    /// Cell text for unanswered questions in the individual view.
    pub missing_cell: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            share_base_url: "https://form.respondi.app".into(),
            fallback_slug: "meu-formulario".into(),
            suffix_range: 1000,
            recent_answers: 3,
            missing_cell: "—".into(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON config; blank input yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }
}

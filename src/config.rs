use crate::error::QueryError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_SAMPLE_ATTEMPTS: u32 = 50;

/// Tunables for [`crate::LevelQuery`]. Missing JSON keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Draws the random sampler makes before falling back.
    pub max_sample_attempts: u32,
    /// Entity search only reports living entities.
    pub living_only: bool,
    /// Clamp the fallback position's y to the build height. Off by default, so a
    /// fallback may land outside the buildable range.
    pub clamp_fallback_height: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            max_sample_attempts: DEFAULT_MAX_SAMPLE_ATTEMPTS,
            living_only: true,
            clamp_fallback_height: false,
        }
    }
}

impl QueryConfig {
    pub fn from_json(settings: &str) -> Result<Self, QueryError> {
        if settings.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(settings)?)
    }

    pub fn to_json(&self) -> Result<String, QueryError> {
        Ok(serde_json::to_string(self)?)
    }

    /// JSON description of the accepted settings keys.
    pub fn settings_schema() -> String {
        serde_json::json!({
            "max_sample_attempts": {
                "type": "integer",
                "default": DEFAULT_MAX_SAMPLE_ATTEMPTS,
                "description": "Random draws before the sampler returns its fallback position"
            },
            "living_only": {
                "type": "boolean",
                "default": true,
                "description": "Only living entities are returned by entity searches"
            },
            "clamp_fallback_height": {
                "type": "boolean",
                "default": false,
                "description": "Clamp the fallback position to the build height"
            }
        })
        .to_string()
    }
}

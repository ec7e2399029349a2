use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Dimensions, LayoutError, LayoutLimits};
use crate::parsers::hydrate::{HydrateOptions, HydrationPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("default dimensions: {0}")]
    Layout(#[from] LayoutError),
    #[error("limits need minimums of at least 1 that do not exceed the maximums ({0})")]
    InvalidLimits(LayoutLimits),
    #[error("hydration fallback {dimensions} must be between 1×1×1 and {max}")]
    InvalidFallback { dimensions: Dimensions, max: Dimensions },
}

/// Editor settings. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub limits: LayoutLimits,
    /// Dimensions a new bus starts with.
    pub default_dimensions: Dimensions,
    /// Layout used for an existing bus that has no recorded seats.
    pub hydration_fallback: Dimensions,
    pub hydration_policy: HydrationPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            limits: LayoutLimits::default(),
            default_dimensions: Dimensions::new(1, 6, 3),
            hydration_fallback: Dimensions::new(1, 6, 3),
            hydration_policy: HydrationPolicy::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the limits, then the default and fallback dimensions against
    /// them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.limits.is_consistent() {
            return Err(ConfigError::InvalidLimits(self.limits));
        }
        self.limits.check(self.default_dimensions)?;

        let fallback = self.hydration_fallback;
        let max = self.limits.max_dimensions();
        let fits = (1..=max.decks).contains(&fallback.decks)
            && (1..=max.rows).contains(&fallback.rows)
            && (1..=max.cols).contains(&fallback.cols);
        if !fits {
            return Err(ConfigError::InvalidFallback {
                dimensions: fallback,
                max,
            });
        }
        Ok(())
    }

    pub fn hydrate_options(&self) -> HydrateOptions {
        HydrateOptions {
            policy: self.hydration_policy,
            limits: self.limits,
            fallback: self.hydration_fallback,
        }
    }
}

//! Planner configuration.
//!
//! # Environment Variables
//!
//! - `DSTAR_COST_ATTRIBUTE`: edge attribute holding traversal cost (default: `cost`)
//! - `DSTAR_DEFAULT_WEIGHT`: weight used when an edge lacks the attribute (default: `1.0`)
//! - `DSTAR_STEP_LIMIT`: cap on propagation steps per `compute` call (default: unbounded)

use serde::{Deserialize, Serialize};

/// Edge attribute consulted for traversal cost unless configured otherwise.
pub const DEFAULT_COST_ATTRIBUTE: &str = "cost";

/// Weight assumed for edges that carry no cost attribute.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Configuration for a [`crate::DStarPlanner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Name of the edge attribute holding traversal cost.
    pub cost_attribute: String,
    /// Weight used when an edge exists but lacks the cost attribute.
    pub default_weight: f64,
    /// Maximum number of propagation steps a single `compute` call may take.
    pub step_limit: Option<usize>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            cost_attribute: DEFAULT_COST_ATTRIBUTE.to_string(),
            default_weight: DEFAULT_WEIGHT,
            step_limit: None,
        }
    }
}

impl PlannerConfig {
    /// Create configuration from environment variables, falling back to the
    /// defaults for anything absent or unparseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(attribute) = std::env::var("DSTAR_COST_ATTRIBUTE") {
            if !attribute.trim().is_empty() {
                config.cost_attribute = attribute.trim().to_string();
            }
        }

        if let Ok(raw) = std::env::var("DSTAR_DEFAULT_WEIGHT") {
            match raw.trim().parse::<f64>() {
                Ok(weight) if weight.is_finite() && weight >= 0.0 => config.default_weight = weight,
                _ => tracing::warn!(value = %raw, "ignoring invalid DSTAR_DEFAULT_WEIGHT"),
            }
        }

        if let Ok(raw) = std::env::var("DSTAR_STEP_LIMIT") {
            match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => config.step_limit = Some(limit),
                _ => tracing::warn!(value = %raw, "ignoring invalid DSTAR_STEP_LIMIT"),
            }
        }

        config
    }

    /// Use a different edge attribute for traversal cost.
    pub fn with_cost_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.cost_attribute = attribute.into();
        self
    }

    /// Use a different weight for edges without a cost attribute.
    pub fn with_default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        self
    }

    /// Cap the number of propagation steps per `compute` call.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_cost_attribute() {
        let config = PlannerConfig::default();
        assert_eq!(config.cost_attribute, "cost");
        assert_eq!(config.default_weight, 1.0);
        assert!(config.step_limit.is_none());
    }

    #[test]
    fn builder_overrides_fields() {
        let config = PlannerConfig::default()
            .with_cost_attribute("weight")
            .with_default_weight(2.5)
            .with_step_limit(10);
        assert_eq!(config.cost_attribute, "weight");
        assert_eq!(config.default_weight, 2.5);
        assert_eq!(config.step_limit, Some(10));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"default_weight": 3.0}"#).expect("valid config");
        assert_eq!(config.cost_attribute, "cost");
        assert_eq!(config.default_weight, 3.0);
    }
}

//! Pipeline configuration from YAML

use crate::core::registry::StepRegistry;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of history records kept in memory
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Pipeline version (optional)
    #[serde(default)]
    pub version: Option<String>,

    /// Ordered revision steps
    pub steps: Vec<StepConfig>,

    /// How many history records to retain
    #[serde(default)]
    pub history_capacity: Option<usize>,

    /// External revision command (overrides the default client command)
    #[serde(default)]
    pub command: Option<String>,

    /// Timeout for each step execution (in seconds)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Human-readable step name
    pub name: String,

    /// Optional step description
    #[serde(default)]
    pub description: Option<String>,

    /// Label of the external tool backing this step
    pub tool: String,
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            anyhow::bail!("pipeline '{}' defines no steps", self.name);
        }

        let mut seen_names = std::collections::HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                anyhow::bail!("pipeline '{}' has a step with an empty name", self.name);
            }
            if !seen_names.insert(&step.name) {
                anyhow::bail!("Duplicate step name: {}", step.name);
            }
            if step.tool.trim().is_empty() {
                anyhow::bail!("Step '{}' has an empty tool label", step.name);
            }
        }

        if let Some(capacity) = self.history_capacity {
            if capacity == 0 {
                anyhow::bail!("history_capacity must be at least 1");
            }
        }

        Ok(())
    }

    /// History capacity with the default applied
    pub fn history_capacity(&self) -> usize {
        self.history_capacity.unwrap_or(DEFAULT_HISTORY_CAPACITY)
    }

    /// Convert config to a step registry
    pub fn to_registry(&self) -> Result<StepRegistry> {
        StepRegistry::new(
            self.steps
                .iter()
                .map(|s| {
                    (
                        s.name.clone(),
                        s.description.clone().unwrap_or_default(),
                        s.tool.clone(),
                    )
                })
                .collect(),
        )
    }
}

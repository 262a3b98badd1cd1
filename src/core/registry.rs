//! Step catalog domain model

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A single revision step in the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Position in the pipeline, 1-based
    pub number: usize,

    /// Human-readable step name
    pub name: String,

    /// What the step does to the text
    pub description: String,

    /// Label of the external tool backing this step
    pub tool_label: String,
}

/// Ordered, immutable catalog of pipeline steps
///
/// Loaded once at startup, either from a YAML config or from the built-in
/// default catalog. Step numbers are assigned from position so they are
/// always contiguous `1..=N`.
#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: Vec<Step>,
}

impl StepRegistry {
    /// Build a registry from ordered step definitions
    pub fn new(definitions: Vec<(String, String, String)>) -> Result<Self> {
        if definitions.is_empty() {
            anyhow::bail!("a pipeline needs at least one step");
        }

        let steps = definitions
            .into_iter()
            .enumerate()
            .map(|(index, (name, description, tool_label))| Step {
                number: index + 1,
                name,
                description,
                tool_label,
            })
            .collect();

        Ok(Self { steps })
    }

    /// The built-in six-step editorial catalog
    pub fn default_catalog() -> Self {
        let definitions = vec![
            (
                "Simplify",
                "Tighten wording and drop redundant qualifiers while keeping the meaning intact",
                "GPT-4o",
            ),
            (
                "Grammar",
                "Correct spelling, punctuation, and grammatical errors",
                "Trinka",
            ),
            (
                "Tone",
                "Shift the text toward a clear, professional tone",
                "Wordtune",
            ),
            (
                "Style",
                "Smooth stylistic inconsistencies and awkward phrasing",
                "LanguageTool",
            ),
            (
                "Sensitivity",
                "Flag and soften biased or inappropriate expressions",
                "GPT-4o",
            ),
            (
                "Final review",
                "Polish the text into its final, natural form",
                "QuillBot",
            ),
        ];

        // The built-in catalog is non-empty, so this cannot fail.
        Self::new(
            definitions
                .into_iter()
                .map(|(n, d, t)| (n.to_string(), d.to_string(), t.to_string()))
                .collect(),
        )
        .unwrap()
    }

    /// Look up a step by its 1-based number
    pub fn get(&self, number: usize) -> Option<&Step> {
        if number == 0 {
            return None;
        }
        self.steps.get(number - 1)
    }

    /// Number of steps in the pipeline
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The final step number, `N`
    pub fn last_number(&self) -> usize {
        self.steps.len()
    }

    /// Iterate the catalog in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::default_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_contiguous() {
        let registry = StepRegistry::default_catalog();
        assert_eq!(registry.len(), 6);
        for (index, step) in registry.iter().enumerate() {
            assert_eq!(step.number, index + 1);
        }
    }

    #[test]
    fn test_get_is_one_based() {
        let registry = StepRegistry::default_catalog();
        assert!(registry.get(0).is_none());
        assert_eq!(registry.get(1).unwrap().name, "Simplify");
        assert_eq!(registry.get(6).unwrap().name, "Final review");
        assert!(registry.get(7).is_none());
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(StepRegistry::new(vec![]).is_err());
    }

    #[test]
    fn test_custom_catalog_numbers_from_position() {
        let registry = StepRegistry::new(vec![
            ("Draft".into(), "First pass".into(), "GPT-4o".into()),
            ("Check".into(), "Second pass".into(), "LanguageTool".into()),
        ])
        .unwrap();
        assert_eq!(registry.last_number(), 2);
        assert_eq!(registry.get(2).unwrap().tool_label, "LanguageTool");
    }
}

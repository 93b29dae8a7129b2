//! Ordered step registry.

use super::definition::StepDefinition;

/// A successful lookup: the definition and its positional captures.
#[derive(Debug)]
pub struct StepMatch<'r> {
    pub definition: &'r StepDefinition,
    pub captures: Vec<String>,
}

/// Read-only summary of one definition for `--list-steps`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DefinitionInfo {
    pub pattern: &'static str,
    pub description: &'static str,
    pub has_setup: bool,
    pub has_threshold: bool,
    pub imports: Vec<&'static str>,
    pub metrics: Vec<&'static str>,
}

/// Registry of step definitions, consulted in declaration order.
///
/// The first definition whose pattern matches wins, so narrower patterns
/// must be registered before broader ones that would shadow them.
#[derive(Debug, Default)]
pub struct StepRegistry {
    definitions: Vec<StepDefinition>,
}

impl StepRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition after all existing ones.
    pub fn register(&mut self, definition: StepDefinition) {
        self.definitions.push(definition);
    }

    /// Append several definitions, keeping their order.
    pub fn register_all(&mut self, definitions: impl IntoIterator<Item = StepDefinition>) {
        self.definitions.extend(definitions);
    }

    /// Find the first definition matching `text`.
    ///
    /// Returns `None` for unrecognized text; never fails.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<StepMatch<'_>> {
        self.definitions.iter().find_map(|definition| {
            definition.captures(text).map(|captures| StepMatch {
                definition,
                captures,
            })
        })
    }

    /// Describe every definition in registry order.
    #[must_use]
    pub fn list_definitions(&self) -> Vec<DefinitionInfo> {
        self.definitions
            .iter()
            .map(|d| DefinitionInfo {
                pattern: d.source(),
                description: d.description,
                has_setup: d.setup.is_some(),
                has_threshold: d.threshold.is_some(),
                imports: d.imports.to_vec(),
                metrics: d.metrics.iter().map(|m| m.external_name).collect(),
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

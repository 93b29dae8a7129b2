//! Core data types for the compiler.
//!
//! A `Feature` is what the parser produces from one feature file. Its
//! scenario templates are already expanded, so every `ResolvedScenario`
//! is ready for code generation.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Runs of characters that are neither letters nor digits.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex"));

/// Generate a filename-friendly slug.
///
/// Lowercases the text, collapses every run of non-alphanumeric characters
/// into a single `-`, and trims leading/trailing separators.
///
/// # Examples
/// ```
/// use bdd_k6_compiler::types::slugify;
///
/// assert_eq!(
///     slugify("Product search [Load Test — Row 1]"),
///     "product-search-load-test-row-1"
/// );
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    SLUG_SEPARATORS
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// An insertion-ordered string map of scenario parameters.
///
/// Keys come from example-table headers, so no fixed schema is assumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a value, falling back to `default` when absent or blank.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(v) if !v.trim().is_empty() => v,
            _ => default,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Tabular data attached to a step (first row is the header, if any).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StepTable {
    pub rows: Vec<Vec<String>>,
}

/// One Given/When/Then instruction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Step {
    /// Keyword as written in the source, trimmed (`Given`, `Dado`, `And`, ...).
    pub keyword: String,

    /// Natural-language text after placeholder resolution.
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<StepTable>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl Step {
    #[must_use]
    pub fn new(keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into().trim().to_string(),
            text: text.into(),
            table: None,
            docstring: None,
        }
    }

    /// `keyword text`, used as the group label in generated scripts.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.keyword, self.text)
    }
}

/// Whether a scenario was written plainly or expanded from a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Plain,
    Templated,
}

/// A concrete, placeholder-free scenario.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedScenario {
    pub name: String,
    pub tags: Vec<String>,
    pub kind: ScenarioKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_group_name: Option<String>,
    pub parameters: Parameters,
    pub steps: Vec<Step>,
}

impl ResolvedScenario {
    /// Create a plain scenario with no parameters.
    #[must_use]
    pub fn plain(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            kind: ScenarioKind::Plain,
            example_group_name: None,
            parameters: Parameters::new(),
            steps,
        }
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A parsed feature file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub source_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Vec<Step>>,
    pub scenarios: Vec<ResolvedScenario>,
}

impl Feature {
    /// Background steps, or an empty slice.
    #[must_use]
    pub fn background_steps(&self) -> &[Step] {
        self.background.as_deref().unwrap_or(&[])
    }
}

/// One stage of a ramping profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Stage {
    pub duration_secs: u64,
    pub target: u32,
}

/// Virtual-user/duration shape of a generated script.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadProfile {
    /// A single batch of VUs running a set number of iterations each.
    Fixed { virtual_users: u32, iterations: u32 },
    /// Ramp-up, steady, ramp-down.
    Ramping { start_vus: u32, stages: Vec<Stage> },
}

impl LoadProfile {
    /// Sum of stage durations (zero for fixed profiles).
    #[must_use]
    pub fn total_stage_secs(&self) -> u64 {
        match self {
            Self::Fixed { .. } => 0,
            Self::Ramping { stages, .. } => stages.iter().map(|s| s.duration_secs).sum(),
        }
    }
}

/// A rendered script for one resolved scenario.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GeneratedScript {
    pub scenario_name: String,
    pub source_text: String,
    pub output_path: PathBuf,
    pub load_profile: LoadProfile,
    pub parameters: Parameters,
    /// Labels of steps no definition matched.
    pub unrecognized_steps: Vec<String>,
}

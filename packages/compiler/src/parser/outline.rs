//! Scenario template expansion.
//!
//! A template (a scenario with one or more `Examples` tables) yields one
//! `ResolvedScenario` per data row of each table, in table order.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::{Parameters, ResolvedScenario, ScenarioKind, Step, StepTable};

/// Label used for example tables that carry no name.
pub const DEFAULT_EXAMPLES_NAME: &str = "Default";

/// `<name>` placeholder.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>\n]+)>").expect("valid regex"));

/// Tags and steps a scenario inherits from an enclosing `Rule`.
#[derive(Debug, Clone, Default)]
pub struct Inherited {
    pub tags: Vec<String>,
    pub steps: Vec<Step>,
}

/// Replace every `<name>` whose name is a known parameter.
///
/// Unknown placeholders are left verbatim. Substitution is single-pass:
/// a value that itself contains `<other>` is not expanded again.
#[must_use]
pub fn substitute(text: &str, params: &Parameters) -> String {
    if params.is_empty() {
        return text.to_string();
    }
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| match params.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Apply placeholder substitution to a step's text, table cells and doc string.
#[must_use]
pub fn substitute_step(step: &Step, params: &Parameters) -> Step {
    Step {
        keyword: step.keyword.clone(),
        text: substitute(&step.text, params),
        table: step.table.as_ref().map(|t| StepTable {
            rows: t
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| substitute(cell, params)).collect())
                .collect(),
        }),
        docstring: step.docstring.as_ref().map(|d| substitute(d, params)),
    }
}

/// Strip a leading `@` and drop duplicates, keeping first occurrence order.
#[must_use]
pub fn normalize_tags<'a>(tags: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().trim_start_matches('@').to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Convert a gherkin step into our representation.
#[must_use]
pub fn convert_step(step: &gherkin::Step) -> Step {
    let mut converted = Step::new(step.keyword.as_str(), step.value.trim());
    converted.table = step.table.as_ref().map(|t| StepTable {
        rows: t.rows.clone(),
    });
    converted.docstring = step.docstring.clone();
    converted
}

/// Build the parameter map for one data row.
///
/// Missing cells map to the empty string; surplus cells are ignored.
fn row_parameters(header: &[String], row: &[String]) -> Parameters {
    header
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = row.get(i).map(|c| c.trim()).unwrap_or_default();
            (column.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Resolve a scenario into one or more concrete scenarios.
#[must_use]
pub fn resolve_scenario(
    scenario: &gherkin::Scenario,
    inherited: &Inherited,
) -> Vec<ResolvedScenario> {
    let steps: Vec<Step> = inherited
        .steps
        .iter()
        .cloned()
        .chain(scenario.steps.iter().map(convert_step))
        .collect();
    let scenario_tags: Vec<String> = inherited
        .tags
        .iter()
        .cloned()
        .chain(normalize_tags(&scenario.tags))
        .collect();

    let name = scenario.name.trim();

    if scenario.examples.is_empty() {
        return vec![ResolvedScenario {
            name: name.to_string(),
            tags: normalize_tags(&scenario_tags),
            kind: ScenarioKind::Plain,
            example_group_name: None,
            parameters: Parameters::new(),
            steps,
        }];
    }

    let mut resolved = Vec::new();
    for examples in &scenario.examples {
        let Some(table) = examples.table.as_ref() else {
            tracing::debug!(scenario = name, "examples block without table, no rows");
            continue;
        };
        let Some((header, rows)) = table.rows.split_first() else {
            continue;
        };

        let group_name = examples
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        let label = group_name.unwrap_or(DEFAULT_EXAMPLES_NAME);
        let tags = normalize_tags(scenario_tags.iter().chain(&normalize_tags(&examples.tags)));

        for (index, row) in rows.iter().enumerate() {
            let parameters = row_parameters(header, row);
            let steps = steps
                .iter()
                .map(|step| substitute_step(step, &parameters))
                .collect();

            resolved.push(ResolvedScenario {
                name: format!("{name} [{label} — Row {}]", index + 1),
                tags: tags.clone(),
                kind: ScenarioKind::Templated,
                example_group_name: group_name.map(String::from),
                parameters,
                steps,
            });
        }
    }

    resolved
}

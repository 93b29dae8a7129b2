//! Step definition records.

use std::fmt;

use regex::Regex;

use crate::types::{Parameters, Step};

/// Kind of custom metric a step declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Duration distribution (`Trend`).
    Trend,
    /// Boolean ratio (`Rate`).
    Rate,
    /// Monotonic sum (`Counter`).
    Counter,
    /// Last observed value (`Gauge`).
    Gauge,
}

impl MetricKind {
    /// Class exported by `k6/metrics`.
    #[must_use]
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Trend => "Trend",
            Self::Rate => "Rate",
            Self::Counter => "Counter",
            Self::Gauge => "Gauge",
        }
    }
}

/// A custom metric declaration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MetricDecl {
    /// Script-level identifier (`productSearchDuration`).
    pub name: &'static str,
    pub kind: MetricKind,
    /// Name reported by the engine (`product_search_duration`).
    pub external_name: &'static str,
    /// Values are durations in milliseconds.
    pub is_time: bool,
}

impl MetricDecl {
    #[must_use]
    pub const fn trend(name: &'static str, external_name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Trend,
            external_name,
            is_time: true,
        }
    }

    #[must_use]
    pub const fn rate(name: &'static str, external_name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Rate,
            external_name,
            is_time: false,
        }
    }

    #[must_use]
    pub const fn counter(name: &'static str, external_name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            external_name,
            is_time: false,
        }
    }

    #[must_use]
    pub const fn gauge(name: &'static str, external_name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            external_name,
            is_time: false,
        }
    }
}

/// A pass/fail rule on one metric, e.g. `p(95)<500` on `http_req_duration`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Threshold {
    pub metric: String,
    pub rule: String,
}

impl Threshold {
    #[must_use]
    pub fn new(metric: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            rule: rule.into(),
        }
    }
}

/// What a generator sees for one matched step.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Positional capture groups; groups that did not participate are empty.
    pub captures: &'a [String],
    pub step: &'a Step,
    pub parameters: &'a Parameters,
}

impl<'a> StepContext<'a> {
    #[must_use]
    pub fn new(captures: &'a [String], step: &'a Step, parameters: &'a Parameters) -> Self {
        Self {
            captures,
            step,
            parameters,
        }
    }

    /// Capture group `index` (0-based), or `""`.
    #[must_use]
    pub fn capture(&self, index: usize) -> &'a str {
        self.captures.get(index).map_or("", String::as_str)
    }

    /// Capture group `index` if it matched something.
    #[must_use]
    pub fn optional_capture(&self, index: usize) -> Option<&'a str> {
        Some(self.capture(index)).filter(|c| !c.is_empty())
    }
}

/// Produces the workload fragment for a step.
pub type CodeFn = fn(&StepContext<'_>) -> String;

/// Produces statements for the shared setup context.
///
/// Statements assign fields on `ctx`, which `setup()` returns to the workload.
pub type SetupFn = fn(&StepContext<'_>) -> String;

/// Produces a threshold rule, or `None` when the step has nothing to bound.
pub type ThresholdFn = fn(&StepContext<'_>) -> Option<Threshold>;

/// One entry of the step registry.
pub struct StepDefinition {
    source: &'static str,
    pattern: Regex,
    pub description: &'static str,
    pub imports: &'static [&'static str],
    pub metrics: Vec<MetricDecl>,
    pub code: CodeFn,
    pub setup: Option<SetupFn>,
    pub threshold: Option<ThresholdFn>,
}

impl StepDefinition {
    /// Create a definition. The pattern is anchored at both ends and matched
    /// case-insensitively.
    ///
    /// # Panics
    /// Panics if `source` is not a valid regex. Patterns are static strings
    /// covered by the registry tests.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn new(source: &'static str, description: &'static str, code: CodeFn) -> Self {
        let pattern = Regex::new(&format!("(?i)^(?:{source})$")).expect("valid step pattern");
        Self {
            source,
            pattern,
            description,
            imports: &[],
            metrics: Vec::new(),
            code,
            setup: None,
            threshold: None,
        }
    }

    #[must_use]
    pub fn imports(mut self, imports: &'static [&'static str]) -> Self {
        self.imports = imports;
        self
    }

    #[must_use]
    pub fn metric(mut self, metric: MetricDecl) -> Self {
        self.metrics.push(metric);
        self
    }

    #[must_use]
    pub fn setup(mut self, setup: SetupFn) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn threshold(mut self, threshold: ThresholdFn) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Pattern as written, without the added anchors.
    #[must_use]
    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Match step text, returning positional captures on success.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.pattern.captures(text.trim())?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("source", &self.source)
            .field("description", &self.description)
            .field("imports", &self.imports)
            .field("metrics", &self.metrics)
            .field("has_setup", &self.setup.is_some())
            .field("has_threshold", &self.threshold.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &StepContext<'_>) -> String {
        String::new()
    }

    #[test]
    fn test_captures_positional_with_optional_groups() {
        let def = StepDefinition::new(r#"the user logs in(?: as "([^"]+)")?( quickly)?"#, "", noop);

        assert_eq!(
            def.captures(r#"the user logs in as "bob""#),
            Some(vec!["bob".to_string(), String::new()])
        );
        assert_eq!(
            def.captures("The user logs in quickly"),
            Some(vec![String::new(), " quickly".to_string()])
        );
        assert_eq!(def.captures("the user logs out"), None);
    }

    #[test]
    fn test_pattern_is_anchored() {
        let def = StepDefinition::new("waits", "", noop);
        assert!(def.captures("waits").is_some());
        assert!(def.captures("the user waits forever").is_none());
    }

    #[test]
    fn test_context_capture_access() {
        let captures = vec!["10".to_string(), String::new()];
        let step = Step::new("When", "x");
        let params = Parameters::new();
        let ctx = StepContext::new(&captures, &step, &params);

        assert_eq!(ctx.capture(0), "10");
        assert_eq!(ctx.optional_capture(1), None);
        assert_eq!(ctx.capture(5), "");
    }

    #[test]
    fn test_metric_kind_class_names() {
        assert_eq!(MetricKind::Trend.class_name(), "Trend");
        assert_eq!(MetricKind::Gauge.class_name(), "Gauge");
    }
}

//! In-memory form of a generated script.
//!
//! `ScriptBuilder` folds matched steps into a `ScriptModule`; the renderer
//! turns that module into source text. Keeping the two apart lets tests
//! inspect what a scenario contributes without string matching.

use std::collections::BTreeSet;

use super::imports::{resolve_imports, ImportDecl};
use crate::steps::{MetricDecl, MetricKind, StepContext, StepRegistry, Threshold};
use crate::types::{LoadProfile, Parameters, Step};

/// Provenance printed at the top of the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptHeader {
    pub feature: String,
    pub scenario: String,
    pub example_group: Option<String>,
    pub source_path: String,
    pub parameters: Parameters,
    pub generated_at: String,
}

/// All rules on one metric, in the order they were contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricThresholds {
    pub metric: String,
    pub rules: Vec<String>,
}

/// One entry of the default function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadItem {
    /// A matched step, wrapped in `group(label, ...)`.
    Group { label: String, code: String },
    /// A step no definition matched.
    Unrecognized { label: String },
}

/// Everything needed to render one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptModule {
    pub header: ScriptHeader,
    pub imports: Vec<ImportDecl>,
    pub metrics: Vec<MetricDecl>,
    pub profile: LoadProfile,
    pub thresholds: Vec<MetricThresholds>,
    /// Setup statements in contribution order; empty means no `setup()`.
    pub setup: Vec<String>,
    pub workload: Vec<WorkloadItem>,
    pub base_url: String,
    pub report_dir: String,
    pub report_slug: String,
}

impl ScriptModule {
    /// Labels of unrecognized steps.
    #[must_use]
    pub fn unrecognized_steps(&self) -> Vec<String> {
        self.workload
            .iter()
            .filter_map(|item| match item {
                WorkloadItem::Unrecognized { label } => Some(label.clone()),
                WorkloadItem::Group { .. } => None,
            })
            .collect()
    }
}

/// Accumulates the contributions of each step of a scenario.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    symbols: BTreeSet<String>,
    metrics: Vec<MetricDecl>,
    thresholds: Vec<MetricThresholds>,
    setup: Vec<String>,
    workload: Vec<WorkloadItem>,
}

impl ScriptBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `step` against the registry and record what it contributes.
    ///
    /// Unmatched steps are kept as a comment and contribute nothing else.
    pub fn push_step(&mut self, registry: &StepRegistry, step: &Step, parameters: &Parameters) {
        let Some(found) = registry.find(&step.text) else {
            tracing::warn!(step = %step.label(), "no step definition matches, emitting comment");
            self.workload.push(WorkloadItem::Unrecognized {
                label: step.label(),
            });
            return;
        };

        let definition = found.definition;
        tracing::debug!(step = %step.label(), pattern = definition.source(), "matched step");
        let ctx = StepContext::new(&found.captures, step, parameters);

        self.workload.push(WorkloadItem::Group {
            label: step.label(),
            code: (definition.code)(&ctx),
        });
        self.symbols
            .extend(definition.imports.iter().map(|s| (*s).to_string()));
        for metric in &definition.metrics {
            self.add_metric(metric.clone());
        }
        if let Some(threshold) = definition.threshold.and_then(|f| f(&ctx)) {
            self.add_threshold(threshold);
        }
        if let Some(setup) = definition.setup {
            let fragment = setup(&ctx);
            if !self.setup.contains(&fragment) {
                self.setup.push(fragment);
            }
        }
    }

    /// Last declaration of a name wins; its first position is kept.
    fn add_metric(&mut self, metric: MetricDecl) {
        match self.metrics.iter_mut().find(|m| m.name == metric.name) {
            Some(existing) => *existing = metric,
            None => self.metrics.push(metric),
        }
    }

    fn add_threshold(&mut self, threshold: Threshold) {
        match self
            .thresholds
            .iter_mut()
            .find(|t| t.metric == threshold.metric)
        {
            Some(existing) => {
                if !existing.rules.contains(&threshold.rule) {
                    existing.rules.push(threshold.rule);
                }
            }
            None => self.thresholds.push(MetricThresholds {
                metric: threshold.metric,
                rules: vec![threshold.rule],
            }),
        }
    }

    /// Finish the module.
    #[must_use]
    pub fn finish(
        mut self,
        header: ScriptHeader,
        profile: LoadProfile,
        layout: &ScriptLayout<'_>,
    ) -> ScriptModule {
        if self
            .workload
            .iter()
            .any(|item| matches!(item, WorkloadItem::Group { .. }))
        {
            self.symbols.insert("group".to_string());
        }
        let kinds: BTreeSet<MetricKind> = self.metrics.iter().map(|m| m.kind).collect();
        let imports = resolve_imports(&self.symbols, &kinds, layout.lib_dir);

        ScriptModule {
            header,
            imports: imports.declarations,
            metrics: self.metrics,
            profile,
            thresholds: self.thresholds,
            setup: self.setup,
            workload: self.workload,
            base_url: layout.base_url.to_string(),
            report_dir: layout.report_dir.to_string(),
            report_slug: layout.report_slug.to_string(),
        }
    }
}

/// Paths and defaults that shape a script but do not come from steps.
#[derive(Debug, Clone, Copy)]
pub struct ScriptLayout<'a> {
    pub lib_dir: &'a str,
    pub report_dir: &'a str,
    pub report_slug: &'a str,
    pub base_url: &'a str,
}

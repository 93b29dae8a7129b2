//! Render a `ScriptModule` as k6 JavaScript.

use super::imports::ImportDecl;
use super::script::{ScriptModule, WorkloadItem};
use crate::js::{comment_text, indent, string_literal};
use crate::steps::{MetricDecl, MetricKind};
use crate::types::LoadProfile;

const RULE: &str = "// ------------------------------------------------------------";

/// Render the full script text.
///
/// Output depends only on the module, so the same module always renders
/// to the same bytes.
#[must_use]
pub fn render_script(module: &ScriptModule) -> String {
    let sections = [
        render_header(module),
        render_imports(&module.imports),
        format!(
            "const BASE_URL = __ENV.BASE_URL || {};",
            string_literal(&module.base_url)
        ),
        render_metrics(&module.metrics),
        render_options(module),
        render_setup(&module.setup),
        render_workload(&module.workload),
        render_teardown(&module.header.scenario),
        render_summary(module),
    ];

    let mut out = sections
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push('\n');
    out
}

fn render_header(module: &ScriptModule) -> String {
    let header = &module.header;
    let mut lines = vec![
        RULE.to_string(),
        "// Generated by bdd-k6. Do not edit by hand.".to_string(),
        "//".to_string(),
        format!("// Feature:   {}", comment_text(&header.feature)),
        format!("// Scenario:  {}", comment_text(&header.scenario)),
    ];
    if let Some(group) = &header.example_group {
        lines.push(format!("// Examples:  {}", comment_text(group)));
    }
    lines.push(format!("// Source:    {}", comment_text(&header.source_path)));
    if !header.parameters.is_empty() {
        lines.push("// Parameters:".to_string());
        for (key, value) in header.parameters.iter() {
            lines.push(format!(
                "//   {} = {}",
                comment_text(key),
                comment_text(value)
            ));
        }
    }
    lines.push(format!("// Generated: {}", header.generated_at));
    lines.push(RULE.to_string());
    lines.join("\n")
}

fn render_import(decl: &ImportDecl) -> String {
    let mut parts = Vec::new();
    if let Some(default_export) = &decl.default_export {
        parts.push(default_export.clone());
    }
    if !decl.named.is_empty() {
        parts.push(format!("{{ {} }}", decl.named.join(", ")));
    }
    format!("import {} from {};", parts.join(", "), string_literal(&decl.from))
}

fn render_imports(imports: &[ImportDecl]) -> String {
    imports
        .iter()
        .map(render_import)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_metric(metric: &MetricDecl) -> String {
    let time_flag = if metric.is_time && metric.kind == MetricKind::Trend {
        ", true"
    } else {
        ""
    };
    format!(
        "const {} = new {}({}{time_flag});",
        metric.name,
        metric.kind.class_name(),
        string_literal(metric.external_name)
    )
}

fn render_metrics(metrics: &[MetricDecl]) -> String {
    metrics
        .iter()
        .map(render_metric)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_profile(profile: &LoadProfile) -> Vec<String> {
    match profile {
        LoadProfile::Fixed {
            virtual_users,
            iterations,
        } => vec![
            "executor: 'per-vu-iterations',".to_string(),
            format!("vus: {virtual_users},"),
            format!("iterations: {iterations},"),
        ],
        LoadProfile::Ramping { start_vus, stages } => {
            let mut lines = vec![
                "executor: 'ramping-vus',".to_string(),
                format!("startVUs: {start_vus},"),
                "stages: [".to_string(),
            ];
            lines.extend(stages.iter().map(|stage| {
                format!(
                    "  {{ duration: '{}s', target: {} }},",
                    stage.duration_secs, stage.target
                )
            }));
            lines.push("],".to_string());
            lines
        }
    }
}

fn render_options(module: &ScriptModule) -> String {
    let mut lines = vec![
        "export const options = {".to_string(),
        "  scenarios: {".to_string(),
        "    default: {".to_string(),
    ];
    lines.extend(
        render_profile(&module.profile)
            .into_iter()
            .map(|line| format!("      {line}")),
    );
    lines.push("    },".to_string());
    lines.push("  },".to_string());

    if !module.thresholds.is_empty() {
        lines.push("  thresholds: {".to_string());
        for threshold in &module.thresholds {
            let rules = threshold
                .rules
                .iter()
                .map(|r| string_literal(r))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                "    {}: [{rules}],",
                string_literal(&threshold.metric)
            ));
        }
        lines.push("  },".to_string());
    }

    lines.push("};".to_string());
    lines.join("\n")
}

fn render_setup(setup: &[String]) -> String {
    if setup.is_empty() {
        return String::new();
    }
    let mut lines = vec![
        "export function setup() {".to_string(),
        "  const ctx = {};".to_string(),
    ];
    // One block scope per fragment.
    for fragment in setup {
        lines.push("  {".to_string());
        lines.push(indent(fragment, 4));
        lines.push("  }".to_string());
    }
    lines.push("  return ctx;".to_string());
    lines.push("}".to_string());
    lines.join("\n")
}

fn render_workload(workload: &[WorkloadItem]) -> String {
    let mut blocks = vec!["  let res;".to_string()];
    for item in workload {
        blocks.push(match item {
            WorkloadItem::Group { label, code } => format!(
                "  group({}, () => {{\n{}\n  }});",
                string_literal(label),
                indent(code, 4)
            ),
            WorkloadItem::Unrecognized { label } => {
                format!("  // Unrecognized step: {}", comment_text(label))
            }
        });
    }
    format!(
        "export default function (data) {{\n{}\n}}",
        blocks.join("\n\n")
    )
}

fn render_teardown(scenario: &str) -> String {
    format!(
        "export function teardown(data) {{\n  console.log({});\n}}",
        string_literal(&format!("Scenario completed: {scenario}"))
    )
}

fn render_summary(module: &ScriptModule) -> String {
    let base = format!(
        "{}/{}-",
        module.report_dir.trim_end_matches('/'),
        module.report_slug
    );
    [
        "export function handleSummary(data) {".to_string(),
        "  const stamp = new Date().toISOString().replace(/[:.]/g, '-');".to_string(),
        format!("  const base = {} + stamp;", string_literal(&base)),
        "  return {".to_string(),
        format!(
            "    [`${{base}}.html`]: htmlReport(data, {{ title: {} }}),",
            string_literal(&module.header.scenario)
        ),
        "    [`${base}.json`]: JSON.stringify(data, null, 2),".to_string(),
        "    stdout: textSummary(data, { indent: ' ', enableColors: true }),".to_string(),
        "  };".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

//! End-of-run reporting.

use std::path::PathBuf;

use console::style;

use super::engine::ExecutionOutcome;
use crate::types::GeneratedScript;

/// The result of executing one generated script.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub script_path: PathBuf,
    pub outcome: ExecutionOutcome,
}

/// One step that had no definition, with the scenario it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedStep {
    pub scenario_name: String,
    pub step: String,
}

/// Collect unrecognized steps across scripts, in generation order.
#[must_use]
pub fn unrecognized_steps(scripts: &[GeneratedScript]) -> Vec<UnrecognizedStep> {
    scripts
        .iter()
        .flat_map(|script| {
            script.unrecognized_steps.iter().map(|step| UnrecognizedStep {
                scenario_name: script.scenario_name.clone(),
                step: step.clone(),
            })
        })
        .collect()
}

/// Aggregate results of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<ScenarioResult>,
    pub unrecognized: Vec<UnrecognizedStep>,
}

impl RunSummary {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.success).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// Process exit code: 0 only when every scenario passed.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.failed() > 0)
    }
}

/// One unstyled summary row: status, duration, exit status, name.
#[must_use]
pub fn format_row(result: &ScenarioResult) -> (bool, String) {
    let outcome = &result.outcome;
    let row = format!(
        "{:>7.1}s  {:<8}  {}",
        outcome.duration.as_secs_f64(),
        outcome.status_label(),
        result.scenario_name
    );
    (outcome.success, row)
}

/// Print captured engine output for a failed scenario.
pub fn print_failure_output(result: &ScenarioResult) {
    println!();
    println!(
        "{} {} ({})",
        style("FAILED").red().bold(),
        result.scenario_name,
        result.script_path.display()
    );
    let outcome = &result.outcome;
    if !outcome.stdout.trim().is_empty() {
        println!("{}", style("--- stdout ---").dim());
        println!("{}", outcome.stdout.trim_end());
    }
    if !outcome.stderr.trim().is_empty() {
        println!("{}", style("--- stderr ---").dim());
        println!("{}", outcome.stderr.trim_end());
    }
}

/// Print the list of steps that need definitions.
pub fn print_unrecognized(unrecognized: &[UnrecognizedStep]) {
    if unrecognized.is_empty() {
        return;
    }
    println!();
    println!(
        "{} {}",
        style("Unrecognized steps:").yellow().bold(),
        unrecognized.len()
    );
    for entry in unrecognized {
        println!("  {}  {}", style(&entry.scenario_name).dim(), entry.step);
    }
}

/// Print the PASS/FAIL table and totals.
pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", style("Summary").bold());
    for result in &summary.results {
        let (passed, row) = format_row(result);
        let status = if passed {
            style("PASS").green().bold()
        } else {
            style("FAIL").red().bold()
        };
        println!("  {status}  {row}");
    }

    print_unrecognized(&summary.unrecognized);

    println!();
    println!(
        "{} passed, {} failed, {} total",
        style(summary.passed()).green(),
        style(summary.failed()).red(),
        summary.results.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LoadProfile, Parameters};
    use std::time::Duration;

    fn result(name: &str, exit_code: Option<i32>) -> ScenarioResult {
        ScenarioResult {
            scenario_name: name.to_string(),
            script_path: PathBuf::from(format!("generated/{name}.js")),
            outcome: ExecutionOutcome::finished(
                exit_code,
                String::new(),
                String::new(),
                Duration::from_millis(1500),
            ),
        }
    }

    #[test]
    fn test_exit_code_reflects_failures() {
        let all_pass = RunSummary {
            results: vec![result("a", Some(0)), result("b", Some(0))],
            unrecognized: Vec::new(),
        };
        assert_eq!(all_pass.exit_code(), 0);

        let one_fail = RunSummary {
            results: vec![result("a", Some(0)), result("b", Some(99))],
            unrecognized: Vec::new(),
        };
        assert_eq!(one_fail.passed(), 1);
        assert_eq!(one_fail.failed(), 1);
        assert_eq!(one_fail.exit_code(), 1);
    }

    #[test]
    fn test_format_row() {
        let (passed, row) = format_row(&result("smoke", Some(99)));
        assert!(!passed);
        assert_eq!(row, "    1.5s  exit 99   smoke");
    }

    #[test]
    fn test_unrecognized_steps_collects_in_order() {
        let script = |name: &str, steps: &[&str]| GeneratedScript {
            scenario_name: name.to_string(),
            source_text: String::new(),
            output_path: PathBuf::from("x.js"),
            load_profile: LoadProfile::Fixed {
                virtual_users: 1,
                iterations: 1,
            },
            parameters: Parameters::new(),
            unrecognized_steps: steps.iter().map(|s| (*s).to_string()).collect(),
        };
        let collected = unrecognized_steps(&[
            script("first", &["When a"]),
            script("second", &[]),
            script("third", &["Then b", "And c"]),
        ]);
        let names: Vec<&str> = collected.iter().map(|u| u.scenario_name.as_str()).collect();
        assert_eq!(names, vec!["first", "third", "third"]);
        assert_eq!(collected[2].step, "And c");
    }
}

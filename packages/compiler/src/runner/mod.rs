//! Orchestration: parse, generate, execute, summarize.
//!
//! Everything runs sequentially. Two load tests against the same target at
//! once would skew each other's numbers, so scripts execute one at a time.

mod engine;
mod k6;
mod summary;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

pub use engine::{ExecutionOutcome, LoadEngine};
pub use k6::K6Engine;
pub use summary::{
    format_row, print_summary, unrecognized_steps, RunSummary, ScenarioResult, UnrecognizedStep,
};

use crate::config::{merge_env, RunnerConfig, DEFAULT_OUTPUT_DIR};
use crate::error::{CompilerError, Result};
use crate::generator::{GeneratorOptions, ScriptGenerator};
use crate::parser::{filter_by_tags, parse_target};
use crate::steps::StepRegistry;
use crate::types::{Feature, GeneratedScript};

/// What a run should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Print the parsed features as JSON and stop.
    pub parse_only: bool,
    /// Write scripts but do not execute them.
    pub generate_only: bool,
    /// Environment entries that win over the defaults.
    pub env_overrides: BTreeMap<String, String>,
    pub output_dir: PathBuf,
    /// Keep only scenarios with one of these tags; empty keeps all.
    pub tags: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            parse_only: false,
            generate_only: false,
            env_overrides: BTreeMap::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            tags: Vec::new(),
        }
    }
}

/// Drives a feature target through the pipeline.
pub struct Runner<E> {
    registry: StepRegistry,
    engine: E,
    config: RunnerConfig,
}

impl<E: LoadEngine> Runner<E> {
    #[must_use]
    pub fn new(registry: StepRegistry, engine: E, config: RunnerConfig) -> Self {
        Self {
            registry,
            engine,
            config,
        }
    }

    /// Run the pipeline and return the process exit code.
    ///
    /// Parse failures, an empty scenario list and unwritable output abort
    /// with `Err`. Failed executions do not: every script runs, and the
    /// exit code is 1 if any of them failed.
    pub async fn run(&self, target: &Path, options: &RunOptions) -> Result<i32> {
        let features = self.parse(target, options)?;

        if options.parse_only {
            println!("{}", serde_json::to_string_pretty(&features)?);
            return Ok(0);
        }

        let scripts = self.generate(&features, options)?;

        if options.generate_only {
            print_generated(&scripts, &options.output_dir);
            summary::print_unrecognized(&unrecognized_steps(&scripts));
            return Ok(0);
        }

        let summary = self.execute(&scripts, options).await?;
        print_summary(&summary);
        Ok(summary.exit_code())
    }

    /// Parse the target and apply the tag filter.
    pub fn parse(&self, target: &Path, options: &RunOptions) -> Result<Vec<Feature>> {
        let mut features = parse_target(target)?;
        filter_by_tags(&mut features, &options.tags);
        tracing::debug!(
            features = features.len(),
            scenarios = features.iter().map(|f| f.scenarios.len()).sum::<usize>(),
            "parsed target"
        );
        Ok(features)
    }

    /// Write one script per resolved scenario, in feature then scenario order.
    ///
    /// # Errors
    /// Returns `NoScenarios` when nothing was generated.
    pub fn generate(
        &self,
        features: &[Feature],
        options: &RunOptions,
    ) -> Result<Vec<GeneratedScript>> {
        let generator = ScriptGenerator::new(
            &self.registry,
            GeneratorOptions {
                base_url: self.config.base_url.clone(),
                ..GeneratorOptions::default()
            }
            .with_output_dir(&options.output_dir),
        );

        let mut written: HashSet<PathBuf> = HashSet::new();
        let mut scripts = Vec::new();
        for feature in features {
            for scenario in &feature.scenarios {
                let script = generator.generate(feature, scenario)?;
                if !written.insert(script.output_path.clone()) {
                    tracing::warn!(
                        path = %script.output_path.display(),
                        scenario = %script.scenario_name,
                        "scenario name collides with an earlier one, script overwritten"
                    );
                }
                scripts.push(script);
            }
        }

        if scripts.is_empty() {
            return Err(CompilerError::NoScenarios);
        }
        Ok(scripts)
    }

    /// Execute every script in order, continuing past failures.
    pub async fn execute(
        &self,
        scripts: &[GeneratedScript],
        options: &RunOptions,
    ) -> Result<RunSummary> {
        let env = merge_env(&self.config.default_env(), &options.env_overrides);
        let mut results = Vec::with_capacity(scripts.len());

        for (index, script) in scripts.iter().enumerate() {
            let pb = ProgressBar::new_spinner();
            #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .expect("valid template"),
            );
            pb.set_message(format!(
                "[{}/{}] {} {}",
                index + 1,
                scripts.len(),
                self.engine.name(),
                script.scenario_name
            ));
            pb.enable_steady_tick(Duration::from_millis(100));

            let outcome = match self.engine.execute(&script.output_path, &env).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    pb.finish_and_clear();
                    if !results.is_empty() {
                        print_summary(&RunSummary {
                            results,
                            unrecognized: unrecognized_steps(scripts),
                        });
                    }
                    return Err(e);
                }
            };
            pb.finish_and_clear();

            let result = ScenarioResult {
                scenario_name: script.scenario_name.clone(),
                script_path: script.output_path.clone(),
                outcome,
            };
            if result.outcome.success {
                println!("{} {}", style("PASS").green().bold(), result.scenario_name);
            } else {
                summary::print_failure_output(&result);
            }
            results.push(result);
        }

        Ok(RunSummary {
            results,
            unrecognized: unrecognized_steps(scripts),
        })
    }
}

fn print_generated(scripts: &[GeneratedScript], output_dir: &Path) {
    println!(
        "{} {} scripts in {}",
        style("Generated").green().bold(),
        scripts.len(),
        output_dir.display()
    );
    for script in scripts {
        println!("  {}", script.output_path.display());
    }
}

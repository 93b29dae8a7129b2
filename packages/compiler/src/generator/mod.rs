//! Script generation.
//!
//! For each resolved scenario the generator matches every step against the
//! registry, folds the contributions into a `ScriptModule`, renders it and
//! writes it to `<output_dir>/<slug>.js`.

mod imports;
mod profile;
mod render;
mod script;
mod writer;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

pub use imports::{resolve_imports, ImportDecl, ResolvedImports};
pub use profile::{derive_load_profile, parse_duration_secs};
pub use render::render_script;
pub use script::{
    MetricThresholds, ScriptBuilder, ScriptHeader, ScriptLayout, ScriptModule, WorkloadItem,
};
pub use writer::{save_script, script_path, script_stem};

use crate::config::{DEFAULT_BASE_URL, DEFAULT_LIB_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_REPORT_DIR};
use crate::error::Result;
use crate::parser::substitute_step;
use crate::steps::StepRegistry;
use crate::types::{Feature, GeneratedScript, ResolvedScenario};

/// Where scripts go and what they reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub output_dir: PathBuf,
    /// Request library location as seen from the generated script.
    pub lib_dir: String,
    /// Report directory as seen from the engine's working directory.
    pub report_dir: String,
    /// Fallback for `__ENV.BASE_URL`.
    pub base_url: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            lib_dir: DEFAULT_LIB_DIR.to_string(),
            report_dir: DEFAULT_REPORT_DIR.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GeneratorOptions {
    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

/// Turns resolved scenarios into load scripts.
#[derive(Debug)]
pub struct ScriptGenerator<'r> {
    registry: &'r StepRegistry,
    options: GeneratorOptions,
}

impl<'r> ScriptGenerator<'r> {
    #[must_use]
    pub fn new(registry: &'r StepRegistry, options: GeneratorOptions) -> Self {
        Self { registry, options }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.options.output_dir
    }

    /// Build the script module for one scenario.
    ///
    /// Background steps run first, with the scenario's parameters applied.
    #[must_use]
    pub fn build_module(
        &self,
        feature: &Feature,
        scenario: &ResolvedScenario,
        generated_at: DateTime<Utc>,
    ) -> ScriptModule {
        let mut builder = ScriptBuilder::new();
        for step in feature.background_steps() {
            let step = substitute_step(step, &scenario.parameters);
            builder.push_step(self.registry, &step, &scenario.parameters);
        }
        for step in &scenario.steps {
            builder.push_step(self.registry, step, &scenario.parameters);
        }

        let header = ScriptHeader {
            feature: feature.name.clone(),
            scenario: scenario.name.clone(),
            example_group: scenario.example_group_name.clone(),
            source_path: feature.source_path.display().to_string(),
            parameters: scenario.parameters.clone(),
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        };
        let report_slug = script_stem(&scenario.name);
        let layout = ScriptLayout {
            lib_dir: &self.options.lib_dir,
            report_dir: &self.options.report_dir,
            report_slug: &report_slug,
            base_url: &self.options.base_url,
        };

        builder.finish(header, derive_load_profile(&scenario.parameters), &layout)
    }

    /// Render a scenario without touching the filesystem.
    #[must_use]
    pub fn render(
        &self,
        feature: &Feature,
        scenario: &ResolvedScenario,
        generated_at: DateTime<Utc>,
    ) -> GeneratedScript {
        let module = self.build_module(feature, scenario, generated_at);
        GeneratedScript {
            scenario_name: scenario.name.clone(),
            source_text: render_script(&module),
            output_path: script_path(&self.options.output_dir, &scenario.name),
            load_profile: module.profile.clone(),
            parameters: scenario.parameters.clone(),
            unrecognized_steps: module.unrecognized_steps(),
        }
    }

    /// Render a scenario and write it to the output directory.
    ///
    /// # Errors
    /// Returns `GenerationIo` if the script cannot be written.
    pub fn generate(
        &self,
        feature: &Feature,
        scenario: &ResolvedScenario,
    ) -> Result<GeneratedScript> {
        let script = self.render(feature, scenario, Utc::now());
        save_script(&script.output_path, &script.source_text)?;
        tracing::info!(
            scenario = %script.scenario_name,
            path = %script.output_path.display(),
            unrecognized = script.unrecognized_steps.len(),
            "generated script"
        );
        Ok(script)
    }
}

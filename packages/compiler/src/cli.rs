//! Command-line interface for the compiler.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use console::style;

use crate::config::{validate_env_pair, RunnerConfig, DEFAULT_OUTPUT_DIR};
use crate::error::Result;
use crate::runner::{K6Engine, RunOptions, Runner};
use crate::steps::{create_step_registry, StepRegistry};

/// bdd-k6 - Compile Gherkin performance scenarios into k6 load-test scripts.
#[derive(Parser, Debug)]
#[command(name = "bdd-k6")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Feature file or directory of .feature files
    #[arg(required_unless_present = "list_steps")]
    pub target: Option<PathBuf>,

    /// Print the parsed scenarios as JSON and exit
    #[arg(long, conflicts_with = "generate_only")]
    pub parse_only: bool,

    /// Write scripts without executing them
    #[arg(long)]
    pub generate_only: bool,

    /// Environment variable for k6, repeatable (e.g., BASE_URL=http://localhost:3000)
    #[arg(short, long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Directory for generated scripts
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// List the registered step definitions and exit
    #[arg(long)]
    pub list_steps: bool,

    /// Only keep scenarios with this tag, repeatable (e.g., smoke or @smoke)
    #[arg(short, long = "tags", value_name = "TAG")]
    pub tags: Vec<String>,

    /// k6 binary to run (default: k6, or $K6_BINARY)
    #[arg(long, value_name = "PATH")]
    pub k6_binary: Option<PathBuf>,

    /// Per-scenario execution ceiling in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Validate `--env` pairs into a map. Later pairs win.
    ///
    /// # Errors
    /// Returns `InvalidEnvPair` for the first malformed pair.
    pub fn env_overrides(&self) -> Result<BTreeMap<String, String>> {
        self.env.iter().map(|pair| validate_env_pair(pair)).collect()
    }

    /// Runner settings from the environment, with command-line overrides.
    #[must_use]
    pub fn runner_config(&self) -> RunnerConfig {
        let mut config = RunnerConfig::from_env();
        if let Some(binary) = &self.k6_binary {
            config = config.with_k6_binary(binary);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

/// Run the CLI and return the process exit code.
pub async fn run() -> Result<i32> {
    execute(Cli::parse()).await
}

/// Execute a parsed command line.
pub async fn execute(cli: Cli) -> Result<i32> {
    let registry = create_step_registry();

    if cli.list_steps {
        list_steps(&registry);
        return Ok(0);
    }

    let env_overrides = cli.env_overrides()?;
    let config = cli.runner_config();
    let options = RunOptions {
        parse_only: cli.parse_only,
        generate_only: cli.generate_only,
        env_overrides,
        output_dir: cli.output_dir.clone(),
        tags: cli.tags.clone(),
    };

    // `required_unless_present` guarantees a target here.
    let Some(target) = cli.target else {
        return Ok(0);
    };

    let engine = K6Engine::from_config(&config);
    Runner::new(registry, engine, config)
        .run(&target, &options)
        .await
}

fn list_steps(registry: &StepRegistry) {
    println!(
        "{} {}",
        style("Step definitions:").bold(),
        registry.len()
    );
    for (index, info) in registry.list_definitions().iter().enumerate() {
        println!();
        println!("{:>3}. {}", index + 1, style(info.pattern).cyan());
        println!("     {}", info.description);

        let mut flags = Vec::new();
        if info.has_setup {
            flags.push("setup");
        }
        if info.has_threshold {
            flags.push("threshold");
        }
        if !flags.is_empty() {
            println!("     {} {}", style("provides:").dim(), flags.join(", "));
        }
        if !info.imports.is_empty() {
            println!("     {} {}", style("imports:").dim(), info.imports.join(", "));
        }
        if !info.metrics.is_empty() {
            println!("     {} {}", style("metrics:").dim(), info.metrics.join(", "));
        }
    }
}

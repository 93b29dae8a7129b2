//! bdd-k6 - Compile Gherkin performance scenarios into k6 load-test scripts.
//!
//! Feature files describe load tests in natural language. This crate parses
//! them, expands scenario templates into one concrete scenario per example
//! row, matches every step against a registry of step definitions, and
//! renders one self-contained k6 script per scenario. The runner can then
//! execute those scripts and summarize the results.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//!
//! use bdd_k6_compiler::parser::parse_feature;
//!
//! let feature = parse_feature(
//!     "Feature: Catalog\n  Scenario: Smoke\n    Given the API is available\n",
//!     Path::new("catalog.feature"),
//! )
//! .unwrap();
//! assert_eq!(feature.scenarios.len(), 1);
//! ```
//!
//! # Architecture
//!
//! - [`parser`]: Gherkin parsing, template expansion, file discovery
//! - [`steps`]: Step definitions and the ordered registry
//! - [`generator`]: Load profile derivation, script rendering and output
//! - [`runner`]: Parse, generate, execute and summarize
//! - [`types`]: Core data types (Feature, ResolvedScenario, LoadProfile, etc.)
//! - [`config`]: Constants, defaults and environment handling
//! - [`error`]: Error types and Result alias
//! - [`js`]: JavaScript quoting helpers
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod js;
pub mod parser;
pub mod runner;
pub mod steps;
pub mod types;

// Re-export commonly used items
pub use error::{CompilerError, Result};
pub use generator::{GeneratorOptions, ScriptGenerator};
pub use parser::{parse_feature, parse_feature_file, parse_target};
pub use runner::{K6Engine, LoadEngine, RunOptions, Runner};
pub use steps::{create_step_registry, StepRegistry};
pub use types::{Feature, GeneratedScript, LoadProfile, ResolvedScenario, Step};

//! Step definition registry.
//!
//! A flat, ordered list of (pattern, generator) records. Lookup walks the
//! list in declaration order and returns the first pattern that matches
//! the resolved step text.

mod config;
pub mod definition;
pub mod definitions;
mod registry;

pub use config::create_step_registry;
pub use definition::{
    CodeFn, MetricDecl, MetricKind, SetupFn, StepContext, StepDefinition, Threshold, ThresholdFn,
};
pub use registry::{DefinitionInfo, StepMatch, StepRegistry};

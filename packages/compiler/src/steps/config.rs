//! Registry configuration for the built-in step vocabulary.

use super::definitions::{accounts, assertions, catalog, orders, pacing, session};
use super::registry::StepRegistry;

/// Create a step registry with every built-in definition.
///
/// Order matters: within each group narrower phrasings come first, and
/// outcome steps are registered last.
#[must_use]
pub fn create_step_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();

    // Setup and readiness
    registry.register_all(session::definitions());

    // Requests
    registry.register_all(catalog::definitions());
    registry.register_all(accounts::definitions());
    registry.register_all(orders::definitions());

    // Think time
    registry.register_all(pacing::definitions());

    // Checks and thresholds
    registry.register_all(assertions::definitions());

    registry
}

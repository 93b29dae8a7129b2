//! Built-in step definitions, grouped by API area.

pub mod accounts;
pub mod assertions;
pub mod catalog;
pub mod orders;
pub mod pacing;
pub mod session;

use crate::steps::definition::{StepContext, Threshold};

/// p95 threshold on `metric` from the scenario's `threshold` parameter.
///
/// Falls back to `default` when the parameter is absent or not a number.
pub(crate) fn parameter_threshold(
    ctx: &StepContext<'_>,
    metric: &str,
    default: Option<&str>,
) -> Option<Threshold> {
    let value = ctx
        .parameters
        .get("threshold")
        .map(|v| v.trim().trim_end_matches("ms").trim())
        .filter(|v| !v.is_empty() && v.parse::<f64>().is_ok())
        .or(default)?;
    Some(Threshold::new(metric, format!("p(95)<{value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Parameters, Step};

    #[test]
    fn test_parameter_threshold_strips_unit() {
        let step = Step::new("When", "x");
        let params: Parameters = [("threshold", "750ms")].into_iter().collect();
        let ctx = StepContext::new(&[], &step, &params);
        assert_eq!(
            parameter_threshold(&ctx, "m", None),
            Some(Threshold::new("m", "p(95)<750"))
        );
    }

    #[test]
    fn test_parameter_threshold_ignores_non_numeric() {
        let step = Step::new("When", "x");
        let params: Parameters = [("threshold", "fast")].into_iter().collect();
        let ctx = StepContext::new(&[], &step, &params);
        assert_eq!(parameter_threshold(&ctx, "m", None), None);
        assert_eq!(
            parameter_threshold(&ctx, "m", Some("500")).map(|t| t.rule),
            Some("p(95)<500".to_string())
        );
    }
}

//! Outcome steps: response checks and threshold rules.
//!
//! Threshold steps add no request code; their fragment is a comment so the
//! rule stays visible next to the step that declared it.

use crate::js::{format_number, number_or};
use crate::steps::definition::{MetricDecl, StepContext, StepDefinition, Threshold, ThresholdFn};

fn percent_as_ratio(text: &str) -> String {
    let percent: f64 = number_or(text, 0.0).parse().unwrap_or(0.0);
    format_number(percent / 100.0)
}

fn threshold_comment(ctx: &StepContext<'_>, threshold: ThresholdFn) -> String {
    match threshold(ctx) {
        Some(t) => format!("// threshold: {} {}", t.metric, t.rule),
        None => "// threshold: none".to_string(),
    }
}

fn search_percentile(ctx: &StepContext<'_>) -> Option<Threshold> {
    Some(Threshold::new(
        "product_search_duration",
        format!("p({})<{}", number_or(ctx.capture(0), 95.0), number_or(ctx.capture(1), 500.0)),
    ))
}

fn search_p95(ctx: &StepContext<'_>) -> Option<Threshold> {
    Some(Threshold::new(
        "product_search_duration",
        format!("p(95)<{}", number_or(ctx.capture(0), 500.0)),
    ))
}

fn global_percentile(ctx: &StepContext<'_>) -> Option<Threshold> {
    Some(Threshold::new(
        "http_req_duration",
        format!("p({})<{}", number_or(ctx.capture(0), 95.0), number_or(ctx.capture(1), 500.0)),
    ))
}

fn global_p95(ctx: &StepContext<'_>) -> Option<Threshold> {
    Some(Threshold::new(
        "http_req_duration",
        format!("p(95)<{}", number_or(ctx.capture(0), 500.0)),
    ))
}

fn error_rate(ctx: &StepContext<'_>) -> Option<Threshold> {
    Some(Threshold::new(
        "http_req_failed",
        format!("rate<{}", percent_as_ratio(ctx.capture(0))),
    ))
}

fn check_rate(ctx: &StepContext<'_>) -> Option<Threshold> {
    Some(Threshold::new(
        "checks",
        format!("rate>{}", percent_as_ratio(ctx.capture(0))),
    ))
}

fn min_orders(ctx: &StepContext<'_>) -> Option<Threshold> {
    Some(Threshold::new(
        "orders_created",
        format!("count>={}", number_or(ctx.capture(0), 1.0)),
    ))
}

fn min_throughput(ctx: &StepContext<'_>) -> Option<Threshold> {
    Some(Threshold::new(
        "http_reqs",
        format!("rate>={}", number_or(ctx.capture(0), 1.0)),
    ))
}

fn status_check(ctx: &StepContext<'_>) -> String {
    let status = number_or(ctx.capture(0), 200.0);
    format!("check(res, {{ 'status is {status}': (r) => Boolean(r) && r.status === {status} }});")
}

pub fn definitions() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(
            r"el sistema debe responder con (?:código|estado|status) (\d{3})",
            "Check the status of the last response",
            status_check,
        )
        .imports(&["check"]),
        StepDefinition::new(
            r"(?:the )?response status should be (\d{3})",
            "Check the status of the last response",
            status_check,
        )
        .imports(&["check"]),
        StepDefinition::new(
            r"el percentil (\d+) del tiempo de respuesta de búsqueda debe ser menor (?:a|de) (\d+) ?ms",
            "Bound a search latency percentile",
            |ctx| threshold_comment(ctx, search_percentile),
        )
        .metric(MetricDecl::trend("productSearchDuration", "product_search_duration"))
        .threshold(search_percentile),
        StepDefinition::new(
            r"el tiempo de respuesta de búsqueda debe ser menor (?:a|de) (\d+) ?ms",
            "Bound p95 search latency",
            |ctx| threshold_comment(ctx, search_p95),
        )
        .metric(MetricDecl::trend("productSearchDuration", "product_search_duration"))
        .threshold(search_p95),
        StepDefinition::new(
            r"el percentil (\d+) del tiempo de respuesta debe ser menor (?:a|de) (\d+) ?ms",
            "Bound a global request latency percentile",
            |ctx| threshold_comment(ctx, global_percentile),
        )
        .threshold(global_percentile),
        StepDefinition::new(
            r"el tiempo de respuesta debe ser menor (?:a|de) (\d+) ?ms",
            "Bound p95 global request latency",
            |ctx| threshold_comment(ctx, global_p95),
        )
        .threshold(global_p95),
        StepDefinition::new(
            r"(?:the )?p(\d+) response time should be (?:less|lower) than (\d+) ?ms",
            "Bound a global request latency percentile",
            |ctx| threshold_comment(ctx, global_percentile),
        )
        .threshold(global_percentile),
        StepDefinition::new(
            r"(?:the )?response time should be (?:less|lower) than (\d+) ?ms",
            "Bound p95 global request latency",
            |ctx| threshold_comment(ctx, global_p95),
        )
        .threshold(global_p95),
        StepDefinition::new(
            r"la tasa de errores debe ser (?:menor|inferior) (?:al|a|del) (\d+(?:[.,]\d+)?) ?%",
            "Bound the failed request ratio",
            |ctx| threshold_comment(ctx, error_rate),
        )
        .threshold(error_rate),
        StepDefinition::new(
            r"(?:the )?error rate should be (?:less|lower) than (\d+(?:\.\d+)?) ?%",
            "Bound the failed request ratio",
            |ctx| threshold_comment(ctx, error_rate),
        )
        .threshold(error_rate),
        StepDefinition::new(
            r"la tasa de éxito(?: de las verificaciones)? debe ser (?:mayor|superior) (?:al|a|del) (\d+(?:[.,]\d+)?) ?%",
            "Require a minimum check pass ratio",
            |ctx| threshold_comment(ctx, check_rate),
        )
        .threshold(check_rate),
        StepDefinition::new(
            r"se deben crear al menos (\d+) pedidos?",
            "Require a minimum number of created orders",
            |ctx| threshold_comment(ctx, min_orders),
        )
        .metric(MetricDecl::counter("ordersCreated", "orders_created"))
        .threshold(min_orders),
        StepDefinition::new(
            r"el sistema debe procesar al menos (\d+) peticiones por segundo",
            "Require a minimum request throughput",
            |ctx| threshold_comment(ctx, min_throughput),
        )
        .threshold(min_throughput),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Parameters, Step};

    fn run(threshold: fn(&StepContext<'_>) -> Option<Threshold>, captures: &[&str]) -> Threshold {
        let captures: Vec<String> = captures.iter().map(|c| (*c).to_string()).collect();
        let step = Step::new("Then", "x");
        let params = Parameters::new();
        threshold(&StepContext::new(&captures, &step, &params)).unwrap()
    }

    #[test]
    fn test_percentile_rules() {
        assert_eq!(run(search_percentile, &["99", "1200"]).rule, "p(99)<1200");
        assert_eq!(run(global_p95, &["300"]).rule, "p(95)<300");
        assert_eq!(run(global_p95, &["300"]).metric, "http_req_duration");
    }

    #[test]
    fn test_rate_rules() {
        assert_eq!(run(error_rate, &["1"]).rule, "rate<0.01");
        assert_eq!(run(error_rate, &["0,5"]).rule, "rate<0.005");
        assert_eq!(run(check_rate, &["95"]).rule, "rate>0.95");
    }

    #[test]
    fn test_count_rule() {
        let t = run(min_orders, &["50"]);
        assert_eq!(t.metric, "orders_created");
        assert_eq!(t.rule, "count>=50");
    }

    #[test]
    fn test_status_check_code() {
        let captures = vec!["201".to_string()];
        let step = Step::new("Then", "x");
        let params = Parameters::new();
        assert_eq!(
            status_check(&StepContext::new(&captures, &step, &params)),
            "check(res, { 'status is 201': (r) => Boolean(r) && r.status === 201 });"
        );
    }
}

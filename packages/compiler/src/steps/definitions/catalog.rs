//! Product catalog steps: search, listing and detail.

use super::parameter_threshold;
use crate::js::string_literal;
use crate::steps::definition::{MetricDecl, StepContext, StepDefinition, Threshold};

/// Search latency bound used when the scenario sets no `threshold`.
const DEFAULT_SEARCH_THRESHOLD_MS: &str = "500";

fn search(ctx: &StepContext<'_>) -> String {
    let term = string_literal(ctx.capture(0));
    format!(
        "res = searchProducts(BASE_URL, {term}, authHeaders(data));\n\
         productSearchDuration.add(res.timings.duration);\n\
         productSearchResults.add(res.status === 200 ? (res.json('data') || []).length : 0);\n\
         check(res, {{ 'search returned 200': (r) => r.status === 200 }});"
    )
}

fn search_threshold(ctx: &StepContext<'_>) -> Option<Threshold> {
    parameter_threshold(ctx, "product_search_duration", Some(DEFAULT_SEARCH_THRESHOLD_MS))
}

fn list(_: &StepContext<'_>) -> String {
    "res = listProducts(BASE_URL, authHeaders(data));\n\
     productListDuration.add(res.timings.duration);\n\
     check(res, { 'catalog returned 200': (r) => r.status === 200 });"
        .to_string()
}

fn list_threshold(ctx: &StepContext<'_>) -> Option<Threshold> {
    parameter_threshold(ctx, "product_list_duration", None)
}

fn detail(ctx: &StepContext<'_>) -> String {
    let product_id = ctx.optional_capture(0).map_or_else(
        || {
            "(data && data.productIds && data.productIds.length > 0)\n  \
             ? data.productIds[Math.floor(Math.random() * data.productIds.length)]\n  \
             : 1"
                .to_string()
        },
        string_literal,
    );
    format!(
        "const productId = {product_id};\n\
         res = getProduct(BASE_URL, productId, authHeaders(data));\n\
         productDetailDuration.add(res.timings.duration);\n\
         check(res, {{ 'product returned 200': (r) => r.status === 200 }});"
    )
}

fn seed_setup(_: &StepContext<'_>) -> String {
    "const catalog = listProducts(BASE_URL, authHeaders(ctx));\n\
     ctx.productIds = catalog.status === 200\n  \
     ? (catalog.json('data') || []).map((p) => p.id)\n  \
     : [];"
        .to_string()
}

fn seed_check(_: &StepContext<'_>) -> String {
    "check(data, { 'catalog has products': (d) => Boolean(d && d.productIds && d.productIds.length > 0) });"
        .to_string()
}

pub fn definitions() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(
            r"(?:que )?existen productos en el catálogo",
            "Collect product ids during setup for detail lookups",
            seed_check,
        )
        .imports(&["listProducts", "authHeaders", "check"])
        .setup(seed_setup),
        StepDefinition::new(
            r#"el usuario busca(?: el producto)? "([^"]*)""#,
            "Search products by term and record latency and result count",
            search,
        )
        .imports(&["searchProducts", "authHeaders", "check"])
        .metric(MetricDecl::trend("productSearchDuration", "product_search_duration"))
        .metric(MetricDecl::gauge("productSearchResults", "product_search_results"))
        .threshold(search_threshold),
        StepDefinition::new(
            r#"(?:the )?user searches for "([^"]*)""#,
            "Search products by term and record latency and result count",
            search,
        )
        .imports(&["searchProducts", "authHeaders", "check"])
        .metric(MetricDecl::trend("productSearchDuration", "product_search_duration"))
        .metric(MetricDecl::gauge("productSearchResults", "product_search_results"))
        .threshold(search_threshold),
        StepDefinition::new(
            r"el usuario (?:consulta|lista) el catálogo(?: de productos)?",
            "List the product catalog",
            list,
        )
        .imports(&["listProducts", "authHeaders", "check"])
        .metric(MetricDecl::trend("productListDuration", "product_list_duration"))
        .threshold(list_threshold),
        StepDefinition::new(
            r"(?:the )?user (?:browses|lists) the (?:product )?catalog",
            "List the product catalog",
            list,
        )
        .imports(&["listProducts", "authHeaders", "check"])
        .metric(MetricDecl::trend("productListDuration", "product_list_duration"))
        .threshold(list_threshold),
        StepDefinition::new(
            r#"el usuario consulta (?:el|un) producto(?: "([^"]+)")?"#,
            "Fetch one product, either the named one or a random seeded id",
            detail,
        )
        .imports(&["getProduct", "authHeaders", "check"])
        .metric(MetricDecl::trend("productDetailDuration", "product_detail_duration")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Parameters, Step};

    fn ctx_parts(captures: &[&str]) -> (Vec<String>, Step) {
        (
            captures.iter().map(|c| (*c).to_string()).collect(),
            Step::new("When", "step"),
        )
    }

    #[test]
    fn test_search_embeds_escaped_term() {
        let (captures, step) = ctx_parts(&["kid's shoes"]);
        let params = Parameters::new();
        let code = search(&StepContext::new(&captures, &step, &params));
        assert!(code.contains(r"searchProducts(BASE_URL, 'kid\'s shoes', authHeaders(data))"));
        assert!(code.contains("productSearchDuration.add(res.timings.duration);"));
    }

    #[test]
    fn test_search_threshold_from_parameters() {
        let (captures, step) = ctx_parts(&["laptop"]);
        let params: Parameters = [("threshold", "800")].into_iter().collect();
        let threshold = search_threshold(&StepContext::new(&captures, &step, &params)).unwrap();
        assert_eq!(threshold, Threshold::new("product_search_duration", "p(95)<800"));
    }

    #[test]
    fn test_search_threshold_default() {
        let (captures, step) = ctx_parts(&["laptop"]);
        let params = Parameters::new();
        let threshold = search_threshold(&StepContext::new(&captures, &step, &params)).unwrap();
        assert_eq!(threshold.rule, "p(95)<500");
    }

    #[test]
    fn test_list_threshold_absent_without_parameter() {
        let (captures, step) = ctx_parts(&[]);
        let params = Parameters::new();
        assert!(list_threshold(&StepContext::new(&captures, &step, &params)).is_none());
    }

    #[test]
    fn test_detail_with_named_product() {
        let (captures, step) = ctx_parts(&["SKU-42"]);
        let params = Parameters::new();
        let code = detail(&StepContext::new(&captures, &step, &params));
        assert!(code.starts_with("const productId = 'SKU-42';"));
    }
}

//! Symbol to module resolution for generated imports.

use std::collections::BTreeSet;

use crate::steps::MetricKind;

/// Where a module is loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Built into the load engine (`k6`, `k6/http`).
    Engine(&'static str),
    /// A file of the shared request library, relative to the library dir.
    Library(&'static str),
}

/// One known module and the symbols it exports.
struct ModuleExports {
    origin: Origin,
    default_export: Option<&'static str>,
    named: &'static [&'static str],
}

const KNOWN_MODULES: &[ModuleExports] = &[
    ModuleExports {
        origin: Origin::Engine("k6"),
        default_export: None,
        named: &["check", "fail", "group", "sleep"],
    },
    ModuleExports {
        origin: Origin::Engine("k6/http"),
        default_export: Some("http"),
        named: &[],
    },
    ModuleExports {
        origin: Origin::Library("auth.js"),
        default_export: None,
        named: &["login", "authHeaders"],
    },
    ModuleExports {
        origin: Origin::Library("products.js"),
        default_export: None,
        named: &["searchProducts", "listProducts", "getProduct"],
    },
    ModuleExports {
        origin: Origin::Library("users.js"),
        default_export: None,
        named: &["getProfile", "listUsers"],
    },
    ModuleExports {
        origin: Origin::Library("orders.js"),
        default_export: None,
        named: &["createOrder", "listOrders"],
    },
];

/// Module that exports the metric classes.
pub const METRICS_MODULE: &str = "k6/metrics";

/// HTML report helper used by `handleSummary`.
pub const HTML_REPORT_MODULE: &str =
    "https://raw.githubusercontent.com/benc-uk/k6-reporter/main/dist/bundle.js";

/// Text summary helper used by `handleSummary`.
pub const TEXT_SUMMARY_MODULE: &str = "https://jslib.k6.io/k6-summary/0.0.1/index.js";

/// A single `import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub default_export: Option<String>,
    pub named: Vec<String>,
    pub from: String,
}

impl ImportDecl {
    fn named(names: impl IntoIterator<Item = impl Into<String>>, from: impl Into<String>) -> Self {
        Self {
            default_export: None,
            named: names.into_iter().map(Into::into).collect(),
            from: from.into(),
        }
    }
}

/// Imports the script needs, and symbols no known module exports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedImports {
    pub declarations: Vec<ImportDecl>,
    pub unknown: Vec<String>,
}

/// Join a library dir and file with exactly one `/`.
fn library_path(lib_dir: &str, file: &str) -> String {
    format!("{}/{file}", lib_dir.trim_end_matches('/'))
}

/// Build the import statements for the symbols a script uses.
///
/// Statements come out in a fixed order: engine modules, metric classes,
/// library files, then the report helpers. Symbols inside a statement
/// follow the table order, not the order steps asked for them.
#[must_use]
pub fn resolve_imports(
    required: &BTreeSet<String>,
    metric_kinds: &BTreeSet<MetricKind>,
    lib_dir: &str,
) -> ResolvedImports {
    let mut resolved = ResolvedImports::default();
    let mut library = Vec::new();

    for module in KNOWN_MODULES {
        let default_export = module
            .default_export
            .filter(|name| required.contains(*name))
            .map(String::from);
        let named: Vec<String> = module
            .named
            .iter()
            .filter(|name| required.contains(**name))
            .map(|name| (*name).to_string())
            .collect();
        if default_export.is_none() && named.is_empty() {
            continue;
        }

        match module.origin {
            Origin::Engine(path) => resolved.declarations.push(ImportDecl {
                default_export,
                named,
                from: path.to_string(),
            }),
            Origin::Library(file) => library.push(ImportDecl {
                default_export,
                named,
                from: library_path(lib_dir, file),
            }),
        }
    }

    if !metric_kinds.is_empty() {
        resolved.declarations.push(ImportDecl::named(
            metric_kinds.iter().map(MetricKind::class_name),
            METRICS_MODULE,
        ));
    }
    resolved.declarations.extend(library);
    resolved
        .declarations
        .push(ImportDecl::named(["htmlReport"], HTML_REPORT_MODULE));
    resolved
        .declarations
        .push(ImportDecl::named(["textSummary"], TEXT_SUMMARY_MODULE));

    resolved.unknown = required
        .iter()
        .filter(|symbol| !is_known(symbol))
        .cloned()
        .collect();
    for symbol in &resolved.unknown {
        tracing::warn!(symbol = %symbol, "no module exports symbol, import skipped");
    }

    resolved
}

fn is_known(symbol: &str) -> bool {
    KNOWN_MODULES
        .iter()
        .any(|m| m.default_export == Some(symbol) || m.named.contains(&symbol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn symbols(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_resolve_orders_sections() {
        let required = symbols(&["searchProducts", "check", "authHeaders", "group", "http"]);
        let kinds: BTreeSet<MetricKind> = [MetricKind::Trend].into_iter().collect();
        let resolved = resolve_imports(&required, &kinds, "../lib");

        let froms: Vec<&str> = resolved.declarations.iter().map(|d| d.from.as_str()).collect();
        assert_eq!(
            froms,
            vec![
                "k6",
                "k6/http",
                "k6/metrics",
                "../lib/auth.js",
                "../lib/products.js",
                HTML_REPORT_MODULE,
                TEXT_SUMMARY_MODULE,
            ]
        );
        assert_eq!(resolved.declarations[0].named, vec!["check", "group"]);
        assert_eq!(resolved.declarations[1].default_export.as_deref(), Some("http"));
        assert!(resolved.unknown.is_empty());
    }

    #[test]
    fn test_only_required_symbols_are_imported() {
        let resolved = resolve_imports(&symbols(&["sleep"]), &BTreeSet::new(), "../lib");

        assert_eq!(resolved.declarations[0].named, vec!["sleep"]);
        assert!(!resolved.declarations.iter().any(|d| d.from == METRICS_MODULE));
        assert!(!resolved.declarations.iter().any(|d| d.from.ends_with("auth.js")));
    }

    #[test]
    fn test_metric_classes_follow_kind_order() {
        let kinds: BTreeSet<MetricKind> = [MetricKind::Gauge, MetricKind::Trend, MetricKind::Rate]
            .into_iter()
            .collect();
        let resolved = resolve_imports(&BTreeSet::new(), &kinds, "../lib");
        let metrics = resolved
            .declarations
            .iter()
            .find(|d| d.from == METRICS_MODULE)
            .unwrap();
        assert_eq!(metrics.named, vec!["Trend", "Rate", "Gauge"]);
    }

    #[test]
    fn test_unknown_symbol_reported() {
        let resolved = resolve_imports(&symbols(&["teleport", "check"]), &BTreeSet::new(), "lib/");
        assert_eq!(resolved.unknown, vec!["teleport"]);
        assert_eq!(resolved.declarations[0].named, vec!["check"]);
    }

    #[test]
    fn test_library_path_trailing_slash() {
        assert_eq!(library_path("lib/", "auth.js"), "lib/auth.js");
        assert_eq!(library_path("../lib", "auth.js"), "../lib/auth.js");
    }
}

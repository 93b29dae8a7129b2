//! Order steps.

use super::parameter_threshold;
use crate::js::string_literal;
use crate::steps::definition::{MetricDecl, StepContext, StepDefinition, Threshold};
use crate::types::StepTable;

/// Build a JS array literal of order items from a `productId | quantity` table.
fn items_from_table(table: &StepTable) -> Option<String> {
    let (header, rows) = table.rows.split_first()?;
    let column = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let id_col = column("productId").or_else(|| column("product"))?;
    let qty_col = column("quantity").or_else(|| column("cantidad"));

    let items: Vec<String> = rows
        .iter()
        .map(|row| {
            let id = row.get(id_col).map_or("", |c| c.trim());
            let qty = qty_col
                .and_then(|i| row.get(i))
                .and_then(|q| q.trim().parse::<u32>().ok())
                .unwrap_or(1);
            format!("{{ productId: {}, quantity: {qty} }}", string_literal(id))
        })
        .collect();
    Some(format!("[{}]", items.join(", ")))
}

fn payload(ctx: &StepContext<'_>) -> String {
    if let Some(doc) = ctx.step.docstring.as_deref().filter(|d| !d.trim().is_empty()) {
        return doc.trim().to_string();
    }
    if let Some(items) = ctx.step.table.as_ref().and_then(items_from_table) {
        return format!("{{ items: {items} }}");
    }
    let count: u32 = ctx.capture(0).parse().unwrap_or(1).max(1);
    format!(
        "{{\n  \
         items: Array.from({{ length: {count} }}, (_, i) => ({{\n    \
         productId: (data && data.productIds && data.productIds.length > 0)\n      \
         ? data.productIds[i % data.productIds.length]\n      \
         : i + 1,\n    \
         quantity: 1,\n  \
         }})),\n\
         }}"
    )
}

fn create(ctx: &StepContext<'_>) -> String {
    format!(
        "const order = {};\n\
         res = createOrder(BASE_URL, order, authHeaders(data));\n\
         orderCreationDuration.add(res.timings.duration);\n\
         orderErrors.add(res.status !== 201);\n\
         if (res.status === 201) {{\n  \
         ordersCreated.add(1);\n\
         }}\n\
         check(res, {{ 'order created': (r) => r.status === 201 }});",
        payload(ctx)
    )
}

fn create_threshold(ctx: &StepContext<'_>) -> Option<Threshold> {
    parameter_threshold(ctx, "order_creation_duration", None)
}

fn list(_: &StepContext<'_>) -> String {
    "res = listOrders(BASE_URL, authHeaders(data));\n\
     orderListDuration.add(res.timings.duration);\n\
     check(res, { 'orders returned 200': (r) => r.status === 200 });"
        .to_string()
}

pub fn definitions() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(
            r"el usuario crea un pedido(?: con (\d+) productos?)?",
            "Create an order from a doc string, a productId table, or N seeded products",
            create,
        )
        .imports(&["createOrder", "authHeaders", "check"])
        .metric(MetricDecl::trend("orderCreationDuration", "order_creation_duration"))
        .metric(MetricDecl::rate("orderErrors", "order_errors"))
        .metric(MetricDecl::counter("ordersCreated", "orders_created"))
        .threshold(create_threshold),
        StepDefinition::new(
            r"(?:the )?user (?:creates|places) an order(?: with (\d+) products?)?",
            "Create an order from a doc string, a productId table, or N seeded products",
            create,
        )
        .imports(&["createOrder", "authHeaders", "check"])
        .metric(MetricDecl::trend("orderCreationDuration", "order_creation_duration"))
        .metric(MetricDecl::rate("orderErrors", "order_errors"))
        .metric(MetricDecl::counter("ordersCreated", "orders_created"))
        .threshold(create_threshold),
        StepDefinition::new(
            r"el usuario consulta (?:sus|los) pedidos",
            "List the user's orders",
            list,
        )
        .imports(&["listOrders", "authHeaders", "check"])
        .metric(MetricDecl::trend("orderListDuration", "order_list_duration")),
    ]
}

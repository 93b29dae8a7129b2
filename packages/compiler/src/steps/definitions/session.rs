//! Authentication and environment readiness steps.

use crate::js::string_literal;
use crate::steps::definition::{StepContext, StepDefinition};

fn login_setup(ctx: &StepContext<'_>) -> String {
    let username = ctx
        .optional_capture(0)
        .map_or_else(|| "__ENV.USERNAME".to_string(), string_literal);
    format!(
        "const session = login(BASE_URL, {username}, __ENV.PASSWORD);\n\
         if (!session || !session.token) {{\n  \
         fail(`Authentication failed for ${{{username}}}`);\n\
         }}\n\
         ctx.token = session.token;"
    )
}

fn session_check(_: &StepContext<'_>) -> String {
    "check(data, { 'session token present': (d) => Boolean(d && d.token) });".to_string()
}

fn health_check(_: &StepContext<'_>) -> String {
    "res = http.get(`${BASE_URL}/health`);\n\
     check(res, { 'API is available': (r) => r.status === 200 });"
        .to_string()
}

pub fn definitions() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(
            r#"(?:que )?el usuario (?:está autenticado|ha iniciado sesión|inicia sesión)(?: como "([^"]+)")?"#,
            "Log in once during setup and share the token with every iteration",
            session_check,
        )
        .imports(&["login", "fail", "check"])
        .setup(login_setup),
        StepDefinition::new(
            r#"(?:the )?user is (?:authenticated|logged in)(?: as "([^"]+)")?"#,
            "Log in once during setup and share the token with every iteration",
            session_check,
        )
        .imports(&["login", "fail", "check"])
        .setup(login_setup),
        StepDefinition::new(
            r"(?:que )?la API está disponible",
            "Probe the health endpoint",
            health_check,
        )
        .imports(&["http", "check"]),
        StepDefinition::new(
            r"(?:the )?API is (?:available|up)",
            "Probe the health endpoint",
            health_check,
        )
        .imports(&["http", "check"]),
    ]
}

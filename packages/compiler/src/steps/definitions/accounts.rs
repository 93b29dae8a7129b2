//! User account steps.

use super::parameter_threshold;
use crate::steps::definition::{MetricDecl, StepContext, StepDefinition, Threshold};

fn profile(_: &StepContext<'_>) -> String {
    "res = getProfile(BASE_URL, authHeaders(data));\n\
     userProfileDuration.add(res.timings.duration);\n\
     check(res, { 'profile returned 200': (r) => r.status === 200 });"
        .to_string()
}

fn profile_threshold(ctx: &StepContext<'_>) -> Option<Threshold> {
    parameter_threshold(ctx, "user_profile_duration", None)
}

fn list(_: &StepContext<'_>) -> String {
    "res = listUsers(BASE_URL, authHeaders(data));\n\
     userListDuration.add(res.timings.duration);\n\
     check(res, { 'users returned 200': (r) => r.status === 200 });"
        .to_string()
}

pub fn definitions() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(
            r"el usuario consulta su perfil",
            "Fetch the authenticated user's profile",
            profile,
        )
        .imports(&["getProfile", "authHeaders", "check"])
        .metric(MetricDecl::trend("userProfileDuration", "user_profile_duration"))
        .threshold(profile_threshold),
        StepDefinition::new(
            r"(?:the )?user (?:views|requests) (?:their|his|her) profile",
            "Fetch the authenticated user's profile",
            profile,
        )
        .imports(&["getProfile", "authHeaders", "check"])
        .metric(MetricDecl::trend("userProfileDuration", "user_profile_duration"))
        .threshold(profile_threshold),
        StepDefinition::new(
            r"el (?:usuario|administrador) consulta la lista de usuarios",
            "List registered users",
            list,
        )
        .imports(&["listUsers", "authHeaders", "check"])
        .metric(MetricDecl::trend("userListDuration", "user_list_duration")),
    ]
}

//! Think-time steps.

use crate::js::number_or;
use crate::steps::definition::{StepContext, StepDefinition};

fn fixed(ctx: &StepContext<'_>) -> String {
    format!("sleep({});", number_or(ctx.capture(0), 1.0))
}

fn ranged(ctx: &StepContext<'_>) -> String {
    let min = number_or(ctx.capture(0), 1.0);
    let max = number_or(ctx.capture(1), 3.0);
    format!("sleep({min} + Math.random() * ({max} - {min}));")
}

pub fn definitions() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new(
            r"el usuario espera entre (\d+(?:[.,]\d+)?) y (\d+(?:[.,]\d+)?) segundos",
            "Random think time in a range",
            ranged,
        )
        .imports(&["sleep"]),
        StepDefinition::new(
            r"el usuario espera (\d+(?:[.,]\d+)?) segundos?",
            "Fixed think time",
            fixed,
        )
        .imports(&["sleep"]),
        StepDefinition::new(
            r"(?:the )?user waits between (\d+(?:\.\d+)?) and (\d+(?:\.\d+)?) seconds",
            "Random think time in a range",
            ranged,
        )
        .imports(&["sleep"]),
        StepDefinition::new(
            r"(?:the )?user waits (\d+(?:\.\d+)?) seconds?",
            "Fixed think time",
            fixed,
        )
        .imports(&["sleep"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Parameters, Step};

    #[test]
    fn test_ranged_sleep() {
        let captures = vec!["1".to_string(), "2,5".to_string()];
        let step = Step::new("And", "el usuario espera entre 1 y 2,5 segundos");
        let params = Parameters::new();
        assert_eq!(
            ranged(&StepContext::new(&captures, &step, &params)),
            "sleep(1 + Math.random() * (2.5 - 1));"
        );
    }
}

//! Load profile derivation from scenario parameters.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{
    DEFAULT_DURATION, DEFAULT_ITERATIONS, DEFAULT_VUS, FALLBACK_DURATION_SECS,
    FIXED_PROFILE_MAX_SECS,
};
use crate::types::{LoadProfile, Parameters, Stage};

/// Shortest ramp-up stage in seconds.
const MIN_RAMP_UP_SECS: u64 = 10;

/// Shortest ramp-down stage in seconds.
const MIN_RAMP_DOWN_SECS: u64 = 5;

/// Shortest steady stage in seconds.
const MIN_STEADY_SECS: u64 = 10;

/// One or more `<number><unit>` groups, e.g. `30s`, `2m`, `1h30m`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+[hms])+$").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DURATION_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)([hms])").expect("valid regex"));

/// Convert a duration like `30s`, `2m`, `1h` or `1m30s` to seconds.
///
/// Returns `None` when the text has no unit or is otherwise malformed.
///
/// # Examples
/// ```
/// use bdd_k6_compiler::generator::parse_duration_secs;
///
/// assert_eq!(parse_duration_secs("2m"), Some(120));
/// assert_eq!(parse_duration_secs("1m30s"), Some(90));
/// assert_eq!(parse_duration_secs("soon"), None);
/// ```
#[must_use]
pub fn parse_duration_secs(text: &str) -> Option<u64> {
    let text = text.trim().to_lowercase();
    if !DURATION_PATTERN.is_match(&text) {
        return None;
    }
    DURATION_PART.captures_iter(&text).try_fold(0u64, |total, caps| {
        let value: u64 = caps[1].parse().ok()?;
        let unit = match &caps[2] {
            "h" => 3600,
            "m" => 60,
            _ => 1,
        };
        total.checked_add(value.checked_mul(unit)?)
    })
}

/// Floor of `pct` percent of `total`, without overflowing on huge totals.
fn percent_of(total: u64, pct: u64) -> u64 {
    total / 100 * pct + total % 100 * pct / 100
}

/// Derive the load profile for a scenario.
///
/// Reads `vus`, `duration` and `iterations` from the parameters. A single
/// VU over at most 30 seconds runs a fixed number of iterations; anything
/// else ramps up, holds, and ramps down.
///
/// The steady stage subtracts an independently floored 15% of the total
/// rather than the clamped ramp-down, so the three stages need not add up
/// to the requested duration.
#[must_use]
pub fn derive_load_profile(params: &Parameters) -> LoadProfile {
    let vus = params
        .get_or("vus", "")
        .trim()
        .parse::<u32>()
        .unwrap_or(DEFAULT_VUS)
        .max(1);
    let total = parse_duration_secs(params.get_or("duration", DEFAULT_DURATION))
        .unwrap_or(FALLBACK_DURATION_SECS);

    if vus <= 1 && total <= FIXED_PROFILE_MAX_SECS {
        let iterations = params
            .get_or("iterations", "")
            .trim()
            .parse::<u32>()
            .unwrap_or(DEFAULT_ITERATIONS)
            .max(1);
        return LoadProfile::Fixed {
            virtual_users: vus,
            iterations,
        };
    }

    let ramp_down_share = percent_of(total, 15);
    let ramp_up = percent_of(total, 20).max(MIN_RAMP_UP_SECS);
    let ramp_down = ramp_down_share.max(MIN_RAMP_DOWN_SECS);
    let steady = total
        .saturating_sub(ramp_up)
        .saturating_sub(ramp_down_share)
        .max(MIN_STEADY_SECS);

    LoadProfile::Ramping {
        start_vus: (vus / 10).max(1),
        stages: vec![
            Stage {
                duration_secs: ramp_up,
                target: vus,
            },
            Stage {
                duration_secs: steady,
                target: vus,
            },
            Stage {
                duration_secs: ramp_down,
                target: 0,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration_secs("45s"), Some(45));
        assert_eq!(parse_duration_secs("2m"), Some(120));
        assert_eq!(parse_duration_secs("1h"), Some(3600));
        assert_eq!(parse_duration_secs(" 1h30m "), Some(5400));
        assert_eq!(parse_duration_secs("30S"), Some(30));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert_eq!(parse_duration_secs(""), None);
        assert_eq!(parse_duration_secs("30"), None);
        assert_eq!(parse_duration_secs("1.5m"), None);
        assert_eq!(parse_duration_secs("ten seconds"), None);
    }

    #[test]
    fn test_single_vu_short_duration_is_fixed() {
        let profile = derive_load_profile(&params(&[("vus", "1"), ("duration", "10s")]));
        assert_eq!(
            profile,
            LoadProfile::Fixed {
                virtual_users: 1,
                iterations: 1
            }
        );
    }

    #[test]
    fn test_defaults_are_fixed() {
        let profile = derive_load_profile(&Parameters::new());
        assert_eq!(
            profile,
            LoadProfile::Fixed {
                virtual_users: 1,
                iterations: 1
            }
        );
    }

    #[test]
    fn test_fixed_profile_reads_iterations() {
        let profile = derive_load_profile(&params(&[("iterations", "5")]));
        assert_eq!(
            profile,
            LoadProfile::Fixed {
                virtual_users: 1,
                iterations: 5
            }
        );
    }

    #[test]
    fn test_twenty_vus_two_minutes() {
        let profile = derive_load_profile(&params(&[("vus", "20"), ("duration", "2m")]));
        assert_eq!(
            profile,
            LoadProfile::Ramping {
                start_vus: 2,
                stages: vec![
                    Stage {
                        duration_secs: 24,
                        target: 20
                    },
                    Stage {
                        duration_secs: 78,
                        target: 20
                    },
                    Stage {
                        duration_secs: 18,
                        target: 0
                    },
                ],
            }
        );
    }

    #[test]
    fn test_minimum_stage_lengths() {
        let profile = derive_load_profile(&params(&[("vus", "5"), ("duration", "20s")]));
        let LoadProfile::Ramping { start_vus, stages } = profile else {
            panic!("expected ramping profile");
        };
        assert_eq!(start_vus, 1);
        let durations: Vec<u64> = stages.iter().map(|s| s.duration_secs).collect();
        assert_eq!(durations, vec![10, 10, 5]);
    }

    #[test]
    fn test_steady_uses_independent_floor() {
        // 100s: ramp-up 20, steady 100-20-15, ramp-down 15
        let profile = derive_load_profile(&params(&[("vus", "2"), ("duration", "100s")]));
        let LoadProfile::Ramping { stages, .. } = profile else {
            panic!("expected ramping profile");
        };
        assert_eq!(stages[0].duration_secs, 20);
        assert_eq!(stages[1].duration_secs, 65);
        assert_eq!(stages[2].duration_secs, 15);
    }

    #[test]
    fn test_percent_of_matches_plain_arithmetic() {
        for total in [0, 1, 59, 60, 100, 119, 120, 3599, 86_400] {
            assert_eq!(percent_of(total, 15), total * 15 / 100);
            assert_eq!(percent_of(total, 20), total * 20 / 100);
        }
    }

    #[test]
    fn test_huge_duration_does_not_overflow() {
        let profile = derive_load_profile(&params(&[
            ("vus", "10"),
            ("duration", "5000000000000000000s"),
        ]));
        let LoadProfile::Ramping { stages, .. } = profile else {
            panic!("expected ramping profile");
        };
        assert_eq!(stages[0].duration_secs, 1_000_000_000_000_000_000);
        assert_eq!(stages[1].duration_secs, 3_250_000_000_000_000_000);
        assert_eq!(stages[2].duration_secs, 750_000_000_000_000_000);
    }

    #[test]
    fn test_unparseable_duration_falls_back_to_sixty_seconds() {
        let profile = derive_load_profile(&params(&[("vus", "1"), ("duration", "forever")]));
        let LoadProfile::Ramping { stages, .. } = profile else {
            panic!("expected ramping profile");
        };
        // 60s: ramp-up 12, steady 60-12-9=39, ramp-down 9
        let durations: Vec<u64> = stages.iter().map(|s| s.duration_secs).collect();
        assert_eq!(durations, vec![12, 39, 9]);
    }
}

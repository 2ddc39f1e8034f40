use std::sync::LazyLock;

use regex::Regex;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("ISO-8601 duration pattern is valid")
});

/// Whole seconds in an ISO-8601 duration such as `PT1H2M3S` or `P1DT5M`.
pub fn parse_iso_duration(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw == "P" || raw.ends_with('T') {
        return None;
    }
    let caps = ISO_DURATION.captures(raw)?;
    let part = |i: usize| -> Option<f64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0.0),
        }
    };

    let total = part(1)? * 604_800.0
        + part(2)? * 86_400.0
        + part(3)? * 3_600.0
        + part(4)? * 60.0
        + part(5)?;
    Some(total as u64)
}

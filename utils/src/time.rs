//! Duration formatting for stake lock periods.

const UNITS: [(u64, &str); 5] = [
    (31_557_600, "y"),
    (86_400, "d"),
    (3_600, "h"),
    (60, "m"),
    (1, "s"),
];

/// Format `secs` using its two most significant units, e.g. `91d 7h`.
///
/// Years are Julian (365.25 days), matching the stake tier thresholds.
pub fn format_duration(secs: u64) -> String {
    let mut rest = secs;
    let mut parts = Vec::with_capacity(2);
    for (size, unit) in UNITS {
        if parts.len() == 2 {
            break;
        }
        let count = rest / size;
        rest %= size;
        if count > 0 || !parts.is_empty() {
            parts.push(format!("{count}{unit}"));
        }
    }
    if parts.is_empty() {
        return "0s".to_string();
    }
    parts.join(" ")
}

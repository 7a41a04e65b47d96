//! Human-readable amount formatting for log lines.

use tally_types::Amount;

/// Base units per whole token.
pub const DEFAULT_DECIMALS: u32 = 8;

/// Render `amount` as whole tokens with thousands separators, e.g. `1,234.5`.
///
/// Trailing fractional zeros are dropped; the value is exact.
pub fn format_amount(amount: &Amount, decimals: u32) -> String {
    let digits = amount.raw().magnitude().to_string();
    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount.is_negative() { "-" } else { "" };
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

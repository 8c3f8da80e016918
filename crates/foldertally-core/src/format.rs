//! Display helpers: human-readable counts and rates.
//!
//! Counters are `u64` internally; floating point only appears at the
//! formatting boundary.

/// Format a count with thousand separators.
pub fn format_count(count: u64) -> String {
    if count < 1_000 {
        return count.to_string();
    }
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a per-second rate, e.g. `"1,234/s"` or `"12.5/s"` below 100.
pub fn format_rate(per_second: f64) -> String {
    if !per_second.is_finite() || per_second <= 0.0 {
        "0/s".to_string()
    } else if per_second < 100.0 {
        format!("{per_second:.1}/s")
    } else {
        format!("{}/s", format_count(per_second.round() as u64))
    }
}

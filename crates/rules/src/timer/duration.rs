//! Human-readable duration parsing for timer expressions.

use std::time::Duration;

/// Parse a human-readable duration string into a [`Duration`].
///
/// Supports components: `Xd` (days), `Xh` (hours), `Xm` (minutes), `Xs` (seconds)
/// and `Xms` (milliseconds). Components can be combined: "2h30m", "1s500ms".
/// A bare number is read as seconds. Returns `None` if the string is empty or
/// unparseable.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut total_ms: u64 = 0;
    let mut num_buf = String::new();
    let mut found_unit = false;
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_ascii_digit() {
            num_buf.push(ch);
            continue;
        }

        let n: u64 = num_buf.parse().ok()?;
        num_buf.clear();
        let unit_ms = match ch {
            'd' => 86_400_000,
            'h' => 3_600_000,
            'm' if chars.peek() == Some(&'s') => {
                chars.next();
                1
            }
            'm' => 60_000,
            's' => 1_000,
            _ => return None,
        };
        total_ms = total_ms.checked_add(n.checked_mul(unit_ms)?)?;
        found_unit = true;
    }

    // Handle trailing number without unit (treat as seconds).
    if !num_buf.is_empty() {
        if found_unit {
            // Ambiguous: "30m15" -- reject.
            return None;
        }
        let n: u64 = num_buf.parse().ok()?;
        total_ms = n.checked_mul(1_000)?;
    }

    Some(Duration::from_millis(total_ms))
}

/// Render a duration in the compact form accepted by [`parse_duration`].
pub fn format_duration(d: Duration) -> String {
    let mut ms = d.as_millis();
    if ms == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, size) in [("d", 86_400_000u128), ("h", 3_600_000), ("m", 60_000), ("s", 1_000), ("ms", 1)] {
        let n = ms / size;
        if n > 0 {
            out.push_str(&format!("{}{}", n, unit));
            ms -= n * size;
        }
    }
    out
}

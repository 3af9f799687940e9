/// Read a CSS length such as `"2px"` or `"1.5"` as a number of pixels.
///
/// Mirrors a lenient float parse: the longest numeric prefix wins and anything unparseable
/// (`"medium"`, `""`, `"auto"`) reads as `0.0`. Non-finite results also read as `0.0`.
pub(crate) fn parse_px_or_zero(value: &str) -> f64 {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0usize;
    let mut seen_digit = false;
    let mut seen_dot = false;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return 0.0;
    }

    // Optional exponent, only taken when it is complete.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while matches!(bytes.get(exp_end), Some(b'0'..=b'9')) {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    match s[..end].parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Format a pixel quantity the way style values are written (`"12px"`, `"-0.5px"`).
pub(crate) fn px(value: f64) -> String {
    format!("{}px", fmt_num(value))
}

/// Shortest round-trip decimal form without a trailing `.0` for integral values.
pub(crate) fn fmt_num(value: f64) -> String {
    if value == 0.0 {
        // Collapses `-0.0` too.
        return "0".to_string();
    }
    format!("{value}")
}

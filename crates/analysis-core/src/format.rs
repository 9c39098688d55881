//! Number formatting shared by every narrative.
//!
//! Non-finite inputs render as `N/A` so narratives never print `NaN` or `inf`.

pub const NOT_AVAILABLE: &str = "N/A";

/// Fixed decimals with comma thousands separators, e.g. `1234.5` -> `1,234.50`.
pub fn grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut out = String::with_capacity(raw.len() + int_part.len() / 3 + 1);
    // "-0.00" would read oddly; only print the sign when something non-zero survives rounding
    if value < 0.0 && raw.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    let digits = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Fraction rendered as a percentage, e.g. `0.6` with 1 decimal -> `60.0%`.
pub fn percent(fraction: f64, decimals: usize) -> String {
    if !fraction.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.*}%", decimals, fraction * 100.0)
}

/// Dollar amount with two decimals, e.g. `12500.0` -> `$12,500.00`.
pub fn money(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    if value < 0.0 {
        format!("-${}", grouped(-value, 2))
    } else {
        format!("${}", grouped(value, 2))
    }
}

/// Fixed decimals or `N/A`.
pub fn fixed_or_na(value: Option<f64>, decimals: usize) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.*}", decimals, v),
        None => NOT_AVAILABLE.to_string(),
    }
}

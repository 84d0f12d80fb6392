//! Significant-digit rounding and plain-decimal formatting.
//!
//! URL fragments carry camera numbers rounded to a fixed number of
//! significant digits, printed without exponent notation so the strings stay
//! readable and bit-stable across encode/decode cycles.

/// Rounds `value` to `digits` significant digits, ties away from zero.
///
/// Zero (either sign) comes back as positive zero. Non-finite values pass
/// through untouched; callers that format them must guard first.
pub fn round_sig(value: f64, digits: u32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    if !value.is_finite() {
        return value;
    }
    let digits = digits.max(1) as i32;
    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10f64.powi(digits - 1 - magnitude);
    (value * scale).round() / scale
}

/// Formats `value` rounded to `digits` significant digits as plain decimal
/// text: no exponent, no trailing zeros, no trailing dot, negative zero
/// folded to `"0"`. Non-finite input is normalized to `"0"` so the output is
/// always a valid fragment token.
pub fn format_sig(value: f64, digits: u32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = round_sig(value, digits);
    if rounded == 0.0 {
        return "0".to_string();
    }
    let digits = digits.max(1) as i32;
    let magnitude = rounded.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let mut text = format!("{rounded:.decimals$}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    text
}

use serde_json::Value;
use tracing::debug;

/// Coerce a resolved value to an integer, falling back to `default`.
///
/// Fractional input truncates toward zero. Strings may carry whitespace,
/// thousands separators, a decimal comma or a trailing `%`.
pub fn as_int(value: Option<&Value>, default: i64) -> i64 {
    let parsed = match value {
        None | Some(Value::Null) => return default,
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(float_to_int)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| parse_numeric(s).and_then(float_to_int)),
        Some(_) => None,
    };

    parsed.unwrap_or_else(|| {
        debug!(target: "coerce", ?value, default, "value not coercible to int");
        default
    })
}

/// Coerce a resolved value to a finite float, falling back to `default`.
pub fn as_float(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        None | Some(Value::Null) => return default,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_numeric(s),
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => v,
        _ => {
            debug!(target: "coerce", ?value, default, "value not coercible to float");
            default
        }
    }
}

/// Render a confidence percentage with one decimal place.
pub fn format_confidence(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{:.1}%", value)
}

fn float_to_int(v: f64) -> Option<i64> {
    (v.is_finite() && v > i64::MIN as f64 && v < i64::MAX as f64).then(|| v.trunc() as i64)
}

fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_end_matches('%').trim_end();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if trimmed.contains(',') {
        if trimmed.contains('.') || is_thousands_grouped(trimmed) {
            trimmed.replace(',', "")
        } else {
            // Decimal comma, e.g. "1,5"
            trimmed.replacen(',', ".", 1)
        }
    } else {
        trimmed.to_string()
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// "1,234" or "12,345,678" but not "1,5" or "1,23".
fn is_thousands_grouped(s: &str) -> bool {
    let digits = s
        .strip_prefix('-')
        .or_else(|| s.strip_prefix('+'))
        .unwrap_or(s);
    let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());

    let mut groups = digits.split(',');
    let lead_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && all_digits(g));

    lead_ok && groups.all(|g| g.len() == 3 && all_digits(g))
}

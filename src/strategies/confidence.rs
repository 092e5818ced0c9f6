/// Clamp a raw confidence into [0, 100]. NaN reads as no confidence.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Shared scoring primitive: `clamp(base_score * weight_factor, 0, 100)`.
pub fn score_confidence(base_score: f64, weight_factor: f64) -> f64 {
    clamp_confidence(base_score * weight_factor)
}

/// Weight for picks that get likelier as the match runs down (unders, holding a lead).
///
/// Ranges from `1 - swing/2` at kickoff to `1 + swing/2` at 90'.
pub fn rising_with_clock(elapsed: u32, swing: f64) -> f64 {
    1.0 - swing / 2.0 + swing * match_progress(elapsed)
}

/// Weight for picks that need something still to happen (overs, next goal).
pub fn falling_with_clock(elapsed: u32, swing: f64) -> f64 {
    1.0 + swing / 2.0 - swing * match_progress(elapsed)
}

fn match_progress(elapsed: u32) -> f64 {
    (f64::from(elapsed) / 90.0).clamp(0.0, 1.0)
}

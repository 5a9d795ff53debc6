//! Numeric guards applied at the interpolation engine's choke points.
//!
//! Area ratios are floating-point quotients of two independently measured
//! areas, so drift in either direction is expected. These guards keep every
//! ratio in `[0, 1]` and every reallocated population a non-negative
//! integer; a `NaN` can never reach a reported population.

/// Whether an area value is usable as a ratio denominator.
///
/// Zero, negative, and non-finite reference areas make the area ratio
/// meaningless and must cause the candidate to be skipped.
#[must_use]
pub fn valid_area(area: f64) -> bool {
    area.is_finite() && area > 0.0
}

/// Clamps an area ratio into `[0, 1]`. `NaN` collapses to `0`.
#[must_use]
pub fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

/// Reallocates a population by an area ratio, rounding half-up to a
/// non-negative integer.
///
/// `ratio` is expected to already be clamped; a non-finite or non-positive
/// population contributes nothing.
#[must_use]
pub fn round_population(ratio: f64, population: f64) -> u64 {
    if !population.is_finite() || population <= 0.0 {
        return 0;
    }
    let scaled = clamp_ratio(ratio) * population;
    if !scaled.is_finite() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        scaled.round() as u64
    }
}

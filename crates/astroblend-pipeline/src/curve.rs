//! Nonlinear slider-to-parameter sensitivity curves.
//!
//! Raw slider positions live on a uniform 0-100 scale, but the engine
//! parameters they drive are far more sensitive at one end of their
//! range. These curves reshape the control so that most of the slider's
//! travel covers the useful part of the parameter space.
//!
//! Both curves are pure functions of the raw position; clamping to the
//! 0-100 domain happens in [`params`](crate::params) before values
//! reach them.

/// Base value of the nebula stretch decay curve: the midtone balance
/// applied when the stretch slider sits at 0.
pub const NEBULA_STRETCH_BASE: f64 = 0.5;

/// Floor ratio of the nebula stretch decay curve. At slider position
/// 100 the emitted midtone balance is `NEBULA_STRETCH_BASE * ratio`,
/// four orders of magnitude below the base.
pub const NEBULA_STRETCH_FLOOR_RATIO: f64 = 0.0002;

/// Quadratic fine-control curve.
///
/// Maps a raw position in `[0, 100]` to `(raw/100)^2 * max`. Moving the
/// slider halfway applies only a quarter of the range, concentrating
/// resolution near zero where black-point adjustments are perceptible.
///
/// Monotonically non-decreasing on the slider domain, with
/// `quadratic_fine(0, max) == 0` and `quadratic_fine(100, max) == max`.
#[must_use]
pub fn quadratic_fine(raw: f64, max: f64) -> f64 {
    let normalized = raw / 100.0;
    normalized * normalized * max
}

/// Exponential decay curve.
///
/// Maps a raw position in `[0, 100]` to `base * floor_ratio^(raw/100)`.
/// The driven transform is perceptually logarithmic, so one slider
/// sweeps several orders of magnitude: `f(0) == base`,
/// `f(100) == base * floor_ratio`, strictly decreasing in between
/// (for `0 < floor_ratio < 1`).
#[must_use]
pub fn exponential_decay(raw: f64, base: f64, floor_ratio: f64) -> f64 {
    base * floor_ratio.powf(raw / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn quadratic_endpoints() {
        assert!(quadratic_fine(0.0, 0.05).abs() < EPSILON);
        assert!((quadratic_fine(100.0, 0.05) - 0.05).abs() < EPSILON);
    }

    #[test]
    fn quadratic_midpoint_is_quarter_of_max() {
        // (50/100)^2 = 0.25, so the midpoint applies 25% of the range.
        assert!((quadratic_fine(50.0, 0.05) - 0.0125).abs() < EPSILON);
        assert!((quadratic_fine(50.0, 1.0) - 0.25).abs() < EPSILON);
    }

    #[test]
    fn quadratic_is_monotone_non_decreasing() {
        let mut previous = quadratic_fine(0.0, 0.05);
        for step in 1..=100 {
            let current = quadratic_fine(f64::from(step), 0.05);
            assert!(
                current >= previous,
                "curve decreased between {} and {step}",
                step - 1,
            );
            previous = current;
        }
    }

    #[test]
    fn exponential_endpoints() {
        let start = exponential_decay(0.0, NEBULA_STRETCH_BASE, NEBULA_STRETCH_FLOOR_RATIO);
        let end = exponential_decay(100.0, NEBULA_STRETCH_BASE, NEBULA_STRETCH_FLOOR_RATIO);
        assert!((start - 0.5).abs() < EPSILON);
        // 0.5 * 0.0002 = 0.0001.
        assert!((end - 0.0001).abs() < EPSILON);
    }

    #[test]
    fn exponential_is_strictly_decreasing() {
        let mut previous = exponential_decay(0.0, NEBULA_STRETCH_BASE, NEBULA_STRETCH_FLOOR_RATIO);
        for step in 1..=100 {
            let current = exponential_decay(
                f64::from(step),
                NEBULA_STRETCH_BASE,
                NEBULA_STRETCH_FLOOR_RATIO,
            );
            assert!(
                current < previous,
                "curve failed to decrease between {} and {step}",
                step - 1,
            );
            previous = current;
        }
    }
}

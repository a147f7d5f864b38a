//! Compositing math and the pixel-math expressions that request it.
//!
//! The engine evaluates composite expressions per channel, with each
//! `$name$` operand read as a normalized [0,1] array. The expression
//! builders here and the scalar formulas they encode are kept side by
//! side so the boundary behavior can be tested without an engine:
//! the scalar function *is* the per-pixel semantics of the expression.

/// Mask-weighted linear interpolation between two layers.
///
/// Where the mask is 0 the result is exactly `a`; where it is 1 the
/// result is exactly `b`. The feathered mask in between produces a
/// soft transition boundary.
#[must_use]
pub fn mask_weighted(a: f64, b: f64, mask: f64) -> f64 {
    mask.mul_add(b, (1.0 - mask) * a)
}

/// Screen blend of a top layer over a base.
///
/// `1 - (1 - top) * (1 - base)`: additively brightens the base
/// wherever the top layer is non-zero and never darkens below it.
/// With `top == 0` the result is exactly `base`; with `top == 1` it
/// saturates at 1 regardless of the base.
#[must_use]
pub fn screen(top: f64, base: f64) -> f64 {
    1.0 - (1.0 - top) * (1.0 - base)
}

/// Pixel-math expression computing [`mask_weighted`] over artifact
/// files: `$a$ * (1 - $mask$) + ($b$ * $mask$)`.
#[must_use]
pub fn mask_weighted_expression(layer_a: &str, layer_b: &str, mask: &str) -> String {
    format!("${layer_a}$ * (1 - ${mask}$) + (${layer_b}$ * ${mask}$)")
}

/// Pixel-math expression computing [`screen`] over artifact files:
/// `1 - (1 - $top$) * (1 - $base$)`.
#[must_use]
pub fn screen_expression(top: &str, base: &str) -> String {
    format!("1 - (1 - ${top}$) * (1 - ${base}$)")
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn zero_mask_yields_layer_a_exactly() {
        for value in [0.0, 0.25, 0.5, 1.0] {
            assert!((mask_weighted(value, 0.9, 0.0) - value).abs() < EPSILON);
        }
    }

    #[test]
    fn full_mask_yields_layer_b_exactly() {
        for value in [0.0, 0.25, 0.5, 1.0] {
            assert!((mask_weighted(0.1, value, 1.0) - value).abs() < EPSILON);
        }
    }

    #[test]
    fn intermediate_mask_interpolates() {
        assert!((mask_weighted(0.0, 1.0, 0.5) - 0.5).abs() < EPSILON);
        assert!((mask_weighted(0.2, 0.8, 0.25) - 0.35).abs() < EPSILON);
    }

    #[test]
    fn screen_with_zero_top_is_the_base() {
        for value in [0.0, 0.3, 0.7, 1.0] {
            assert!((screen(0.0, value) - value).abs() < EPSILON);
        }
    }

    #[test]
    fn screen_with_full_top_saturates() {
        for value in [0.0, 0.3, 0.7, 1.0] {
            assert!((screen(1.0, value) - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn screen_never_darkens_the_base() {
        for top in [0.0, 0.1, 0.5, 0.9] {
            for base in [0.0, 0.2, 0.6, 1.0] {
                assert!(screen(top, base) >= base - EPSILON);
            }
        }
    }

    #[test]
    fn expressions_reference_their_operands() {
        assert_eq!(
            mask_weighted_expression("a.fits", "b.fits", "mask.fits"),
            "$a.fits$ * (1 - $mask.fits$) + ($b.fits$ * $mask.fits$)",
        );
        assert_eq!(
            screen_expression("b.fits", "a.fits"),
            "1 - (1 - $b.fits$) * (1 - $a.fits$)",
        );
    }
}

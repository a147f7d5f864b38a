//! Tunable parameter sets for the two blending workflows.
//!
//! Each workflow exposes an ordered set of named sliders. Every slider
//! has a fixed numeric range and a display precision, and its value is
//! clamped to that range on every mutation path — the typed [`set`]
//! methods and deserialization both funnel through the same clamp, so
//! an out-of-range value can never be observed.
//!
//! [`set`]: CoreBlendParams::set

use serde::{Deserialize, Serialize};

/// Static description of one slider: its range, default value, and
/// the number of decimals the UI shows for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    /// Lower bound of the slider range (inclusive).
    pub min: f64,
    /// Upper bound of the slider range (inclusive).
    pub max: f64,
    /// Value restored by a defaults reset.
    pub default: f64,
    /// Display precision in decimal places.
    pub decimals: usize,
}

impl SliderSpec {
    /// Clamp a candidate value into this slider's range.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Slider identifiers for the core/nebula blend workflow, in UI order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreBlendSlider {
    /// Asinh stretch strength for the core layer.
    CoreStretch,
    /// Black point for the core layer stretch.
    CoreBlackPoint,
    /// Saturation boost for the core layer.
    CoreSaturation,
    /// Raw 0-100 position driving the nebula midtone stretch
    /// (mapped through [`curve::exponential_decay`](crate::curve::exponential_decay)).
    NebulaStretchRaw,
    /// Raw 0-100 position driving the nebula black point
    /// (mapped through [`curve::quadratic_fine`](crate::curve::quadratic_fine)).
    NebulaBlackPointRaw,
    /// Gaussian radius used to feather the blend mask.
    FeatherRadius,
}

/// Parameters for the core/nebula blend workflow.
///
/// Field values are private; reads go through the accessors and writes
/// through [`set`](Self::set), which clamps to the slider's declared
/// range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreBlendParams {
    core_stretch: f64,
    core_black_point: f64,
    core_saturation: f64,
    nebula_stretch_raw: f64,
    nebula_black_point_raw: f64,
    feather_radius: f64,
}

impl CoreBlendParams {
    /// Default asinh stretch strength for the core layer.
    pub const DEFAULT_CORE_STRETCH: f64 = 10.0;
    /// Default core black point.
    pub const DEFAULT_CORE_BLACK_POINT: f64 = 0.0;
    /// Default core saturation.
    pub const DEFAULT_CORE_SATURATION: f64 = 1.0;
    /// Default raw nebula stretch slider position.
    pub const DEFAULT_NEBULA_STRETCH_RAW: f64 = 30.0;
    /// Default raw nebula black point slider position.
    pub const DEFAULT_NEBULA_BLACK_POINT_RAW: f64 = 0.0;
    /// Default feather radius in pixels.
    pub const DEFAULT_FEATHER_RADIUS: f64 = 15.0;

    /// Upper bound of the nebula black point after quadratic mapping.
    pub const NEBULA_BLACK_POINT_MAX: f64 = 0.05;

    /// The slider catalog in UI order.
    pub const SLIDERS: [CoreBlendSlider; 6] = [
        CoreBlendSlider::CoreStretch,
        CoreBlendSlider::CoreBlackPoint,
        CoreBlendSlider::CoreSaturation,
        CoreBlendSlider::NebulaStretchRaw,
        CoreBlendSlider::NebulaBlackPointRaw,
        CoreBlendSlider::FeatherRadius,
    ];

    /// Range, default, and display precision for a slider.
    #[must_use]
    pub const fn spec(slider: CoreBlendSlider) -> SliderSpec {
        match slider {
            CoreBlendSlider::CoreStretch => SliderSpec {
                min: 1.0,
                max: 1000.0,
                default: Self::DEFAULT_CORE_STRETCH,
                decimals: 1,
            },
            CoreBlendSlider::CoreBlackPoint => SliderSpec {
                min: 0.0,
                max: 0.05,
                default: Self::DEFAULT_CORE_BLACK_POINT,
                decimals: 5,
            },
            CoreBlendSlider::CoreSaturation => SliderSpec {
                min: 0.0,
                max: 5.0,
                default: Self::DEFAULT_CORE_SATURATION,
                decimals: 2,
            },
            CoreBlendSlider::NebulaStretchRaw => SliderSpec {
                min: 0.0,
                max: 100.0,
                default: Self::DEFAULT_NEBULA_STRETCH_RAW,
                decimals: 0,
            },
            CoreBlendSlider::NebulaBlackPointRaw => SliderSpec {
                min: 0.0,
                max: 100.0,
                default: Self::DEFAULT_NEBULA_BLACK_POINT_RAW,
                decimals: 6,
            },
            CoreBlendSlider::FeatherRadius => SliderSpec {
                min: 1.0,
                max: 200.0,
                default: Self::DEFAULT_FEATHER_RADIUS,
                decimals: 1,
            },
        }
    }

    /// Build a parameter set from raw values, clamping each to range.
    #[must_use]
    pub fn from_values(
        core_stretch: f64,
        core_black_point: f64,
        core_saturation: f64,
        nebula_stretch_raw: f64,
        nebula_black_point_raw: f64,
        feather_radius: f64,
    ) -> Self {
        let mut params = Self::default();
        params.set(CoreBlendSlider::CoreStretch, core_stretch);
        params.set(CoreBlendSlider::CoreBlackPoint, core_black_point);
        params.set(CoreBlendSlider::CoreSaturation, core_saturation);
        params.set(CoreBlendSlider::NebulaStretchRaw, nebula_stretch_raw);
        params.set(CoreBlendSlider::NebulaBlackPointRaw, nebula_black_point_raw);
        params.set(CoreBlendSlider::FeatherRadius, feather_radius);
        params
    }

    /// Set a slider value, clamped to its declared range.
    pub fn set(&mut self, slider: CoreBlendSlider, value: f64) {
        let clamped = Self::spec(slider).clamp(value);
        *self.field_mut(slider) = clamped;
    }

    /// Current value of a slider.
    #[must_use]
    pub const fn get(&self, slider: CoreBlendSlider) -> f64 {
        match slider {
            CoreBlendSlider::CoreStretch => self.core_stretch,
            CoreBlendSlider::CoreBlackPoint => self.core_black_point,
            CoreBlendSlider::CoreSaturation => self.core_saturation,
            CoreBlendSlider::NebulaStretchRaw => self.nebula_stretch_raw,
            CoreBlendSlider::NebulaBlackPointRaw => self.nebula_black_point_raw,
            CoreBlendSlider::FeatherRadius => self.feather_radius,
        }
    }

    /// Restore every slider to its default value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Asinh stretch strength for the core layer.
    #[must_use]
    pub const fn core_stretch(&self) -> f64 {
        self.core_stretch
    }

    /// Black point for the core layer stretch.
    #[must_use]
    pub const fn core_black_point(&self) -> f64 {
        self.core_black_point
    }

    /// Saturation boost for the core layer.
    #[must_use]
    pub const fn core_saturation(&self) -> f64 {
        self.core_saturation
    }

    /// Raw nebula stretch slider position (unmapped).
    #[must_use]
    pub const fn nebula_stretch_raw(&self) -> f64 {
        self.nebula_stretch_raw
    }

    /// Raw nebula black point slider position (unmapped).
    #[must_use]
    pub const fn nebula_black_point_raw(&self) -> f64 {
        self.nebula_black_point_raw
    }

    /// Gaussian radius used to feather the blend mask.
    #[must_use]
    pub const fn feather_radius(&self) -> f64 {
        self.feather_radius
    }

    /// Nebula midtone balance after the exponential decay mapping.
    #[must_use]
    pub fn nebula_stretch(&self) -> f64 {
        crate::curve::exponential_decay(
            self.nebula_stretch_raw,
            crate::curve::NEBULA_STRETCH_BASE,
            crate::curve::NEBULA_STRETCH_FLOOR_RATIO,
        )
    }

    /// Nebula black point after the quadratic fine-control mapping.
    #[must_use]
    pub fn nebula_black_point(&self) -> f64 {
        crate::curve::quadratic_fine(self.nebula_black_point_raw, Self::NEBULA_BLACK_POINT_MAX)
    }

    fn field_mut(&mut self, slider: CoreBlendSlider) -> &mut f64 {
        match slider {
            CoreBlendSlider::CoreStretch => &mut self.core_stretch,
            CoreBlendSlider::CoreBlackPoint => &mut self.core_black_point,
            CoreBlendSlider::CoreSaturation => &mut self.core_saturation,
            CoreBlendSlider::NebulaStretchRaw => &mut self.nebula_stretch_raw,
            CoreBlendSlider::NebulaBlackPointRaw => &mut self.nebula_black_point_raw,
            CoreBlendSlider::FeatherRadius => &mut self.feather_radius,
        }
    }
}

impl Default for CoreBlendParams {
    fn default() -> Self {
        Self {
            core_stretch: Self::DEFAULT_CORE_STRETCH,
            core_black_point: Self::DEFAULT_CORE_BLACK_POINT,
            core_saturation: Self::DEFAULT_CORE_SATURATION,
            nebula_stretch_raw: Self::DEFAULT_NEBULA_STRETCH_RAW,
            nebula_black_point_raw: Self::DEFAULT_NEBULA_BLACK_POINT_RAW,
            feather_radius: Self::DEFAULT_FEATHER_RADIUS,
        }
    }
}

/// Serde proxy so deserialized values pass through the same clamp as
/// the setters. Mirrors the field layout of [`CoreBlendParams`].
#[derive(Deserialize)]
struct CoreBlendParamsProxy {
    core_stretch: f64,
    core_black_point: f64,
    core_saturation: f64,
    nebula_stretch_raw: f64,
    nebula_black_point_raw: f64,
    feather_radius: f64,
}

impl<'de> Deserialize<'de> for CoreBlendParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = CoreBlendParamsProxy::deserialize(deserializer)?;
        Ok(Self::from_values(
            proxy.core_stretch,
            proxy.core_black_point,
            proxy.core_saturation,
            proxy.nebula_stretch_raw,
            proxy.nebula_black_point_raw,
            proxy.feather_radius,
        ))
    }
}

/// Slider identifiers for the starmask recombine workflow, in UI order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarRecombineSlider {
    /// Asinh stretch strength for the starmask.
    AsinhStretch,
    /// Black point for the asinh stretch.
    BlackPoint,
    /// Midtone balance for the follow-up midtone stretch.
    Midtones,
    /// Star color saturation.
    Saturation,
    /// Gaussian radius softening the processed stars.
    BlurRadius,
}

/// Parameters for the starmask recombine workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarRecombineParams {
    asinh_stretch: f64,
    black_point: f64,
    midtones: f64,
    saturation: f64,
    blur_radius: f64,
}

impl StarRecombineParams {
    /// Default asinh stretch strength.
    pub const DEFAULT_ASINH_STRETCH: f64 = 20.0;
    /// Default black point.
    pub const DEFAULT_BLACK_POINT: f64 = 0.0;
    /// Default midtone balance.
    pub const DEFAULT_MIDTONES: f64 = 0.5;
    /// Default star saturation.
    pub const DEFAULT_SATURATION: f64 = 1.0;
    /// Default star blur radius.
    pub const DEFAULT_BLUR_RADIUS: f64 = 0.5;

    /// The slider catalog in UI order.
    pub const SLIDERS: [StarRecombineSlider; 5] = [
        StarRecombineSlider::AsinhStretch,
        StarRecombineSlider::BlackPoint,
        StarRecombineSlider::Midtones,
        StarRecombineSlider::Saturation,
        StarRecombineSlider::BlurRadius,
    ];

    /// Range, default, and display precision for a slider.
    #[must_use]
    pub const fn spec(slider: StarRecombineSlider) -> SliderSpec {
        match slider {
            StarRecombineSlider::AsinhStretch => SliderSpec {
                min: 1.0,
                max: 1000.0,
                default: Self::DEFAULT_ASINH_STRETCH,
                decimals: 1,
            },
            StarRecombineSlider::BlackPoint => SliderSpec {
                min: 0.0,
                max: 0.1,
                default: Self::DEFAULT_BLACK_POINT,
                decimals: 4,
            },
            StarRecombineSlider::Midtones => SliderSpec {
                min: 0.001,
                max: 0.999,
                default: Self::DEFAULT_MIDTONES,
                decimals: 3,
            },
            StarRecombineSlider::Saturation => SliderSpec {
                min: 0.0,
                max: 5.0,
                default: Self::DEFAULT_SATURATION,
                decimals: 2,
            },
            StarRecombineSlider::BlurRadius => SliderSpec {
                min: 0.0,
                max: 5.0,
                default: Self::DEFAULT_BLUR_RADIUS,
                decimals: 2,
            },
        }
    }

    /// Build a parameter set from raw values, clamping each to range.
    #[must_use]
    pub fn from_values(
        asinh_stretch: f64,
        black_point: f64,
        midtones: f64,
        saturation: f64,
        blur_radius: f64,
    ) -> Self {
        let mut params = Self::default();
        params.set(StarRecombineSlider::AsinhStretch, asinh_stretch);
        params.set(StarRecombineSlider::BlackPoint, black_point);
        params.set(StarRecombineSlider::Midtones, midtones);
        params.set(StarRecombineSlider::Saturation, saturation);
        params.set(StarRecombineSlider::BlurRadius, blur_radius);
        params
    }

    /// Set a slider value, clamped to its declared range.
    pub fn set(&mut self, slider: StarRecombineSlider, value: f64) {
        let clamped = Self::spec(slider).clamp(value);
        *self.field_mut(slider) = clamped;
    }

    /// Current value of a slider.
    #[must_use]
    pub const fn get(&self, slider: StarRecombineSlider) -> f64 {
        match slider {
            StarRecombineSlider::AsinhStretch => self.asinh_stretch,
            StarRecombineSlider::BlackPoint => self.black_point,
            StarRecombineSlider::Midtones => self.midtones,
            StarRecombineSlider::Saturation => self.saturation,
            StarRecombineSlider::BlurRadius => self.blur_radius,
        }
    }

    /// Restore every slider to its default value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Asinh stretch strength for the starmask.
    #[must_use]
    pub const fn asinh_stretch(&self) -> f64 {
        self.asinh_stretch
    }

    /// Black point for the asinh stretch.
    #[must_use]
    pub const fn black_point(&self) -> f64 {
        self.black_point
    }

    /// Midtone balance for the follow-up midtone stretch.
    #[must_use]
    pub const fn midtones(&self) -> f64 {
        self.midtones
    }

    /// Star color saturation.
    #[must_use]
    pub const fn saturation(&self) -> f64 {
        self.saturation
    }

    /// Gaussian radius softening the processed stars.
    #[must_use]
    pub const fn blur_radius(&self) -> f64 {
        self.blur_radius
    }

    fn field_mut(&mut self, slider: StarRecombineSlider) -> &mut f64 {
        match slider {
            StarRecombineSlider::AsinhStretch => &mut self.asinh_stretch,
            StarRecombineSlider::BlackPoint => &mut self.black_point,
            StarRecombineSlider::Midtones => &mut self.midtones,
            StarRecombineSlider::Saturation => &mut self.saturation,
            StarRecombineSlider::BlurRadius => &mut self.blur_radius,
        }
    }
}

impl Default for StarRecombineParams {
    fn default() -> Self {
        Self {
            asinh_stretch: Self::DEFAULT_ASINH_STRETCH,
            black_point: Self::DEFAULT_BLACK_POINT,
            midtones: Self::DEFAULT_MIDTONES,
            saturation: Self::DEFAULT_SATURATION,
            blur_radius: Self::DEFAULT_BLUR_RADIUS,
        }
    }
}

/// Serde proxy mirroring [`StarRecombineParams`]; see
/// [`CoreBlendParamsProxy`] for why deserialization is routed through
/// the clamping constructor.
#[derive(Deserialize)]
struct StarRecombineParamsProxy {
    asinh_stretch: f64,
    black_point: f64,
    midtones: f64,
    saturation: f64,
    blur_radius: f64,
}

impl<'de> Deserialize<'de> for StarRecombineParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = StarRecombineParamsProxy::deserialize(deserializer)?;
        Ok(Self::from_values(
            proxy.asinh_stretch,
            proxy.black_point,
            proxy.midtones,
            proxy.saturation,
            proxy.blur_radius,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn core_blend_defaults() {
        let params = CoreBlendParams::default();
        assert!((params.core_stretch() - 10.0).abs() < EPSILON);
        assert!(params.core_black_point().abs() < EPSILON);
        assert!((params.core_saturation() - 1.0).abs() < EPSILON);
        assert!((params.nebula_stretch_raw() - 30.0).abs() < EPSILON);
        assert!(params.nebula_black_point_raw().abs() < EPSILON);
        assert!((params.feather_radius() - 15.0).abs() < EPSILON);
    }

    #[test]
    fn set_clamps_to_range() {
        let mut params = CoreBlendParams::default();
        params.set(CoreBlendSlider::CoreStretch, 5000.0);
        assert!((params.core_stretch() - 1000.0).abs() < EPSILON);
        params.set(CoreBlendSlider::CoreStretch, -3.0);
        assert!((params.core_stretch() - 1.0).abs() < EPSILON);
        params.set(CoreBlendSlider::FeatherRadius, 0.0);
        assert!((params.feather_radius() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn from_values_clamps_every_field() {
        let params = CoreBlendParams::from_values(0.0, 9.9, -1.0, 250.0, -5.0, 999.0);
        assert!((params.core_stretch() - 1.0).abs() < EPSILON);
        assert!((params.core_black_point() - 0.05).abs() < EPSILON);
        assert!(params.core_saturation().abs() < EPSILON);
        assert!((params.nebula_stretch_raw() - 100.0).abs() < EPSILON);
        assert!(params.nebula_black_point_raw().abs() < EPSILON);
        assert!((params.feather_radius() - 200.0).abs() < EPSILON);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut params = CoreBlendParams::default();
        params.set(CoreBlendSlider::CoreSaturation, 3.0);
        params.set(CoreBlendSlider::NebulaStretchRaw, 80.0);
        params.reset();
        assert_eq!(params, CoreBlendParams::default());
    }

    #[test]
    fn mapped_nebula_values_use_the_curves() {
        let mut params = CoreBlendParams::default();
        params.set(CoreBlendSlider::NebulaBlackPointRaw, 100.0);
        assert!((params.nebula_black_point() - 0.05).abs() < EPSILON);
        params.set(CoreBlendSlider::NebulaStretchRaw, 0.0);
        assert!((params.nebula_stretch() - 0.5).abs() < EPSILON);
        params.set(CoreBlendSlider::NebulaStretchRaw, 100.0);
        assert!((params.nebula_stretch() - 0.0001).abs() < EPSILON);
    }

    #[test]
    fn star_recombine_defaults_and_clamp() {
        let mut params = StarRecombineParams::default();
        assert!((params.asinh_stretch() - 20.0).abs() < EPSILON);
        assert!((params.midtones() - 0.5).abs() < EPSILON);
        params.set(StarRecombineSlider::Midtones, 2.0);
        assert!((params.midtones() - 0.999).abs() < EPSILON);
        params.set(StarRecombineSlider::Midtones, 0.0);
        assert!((params.midtones() - 0.001).abs() < EPSILON);
    }

    #[test]
    fn spec_ranges_cover_defaults() {
        for slider in CoreBlendParams::SLIDERS {
            let spec = CoreBlendParams::spec(slider);
            assert!(
                spec.default >= spec.min && spec.default <= spec.max,
                "default out of range for {slider:?}",
            );
        }
        for slider in StarRecombineParams::SLIDERS {
            let spec = StarRecombineParams::spec(slider);
            assert!(
                spec.default >= spec.min && spec.default <= spec.max,
                "default out of range for {slider:?}",
            );
        }
    }

    #[test]
    fn deserialization_clamps_out_of_range_values() {
        let json = r#"{
            "core_stretch": 99999.0,
            "core_black_point": -1.0,
            "core_saturation": 1.0,
            "nebula_stretch_raw": 30.0,
            "nebula_black_point_raw": 101.0,
            "feather_radius": 15.0
        }"#;
        let params: CoreBlendParams = serde_json::from_str(json).unwrap();
        assert!((params.core_stretch() - 1000.0).abs() < EPSILON);
        assert!(params.core_black_point().abs() < EPSILON);
        assert!((params.nebula_black_point_raw() - 100.0).abs() < EPSILON);
    }

    #[test]
    fn serde_round_trip() {
        let params = CoreBlendParams::from_values(42.0, 0.01, 2.0, 55.0, 12.0, 30.0);
        let json = serde_json::to_string(&params).unwrap();
        let back: CoreBlendParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);

        let params = StarRecombineParams::from_values(100.0, 0.05, 0.25, 2.5, 1.5);
        let json = serde_json::to_string(&params).unwrap();
        let back: StarRecombineParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }
}

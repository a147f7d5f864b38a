//! Workflow strategies: translating a parameter set and session into
//! an ordered pipeline.
//!
//! Two workflows exist. The core/nebula blend stretches one linear
//! source two different ways and feathers between them; the starmask
//! recombine screens a processed starmask over an already-prepared
//! starless base. Both share the operation model, session handling,
//! and execution machinery — only the parameter curves and operation
//! sequence differ, which is what the [`Workflow`] trait captures.
//!
//! Builders never mutate state. The operation order within a plan is
//! fixed: each stage explicitly reloads the named artifact it needs
//! rather than trusting the engine's implicit loaded-image slot, and
//! every plan is checked with
//! [`Pipeline::verify_ordering`](crate::op::Pipeline::verify_ordering)
//! before it is returned.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::blend;
use crate::op::{Operation, OrderingViolation, Pipeline};
use crate::params::{CoreBlendParams, StarRecombineParams};
use crate::session::{SessionState, SourceSlot};

/// JPEG quality for preview exports and web saves.
pub const PREVIEW_QUALITY: u8 = 95;

/// JPEG quality for the one-time starless baseline export.
pub const BASELINE_QUALITY: u8 = 100;

/// Fixed artifact names of the core/nebula blend workflow.
pub mod core_blend {
    /// Midtone-stretched nebula rendition (layer A).
    pub const NEBULA_LAYER: &str = "a.fits";
    /// Asinh-stretched core rendition (layer B).
    pub const CORE_LAYER: &str = "b.fits";
    /// Feathered blend mask derived from the core layer.
    pub const BLEND_MASK: &str = "mask.fits";
    /// Preview export of the composite.
    pub const PREVIEW_BLEND: &str = "_p_blend";
    /// Preview export of the nebula layer.
    pub const PREVIEW_NEBULA: &str = "_p_neb";
    /// Preview export of the core layer.
    pub const PREVIEW_CORE: &str = "_p_core";
    /// Preview export of the blend mask.
    pub const PREVIEW_MASK: &str = "_p_mask";
    /// Native-format final export, written next to the source.
    pub const NATIVE_EXPORT: &str = "HDR_Rescued.fits";
    /// Web-format final export, written next to the source.
    pub const WEB_EXPORT: &str = "HDR_Rescued.jpg";
}

/// Fixed artifact names of the starmask recombine workflow.
pub mod star_recombine {
    /// Stretched, saturated, blurred starmask.
    pub const PROCESSED_STARMASK: &str = "b.fits";
    /// Preview export of the recombined composite.
    pub const PREVIEW: &str = "_preview";
    /// One-time baseline export of the untouched starless base.
    pub const BASELINE: &str = "_base_starless";
    /// Native-format final export, written next to the starless source.
    pub const NATIVE_EXPORT: &str = "recombined_final.fits";
    /// Web-format final export, written next to the starless source.
    pub const WEB_EXPORT: &str = "recombined_web.jpg";
}

/// What a pipeline run is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Diagnostic JPEG exports into the working directory.
    Preview,
    /// Single lossless export next to the original source.
    SaveNative,
    /// Single JPEG export next to the original source.
    SaveWeb,
}

/// Why no pipeline could be planned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// A required source image has not been imported yet.
    #[error("no {} has been loaded", .slot.label())]
    MissingSource {
        /// The empty slot.
        slot: SourceSlot,
    },
    /// The assembled plan broke the explicit-reload discipline.
    /// Indicates a builder bug, not an operator mistake.
    #[error(transparent)]
    Ordering(#[from] OrderingViolation),
}

/// A workflow strategy: parameters plus the operation sequence they
/// drive.
pub trait Workflow {
    /// Source slots that must be imported before planning succeeds.
    fn required_sources(&self) -> &'static [SourceSlot];

    /// Working-directory preview files this workflow produces, in the
    /// order the view inspector offers them.
    fn preview_artifacts(&self) -> &'static [&'static str];

    /// Translate the current parameters and session into an ordered
    /// pipeline.
    ///
    /// # Errors
    ///
    /// [`PlanError::MissingSource`] when a required source slot is
    /// empty; no operations are emitted in that case.
    fn plan(&self, session: &SessionState, mode: RenderMode) -> Result<Pipeline, PlanError>;
}

/// Check every required slot and return the first missing one.
fn require_sources(
    session: &SessionState,
    slots: &'static [SourceSlot],
) -> Result<(), PlanError> {
    for &slot in slots {
        if session.source(slot).is_none() {
            return Err(PlanError::MissingSource { slot });
        }
    }
    Ok(())
}

/// Render an export path next to the given source directory.
fn export_target(source_dir: Option<&Path>, filename: &str) -> String {
    source_dir
        .unwrap_or_else(|| Path::new("."))
        .join(filename)
        .display()
        .to_string()
}

impl Workflow for CoreBlendParams {
    fn required_sources(&self) -> &'static [SourceSlot] {
        &[SourceSlot::Base]
    }

    fn preview_artifacts(&self) -> &'static [&'static str] {
        &[
            "_p_blend.jpg",
            "_p_core.jpg",
            "_p_neb.jpg",
            "_p_mask.jpg",
        ]
    }

    fn plan(&self, session: &SessionState, mode: RenderMode) -> Result<Pipeline, PlanError> {
        require_sources(session, self.required_sources())?;
        let raw = SourceSlot::Base.canonical_name();

        let mut ops = vec![
            Operation::SetDirectory(session.work_dir().to_path_buf()),
            // Layer B: asinh-stretched, saturated core rendition.
            Operation::Load(raw.to_owned()),
            Operation::StretchAsinh {
                strength: self.core_stretch(),
                black_point: self.core_black_point(),
            },
            Operation::AdjustSaturation {
                amount: self.core_saturation(),
                reference: 1.0,
            },
            Operation::Save(core_blend::CORE_LAYER.to_owned()),
            // Layer A: midtone-stretched nebula rendition, from the
            // raw source again — never from layer B.
            Operation::Load(raw.to_owned()),
            Operation::StretchMidtone {
                black_point: self.nebula_black_point(),
                midtone: self.nebula_stretch(),
                white_point: 1.0,
            },
            Operation::Save(core_blend::NEBULA_LAYER.to_owned()),
            // Blend mask: the core layer, feathered.
            Operation::Load(core_blend::CORE_LAYER.to_owned()),
            Operation::BlurGaussian {
                radius: self.feather_radius(),
            },
            Operation::Save(core_blend::BLEND_MASK.to_owned()),
            // Composite over the nebula layer.
            Operation::Load(core_blend::NEBULA_LAYER.to_owned()),
            Operation::Composite(blend::mask_weighted_expression(
                core_blend::NEBULA_LAYER,
                core_blend::CORE_LAYER,
                core_blend::BLEND_MASK,
            )),
        ];

        match mode {
            RenderMode::Preview => {
                ops.extend([
                    Operation::SaveJpeg {
                        filename: core_blend::PREVIEW_BLEND.to_owned(),
                        quality: PREVIEW_QUALITY,
                    },
                    Operation::Load(core_blend::NEBULA_LAYER.to_owned()),
                    Operation::SaveJpeg {
                        filename: core_blend::PREVIEW_NEBULA.to_owned(),
                        quality: PREVIEW_QUALITY,
                    },
                    Operation::Load(core_blend::CORE_LAYER.to_owned()),
                    Operation::SaveJpeg {
                        filename: core_blend::PREVIEW_CORE.to_owned(),
                        quality: PREVIEW_QUALITY,
                    },
                    Operation::Load(core_blend::BLEND_MASK.to_owned()),
                    Operation::SaveJpeg {
                        filename: core_blend::PREVIEW_MASK.to_owned(),
                        quality: PREVIEW_QUALITY,
                    },
                ]);
            }
            RenderMode::SaveNative => {
                ops.push(Operation::Save(export_target(
                    session.source_dir(SourceSlot::Base),
                    core_blend::NATIVE_EXPORT,
                )));
            }
            RenderMode::SaveWeb => {
                ops.push(Operation::SaveJpeg {
                    filename: export_target(
                        session.source_dir(SourceSlot::Base),
                        core_blend::WEB_EXPORT,
                    ),
                    quality: PREVIEW_QUALITY,
                });
            }
        }

        let pipeline = Pipeline::new(ops);
        pipeline.verify_ordering(session.imported_names())?;
        Ok(pipeline)
    }
}

impl Workflow for StarRecombineParams {
    fn required_sources(&self) -> &'static [SourceSlot] {
        &[SourceSlot::Starless, SourceSlot::Starmask]
    }

    fn preview_artifacts(&self) -> &'static [&'static str] {
        &["_preview.jpg", "_base_starless.jpg"]
    }

    fn plan(&self, session: &SessionState, mode: RenderMode) -> Result<Pipeline, PlanError> {
        require_sources(session, self.required_sources())?;
        let starless = SourceSlot::Starless.canonical_name();
        let starmask = SourceSlot::Starmask.canonical_name();

        let mut ops = vec![
            Operation::SetDirectory(session.work_dir().to_path_buf()),
            // Process the starmask from its pristine import every run;
            // the starless base is used as imported and never
            // re-stretched here.
            Operation::Load(starmask.to_owned()),
            Operation::StretchAsinh {
                strength: self.asinh_stretch(),
                black_point: self.black_point(),
            },
            Operation::StretchMidtone {
                black_point: 0.0,
                midtone: self.midtones(),
                white_point: 1.0,
            },
            Operation::AdjustSaturation {
                amount: self.saturation(),
                reference: 1.0,
            },
            Operation::BlurGaussian {
                radius: self.blur_radius(),
            },
            Operation::Save(star_recombine::PROCESSED_STARMASK.to_owned()),
            Operation::Load(starless.to_owned()),
            Operation::Composite(blend::screen_expression(
                star_recombine::PROCESSED_STARMASK,
                starless,
            )),
        ];

        match mode {
            RenderMode::Preview => {
                ops.push(Operation::SaveJpeg {
                    filename: star_recombine::PREVIEW.to_owned(),
                    quality: PREVIEW_QUALITY,
                });
            }
            RenderMode::SaveNative => {
                ops.push(Operation::Save(export_target(
                    session.source_dir(SourceSlot::Starless),
                    star_recombine::NATIVE_EXPORT,
                )));
            }
            RenderMode::SaveWeb => {
                ops.push(Operation::SaveJpeg {
                    filename: export_target(
                        session.source_dir(SourceSlot::Starless),
                        star_recombine::WEB_EXPORT,
                    ),
                    quality: PREVIEW_QUALITY,
                });
            }
        }

        let pipeline = Pipeline::new(ops);
        pipeline.verify_ordering(session.imported_names())?;
        Ok(pipeline)
    }
}

/// One-time baseline preview of the starless base, planned when the
/// starless source is imported (not on every run). Backs the
/// hold-to-compare view.
///
/// # Errors
///
/// [`PlanError::MissingSource`] when the starless slot is empty.
pub fn baseline_preview_plan(session: &SessionState) -> Result<Pipeline, PlanError> {
    require_sources(session, &[SourceSlot::Starless])?;
    let pipeline = Pipeline::new(vec![
        Operation::SetDirectory(session.work_dir().to_path_buf()),
        Operation::Load(SourceSlot::Starless.canonical_name().to_owned()),
        Operation::SaveJpeg {
            filename: star_recombine::BASELINE.to_owned(),
            quality: BASELINE_QUALITY,
        },
    ]);
    pipeline.verify_ordering(session.imported_names())?;
    Ok(pipeline)
}

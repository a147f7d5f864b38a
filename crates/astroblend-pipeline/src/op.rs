//! Atomic engine operations and the ordered pipelines built from them.
//!
//! The external image-processing engine is stateful: it has a current
//! working directory and a single implicit "loaded image" slot, and it
//! executes one textual command at a time. An [`Operation`] is the
//! typed form of one such command; a [`Pipeline`] is a strictly linear
//! sequence of them, re-derived from scratch on every run.
//!
//! [`Pipeline::verify_ordering`] enforces the stale-data rule: every
//! transform works on an explicitly loaded artifact, and every load
//! names either an imported source or an artifact saved earlier in the
//! same pipeline. Relying on whatever the engine happens to have
//! loaded is how a stage ends up reading a file written before an
//! unrelated parameter change.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One atomic engine instruction.
///
/// Filenames are working-directory artifact names unless the operation
/// is a final export, in which case they are full paths next to the
/// original source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Change the engine's working directory.
    SetDirectory(PathBuf),
    /// Load a file into the engine's implicit image slot.
    Load(String),
    /// Asinh stretch of the loaded image.
    StretchAsinh {
        /// Stretch strength factor.
        strength: f64,
        /// Input level mapped to output zero.
        black_point: f64,
    },
    /// Midtone transfer function stretch of the loaded image.
    StretchMidtone {
        /// Input level mapped to output zero.
        black_point: f64,
        /// Midtone balance point.
        midtone: f64,
        /// Input level mapped to output one.
        white_point: f64,
    },
    /// Saturation adjustment of the loaded image.
    AdjustSaturation {
        /// Saturation multiplier.
        amount: f64,
        /// Background reference factor.
        reference: f64,
    },
    /// Gaussian blur of the loaded image.
    BlurGaussian {
        /// Blur radius in pixels.
        radius: f64,
    },
    /// Save the loaded image in the engine's native format.
    Save(String),
    /// Save the loaded image as a JPEG at the given quality.
    SaveJpeg {
        /// Target filename (the engine appends `.jpg` when the name
        /// has no extension).
        filename: String,
        /// JPEG quality factor, 0-100.
        quality: u8,
    },
    /// Pixel-math composite. The expression references artifact files
    /// as `$name$` operands, each treated as a normalized [0,1] array,
    /// and its result replaces the loaded image.
    Composite(String),
}

impl Operation {
    /// Render this operation as the engine's textual command.
    #[must_use]
    pub fn to_command(&self) -> String {
        match self {
            Self::SetDirectory(path) => format!("cd \"{}\"", path.display()),
            Self::Load(name) => format!("load {name}"),
            Self::StretchAsinh {
                strength,
                black_point,
            } => format!(
                "asinh {} {}",
                fmt_float(*strength),
                fmt_float(*black_point),
            ),
            // The black point and midtone come out of the sensitivity
            // curves with many significant digits; seven decimals is
            // what the engine's parser is fed.
            Self::StretchMidtone {
                black_point,
                midtone,
                white_point,
            } => format!("mtf {black_point:.7} {midtone:.7} {}", fmt_float(*white_point)),
            Self::AdjustSaturation { amount, reference } => {
                format!("satu {} {}", fmt_float(*amount), fmt_float(*reference))
            }
            Self::BlurGaussian { radius } => format!("gauss {}", fmt_float(*radius)),
            Self::Save(name) => format!("save \"{name}\""),
            Self::SaveJpeg { filename, quality } => {
                format!("savejpg \"{filename}\" {quality}")
            }
            Self::Composite(expression) => format!("pm \"{expression}\""),
        }
    }

    /// Whether this operation requires an image in the engine's
    /// implicit loaded slot.
    #[must_use]
    pub const fn requires_loaded_image(&self) -> bool {
        !matches!(self, Self::SetDirectory(_) | Self::Load(_))
    }
}

/// Format a float the way the engine's command parser expects: whole
/// numbers keep one trailing decimal (`15` renders as `15.0`).
fn fmt_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// A fully ordered, branch-free sequence of operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline(Vec<Operation>);

impl Pipeline {
    /// Create a pipeline from an ordered operation list.
    #[must_use]
    pub const fn new(operations: Vec<Operation>) -> Self {
        Self(operations)
    }

    /// The operations in execution order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.0
    }

    /// Number of operations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the pipeline has no operations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render every operation as its textual engine command.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.0.iter().map(Operation::to_command).collect()
    }

    /// Names of working-directory artifacts this pipeline writes, in
    /// write order. Final exports (names carrying a path separator)
    /// are excluded; JPEG saves gain the `.jpg` extension the engine
    /// appends.
    #[must_use]
    pub fn workdir_artifacts(&self) -> Vec<String> {
        self.0
            .iter()
            .filter_map(|op| match op {
                Operation::Save(name) if !has_path_separator(name) => Some(name.clone()),
                Operation::SaveJpeg { filename, .. } if !has_path_separator(filename) => {
                    Some(jpeg_artifact_name(filename))
                }
                _ => None,
            })
            .collect()
    }

    /// Check the explicit-reload discipline.
    ///
    /// `sources` are the artifact names present in the working
    /// directory before the pipeline runs (imported source copies and
    /// artifacts from prior runs are both acceptable seeds — builders
    /// pass only the imported sources so that every intermediate must
    /// be rewritten within the run).
    ///
    /// # Errors
    ///
    /// [`OrderingViolation::NothingLoaded`] when a transform, save, or
    /// composite appears before any load; [`OrderingViolation::UnknownInput`]
    /// when a load or a composite operand names a file that neither
    /// `sources` nor an earlier save provides.
    pub fn verify_ordering<'a, I>(&self, sources: I) -> Result<(), OrderingViolation>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut available: BTreeSet<String> = sources.into_iter().map(str::to_owned).collect();
        let mut loaded = false;

        for (index, op) in self.0.iter().enumerate() {
            if op.requires_loaded_image() && !loaded {
                return Err(OrderingViolation::NothingLoaded {
                    index,
                    command: op.to_command(),
                });
            }
            match op {
                Operation::Load(name) => {
                    if !available.contains(name) {
                        return Err(OrderingViolation::UnknownInput {
                            index,
                            name: name.clone(),
                        });
                    }
                    loaded = true;
                }
                Operation::Save(name) => {
                    available.insert(name.clone());
                }
                Operation::SaveJpeg { filename, .. } => {
                    available.insert(jpeg_artifact_name(filename));
                }
                Operation::Composite(expression) => {
                    for operand in composite_operands(expression) {
                        if !available.contains(operand) {
                            return Err(OrderingViolation::UnknownInput {
                                index,
                                name: operand.to_owned(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// A violation of the explicit-reload ordering discipline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingViolation {
    /// An operation that needs a loaded image appeared before any load.
    #[error("operation {index} (`{command}`) has no loaded image to work on")]
    NothingLoaded {
        /// Position of the offending operation.
        index: usize,
        /// Rendered command, for diagnostics.
        command: String,
    },
    /// A load or composite operand names a file nothing has provided.
    #[error("operation {index} reads `{name}`, which no source or earlier save provides")]
    UnknownInput {
        /// Position of the offending operation.
        index: usize,
        /// The unavailable file name.
        name: String,
    },
}

/// Artifact name a JPEG save produces: the engine appends `.jpg` when
/// the requested name has no extension.
fn jpeg_artifact_name(filename: &str) -> String {
    if filename.contains('.') {
        filename.to_owned()
    } else {
        format!("{filename}.jpg")
    }
}

fn has_path_separator(name: &str) -> bool {
    name.contains('/') || name.contains('\\')
}

/// Iterate the `$name$` operand references in a pixel-math expression.
fn composite_operands(expression: &str) -> impl Iterator<Item = &str> {
    expression
        .split('$')
        .enumerate()
        .filter_map(|(i, piece)| (i % 2 == 1).then_some(piece))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn commands_render_like_the_engine_expects() {
        assert_eq!(
            Operation::SetDirectory(PathBuf::from("/tmp/astroblend")).to_command(),
            "cd \"/tmp/astroblend\"",
        );
        assert_eq!(Operation::Load("raw.fits".into()).to_command(), "load raw.fits");
        assert_eq!(
            Operation::StretchAsinh {
                strength: 10.0,
                black_point: 0.0,
            }
            .to_command(),
            "asinh 10.0 0.0",
        );
        assert_eq!(
            Operation::AdjustSaturation {
                amount: 1.0,
                reference: 1.0,
            }
            .to_command(),
            "satu 1.0 1.0",
        );
        assert_eq!(
            Operation::BlurGaussian { radius: 15.0 }.to_command(),
            "gauss 15.0",
        );
        assert_eq!(Operation::Save("b.fits".into()).to_command(), "save \"b.fits\"");
        assert_eq!(
            Operation::SaveJpeg {
                filename: "_p_blend".into(),
                quality: 95,
            }
            .to_command(),
            "savejpg \"_p_blend\" 95",
        );
    }

    #[test]
    fn midtone_stretch_renders_seven_decimals() {
        let op = Operation::StretchMidtone {
            black_point: 0.012_345_678_9,
            midtone: 0.000_169_096,
            white_point: 1.0,
        };
        assert_eq!(op.to_command(), "mtf 0.0123457 0.0001691 1.0");
    }

    #[test]
    fn composite_renders_quoted_expression() {
        let op = Operation::Composite("1 - (1 - $b.fits$) * (1 - $a.fits$)".into());
        assert_eq!(op.to_command(), "pm \"1 - (1 - $b.fits$) * (1 - $a.fits$)\"");
    }

    #[test]
    fn workdir_artifacts_skip_exports_and_extend_jpegs() {
        let pipeline = Pipeline::new(vec![
            Operation::Load("raw.fits".into()),
            Operation::Save("b.fits".into()),
            Operation::SaveJpeg {
                filename: "_p_blend".into(),
                quality: 95,
            },
            Operation::Save("/home/user/HDR_Rescued.fits".into()),
        ]);
        assert_eq!(
            pipeline.workdir_artifacts(),
            vec!["b.fits".to_owned(), "_p_blend.jpg".to_owned()],
        );
    }

    #[test]
    fn verify_rejects_transform_before_load() {
        let pipeline = Pipeline::new(vec![
            Operation::SetDirectory(PathBuf::from("/tmp/w")),
            Operation::BlurGaussian { radius: 2.0 },
        ]);
        let err = pipeline.verify_ordering(["raw.fits"]).unwrap_err();
        assert!(matches!(err, OrderingViolation::NothingLoaded { index: 1, .. }));
    }

    #[test]
    fn verify_rejects_load_of_unwritten_artifact() {
        let pipeline = Pipeline::new(vec![
            Operation::Load("raw.fits".into()),
            Operation::Load("mask.fits".into()),
        ]);
        let err = pipeline.verify_ordering(["raw.fits"]).unwrap_err();
        assert_eq!(
            err,
            OrderingViolation::UnknownInput {
                index: 1,
                name: "mask.fits".into(),
            },
        );
    }

    #[test]
    fn verify_rejects_composite_operand_never_saved() {
        let pipeline = Pipeline::new(vec![
            Operation::Load("raw.fits".into()),
            Operation::Composite("$a.fits$ * $mask.fits$".into()),
        ]);
        let err = pipeline.verify_ordering(["raw.fits"]).unwrap_err();
        assert!(matches!(err, OrderingViolation::UnknownInput { index: 1, ref name } if name == "a.fits"));
    }

    #[test]
    fn verify_accepts_save_then_reload() {
        let pipeline = Pipeline::new(vec![
            Operation::Load("raw.fits".into()),
            Operation::BlurGaussian { radius: 2.0 },
            Operation::Save("mask.fits".into()),
            Operation::Load("mask.fits".into()),
            Operation::Composite("$mask.fits$ * 0.5".into()),
        ]);
        assert!(pipeline.verify_ordering(["raw.fits"]).is_ok());
    }
}

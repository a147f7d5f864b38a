//! astroblend-pipeline: Pure pipeline planning (sans-IO).
//!
//! Translates tunable stretch/blend parameters into ordered sequences
//! of engine operations:
//! slider values -> sensitivity curves -> workflow plan -> textual
//! engine commands.
//!
//! This crate has **no I/O dependencies** -- it never touches the
//! filesystem or a process. Engine execution lives in
//! `astroblend-engine`, and the debounced control loop in
//! `astroblend-control`.

pub mod blend;
pub mod curve;
pub mod op;
pub mod params;
pub mod session;
pub mod workflow;

pub use op::{Operation, OrderingViolation, Pipeline};
pub use params::{CoreBlendParams, CoreBlendSlider, StarRecombineParams, StarRecombineSlider};
pub use session::{SessionState, SourceSlot};
pub use workflow::{PlanError, RenderMode, Workflow};

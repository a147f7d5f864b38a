//! astroblend-control: The debounced interactive control loop.
//!
//! Sits between a UI (or any other event source) and the engine:
//! parameter changes arrive through [`Controller::update`], the
//! [`Debouncer`] coalesces bursts of them, and once input has been
//! quiet for the full window the controller plans and runs one
//! preview pipeline from the latest parameter snapshot.
//!
//! Time is injected through the [`Clock`] trait so the whole loop is
//! testable without sleeping.

pub mod clock;
pub mod controller;
pub mod debounce;

use std::io;
use std::path::PathBuf;

pub use clock::{Clock, StdClock};
pub use controller::{Controller, RunOutcome};
pub use debounce::{Debouncer, QUIESCENCE_WINDOW};

/// Create (if needed) and return a working directory under the system
/// temp directory.
///
/// The directory is process-wide and reused across runs; artifacts in
/// it are overwritten in place.
///
/// # Errors
///
/// Any filesystem error from creating the directory.
pub fn workdir_in_temp(name: &str) -> io::Result<PathBuf> {
    let dir = std::env::temp_dir().join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

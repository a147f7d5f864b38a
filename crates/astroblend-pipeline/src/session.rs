//! Session state: source images, the working directory, and the
//! artifacts known to exist in it.
//!
//! The working directory is process-wide: created once, reused for
//! every run, overwritten in place (no versioning). Artifact files in
//! it carry fixed names per workflow — never dynamic ones — so the
//! preview layer and every pipeline stage agree on exactly which file
//! each name refers to.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The source-image slots a workflow can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceSlot {
    /// The single linear source of the core/nebula blend workflow.
    Base,
    /// The starless nebula base of the recombine workflow.
    Starless,
    /// The linear starmask of the recombine workflow.
    Starmask,
}

impl SourceSlot {
    /// Fixed name the imported copy takes inside the working directory.
    #[must_use]
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::Base => "raw.fits",
            Self::Starless => "a.fits",
            Self::Starmask => "b_orig.fits",
        }
    }

    /// Human-readable slot label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Base => "linear source",
            Self::Starless => "starless nebula",
            Self::Starmask => "linear starmask",
        }
    }
}

/// State of one open workflow instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    work_dir: PathBuf,
    sources: BTreeMap<SourceSlot, PathBuf>,
    artifacts: BTreeSet<String>,
}

impl SessionState {
    /// Create a session rooted at the given working directory.
    #[must_use]
    pub const fn new(work_dir: PathBuf) -> Self {
        Self {
            work_dir,
            sources: BTreeMap::new(),
            artifacts: BTreeSet::new(),
        }
    }

    /// The working directory all artifact names are relative to.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Record that a source image has been imported into its slot.
    ///
    /// `original_path` is the file the user picked; the imported copy
    /// lives in the working directory under
    /// [`SourceSlot::canonical_name`]. Re-registering a slot replaces
    /// the previous source.
    pub fn register_source(&mut self, slot: SourceSlot, original_path: PathBuf) {
        self.sources.insert(slot, original_path);
    }

    /// Original path of a registered source, if any.
    #[must_use]
    pub fn source(&self, slot: SourceSlot) -> Option<&Path> {
        self.sources.get(&slot).map(PathBuf::as_path)
    }

    /// Directory of a registered source. Final exports are written
    /// here, next to the original file.
    #[must_use]
    pub fn source_dir(&self, slot: SourceSlot) -> Option<&Path> {
        self.source(slot).and_then(Path::parent)
    }

    /// Canonical working-directory names of every registered source,
    /// the seed set for [`Pipeline::verify_ordering`].
    ///
    /// [`Pipeline::verify_ordering`]: crate::op::Pipeline::verify_ordering
    pub fn imported_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sources.keys().map(|slot| slot.canonical_name())
    }

    /// Record artifacts written by a successful pipeline run.
    pub fn mark_artifacts<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.artifacts.extend(names);
    }

    /// Whether an artifact of this name was produced by a prior run
    /// (or source import).
    #[must_use]
    pub fn has_artifact(&self, name: &str) -> bool {
        self.artifacts.contains(name)
    }

    /// All artifact names known to exist in the working directory.
    #[must_use]
    pub const fn artifacts(&self) -> &BTreeSet<String> {
        &self.artifacts
    }

    /// Absolute path of a working-directory artifact.
    #[must_use]
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }
}

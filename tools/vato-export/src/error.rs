//! Errors raised by the export layer itself

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// A material has no texture hint or name match and the policy forbids guessing
    #[error("material {material:?} has no matching texture among {candidates} candidates")]
    AmbiguousTexture { material: String, candidates: usize },

    /// The target exists and the overwrite policy declined it
    #[error("output already exists: {}", path.display())]
    OutputExists { path: PathBuf },

    /// No skeleton model was found for an animation
    #[error("no skeleton model found for {}", motion.display())]
    MissingSkeleton { motion: PathBuf },
}

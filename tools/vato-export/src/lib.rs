//! vato-export library
//!
//! Converts Valkyrie Anatomia assets into open formats: IMDL models and IMTN
//! motions to glTF/GLB, GLTP texture archives to PNG, PCK packages to their
//! member files. Used by the `vato-export` binary and its integration tests.

pub mod animation;
pub mod batch;
pub mod config;
pub mod error;
pub mod materials;
pub mod model;
pub mod output;
pub mod package;
pub mod prompt;
pub mod raw;
pub mod texture;

pub use animation::{ConvertedAnimation, Skeleton, convert_animation, find_skeleton};
pub use batch::{AssetKind, BatchReport, Exporter};
pub use config::{ExportConfig, OverwritePolicy, TexturePolicy};
pub use error::ExportError;
pub use model::{ConvertedModel, convert_model};
pub use output::{OutputFile, OutputSet};
pub use prompt::{LinePrompt, NonInteractive, Prompt};

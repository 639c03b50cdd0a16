//! Per-file dispatch and directory batch conversion

use crate::animation::{Skeleton, export_animation, find_skeleton};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::model::export_model;
use crate::output::OutputSet;
use crate::package::export_package;
use crate::prompt::Prompt;
use crate::texture::export_textures;
use anyhow::{Context, Result};
use hashbrown::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Input file kinds, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Package,
    Texture,
    Model,
    Motion,
}

impl AssetKind {
    /// Batch order: packages first so their members are found by later passes
    pub const BATCH_ORDER: [AssetKind; 4] = [
        AssetKind::Package,
        AssetKind::Texture,
        AssetKind::Model,
        AssetKind::Motion,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Package => "pck",
            AssetKind::Texture => "txp",
            AssetKind::Model => "mdl",
            AssetKind::Motion => "mtn",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::BATCH_ORDER
            .into_iter()
            .find(|kind| kind.extension() == extension)
    }
}

/// Outcome of a directory run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub converted: usize,
    /// Inputs whose outputs already existed and were kept
    pub skipped: usize,
    pub files_written: usize,
    /// Failed inputs with their error chain
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Converts files according to one configuration
pub struct Exporter<'a> {
    config: &'a ExportConfig,
    prompt: &'a mut dyn Prompt,
    skeletons: HashMap<PathBuf, Skeleton>,
}

impl<'a> Exporter<'a> {
    pub fn new(config: &'a ExportConfig, prompt: &'a mut dyn Prompt) -> Self {
        Self {
            config,
            prompt,
            skeletons: HashMap::new(),
        }
    }

    /// Convert one file, inferring its kind from the extension
    pub fn export_file(&mut self, path: &Path) -> Result<usize> {
        let kind = AssetKind::from_path(path)
            .with_context(|| format!("Unrecognized input: {}", path.display()))?;
        self.export(kind, path)
    }

    /// Convert one file as `kind` and write its outputs
    ///
    /// Returns the number of files written.
    pub fn export(&mut self, kind: AssetKind, path: &Path) -> Result<usize> {
        let config = self.config;
        let data =
            std::fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?
            .to_string();
        let dir = config.output_dir_for(path);
        tracing::info!("Converting {:?} -> {:?}", path, dir);

        let outputs = match kind {
            AssetKind::Package => export_package(&data, &stem, &dir)?,
            AssetKind::Texture => {
                let export = export_textures(&data, &dir)?;
                if export.skipped > 0 {
                    tracing::warn!(
                        "{}: {} texture(s) skipped",
                        path.display(),
                        export.skipped
                    );
                }
                export.outputs
            }
            AssetKind::Model => export_model(&data, &stem, &dir, config, &mut *self.prompt)?,
            AssetKind::Motion => {
                let skeleton = self.skeleton_for(path)?;
                export_animation(&data, &stem, skeleton, &dir, config)?
            }
        };
        self.write(outputs)
    }

    fn write(&mut self, outputs: OutputSet) -> Result<usize> {
        outputs.write(self.config.output.overwrite, &mut *self.prompt)
    }

    fn skeleton_for(&mut self, motion: &Path) -> Result<&Skeleton> {
        let path = find_skeleton(motion, self.config.animation.skeleton.as_deref())?;
        if !self.skeletons.contains_key(&path) {
            let data = std::fs::read(&path)
                .with_context(|| format!("Failed to read skeleton: {}", path.display()))?;
            let skeleton = Skeleton::from_model(&data)
                .with_context(|| format!("Invalid skeleton: {}", path.display()))?;
            tracing::debug!("Loaded skeleton {:?} ({} nodes)", path, skeleton.nodes.len());
            self.skeletons.insert(path.clone(), skeleton);
        }
        self.skeletons
            .get(&path)
            .with_context(|| format!("Skeleton cache miss: {}", path.display()))
    }

    /// Convert every recognized file below `root`
    ///
    /// Each kind is a separate walk in [`AssetKind::BATCH_ORDER`]. A failing
    /// file is logged and counted; the run continues.
    pub fn run_batch(&mut self, root: &Path) -> BatchReport {
        let mut report = BatchReport::default();
        for kind in AssetKind::BATCH_ORDER {
            for path in collect_inputs(root, kind) {
                match self.export(kind, &path) {
                    Ok(written) => {
                        report.converted += 1;
                        report.files_written += written;
                    }
                    Err(err) => match err.downcast_ref::<ExportError>() {
                        Some(ExportError::OutputExists { path: existing }) => {
                            tracing::info!("Skipping {:?}: {:?} exists", path, existing);
                            report.skipped += 1;
                        }
                        _ => {
                            tracing::error!("Failed to convert {:?}: {:#}", path, err);
                            report.failed.push((path, format!("{err:#}")));
                        }
                    },
                }
            }
        }
        tracing::info!(
            "Batch complete: {} converted, {} skipped, {} failed",
            report.converted,
            report.skipped,
            report.failed.len()
        );
        report
    }
}

/// Files of `kind` below `root`, sorted by path
pub fn collect_inputs(root: &Path, kind: AssetKind) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| AssetKind::from_path(path) == Some(kind))
        .collect();
    inputs.sort();
    inputs
}

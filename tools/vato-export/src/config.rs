//! Export configuration (vato-export.toml)
//!
//! Every field has a default, so an empty or missing file is valid. CLI
//! flags are applied on top of the loaded values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vato_formats::DEFAULT_FRAME_RATE;

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub textures: TextureConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

/// What to do when a document target already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OverwritePolicy {
    /// Ask on the prompt
    #[default]
    Ask,
    Always,
    Never,
}

/// How a material without a texture hint or name match picks its texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TexturePolicy {
    /// Ask on the prompt when more than one texture could apply
    #[default]
    AlwaysAsk,
    /// Take the first texture and log a warning
    DefaultFirst,
    /// Fail the file
    FailOnAmbiguous,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: next to each input)
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Write GLB (default) or .gltf + .bin
    #[serde(default = "default_true")]
    pub binary: bool,
    #[serde(default)]
    pub overwrite: OverwritePolicy,
    /// Also write .fmt/.vb/.ib/.vgmap per geometry
    #[serde(default)]
    pub dump_raw_buffers: bool,
}

/// Texture assignment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TextureConfig {
    #[serde(default)]
    pub ambiguous: TexturePolicy,
}

/// Animation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Model providing the skeleton (default: 00_base.mdl, else the first .mdl)
    #[serde(default)]
    pub skeleton: Option<PathBuf>,
    /// Keyframe ticks per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
}

fn default_true() -> bool {
    true
}

fn default_frame_rate() -> f32 {
    DEFAULT_FRAME_RATE
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            binary: true,
            overwrite: OverwritePolicy::default(),
            dump_raw_buffers: false,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            skeleton: None,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

impl ExportConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config TOML")?;
        let rate = config.animation.frame_rate;
        if rate.is_nan() || rate <= 0.0 {
            anyhow::bail!("animation.frame_rate must be positive, got {rate}");
        }
        Ok(config)
    }

    /// Replace every policy that would prompt with its default answer
    pub fn non_interactive(mut self) -> Self {
        if self.output.overwrite == OverwritePolicy::Ask {
            self.output.overwrite = OverwritePolicy::Never;
        }
        if self.textures.ambiguous == TexturePolicy::AlwaysAsk {
            self.textures.ambiguous = TexturePolicy::DefaultFirst;
        }
        self
    }

    /// Directory receiving the outputs of `input`
    pub fn output_dir_for(&self, input: &Path) -> PathBuf {
        match &self.output.dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

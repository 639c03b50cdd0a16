//! Output collection and writing
//!
//! Everything produced from one input is gathered in an [`OutputSet`] first
//! and written in one go, so a file that fails half way leaves nothing behind.

use crate::config::OverwritePolicy;
use crate::error::ExportError;
use crate::prompt::Prompt;
use anyhow::{Context, Result};
use glb_builder::{assemble_glb, json, to_gltf_text};
use std::path::{Path, PathBuf};

/// Make an archive-provided name usable as a single path component
pub fn file_safe(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// One file to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// Files produced from one input
#[derive(Debug, Default)]
pub struct OutputSet {
    files: Vec<OutputFile>,
    /// Targets whose prior existence consults the overwrite policy
    guarded: Vec<PathBuf>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, data: Vec<u8>) {
        self.files.push(OutputFile {
            path: path.into(),
            data,
        });
    }

    pub fn guard(&mut self, path: impl Into<PathBuf>) {
        self.guarded.push(path.into());
    }

    pub fn files(&self) -> &[OutputFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Add a glTF document as `{stem}.glb`, or `{stem}.gltf` plus `{stem}.bin`
    ///
    /// Both document names are guarded whichever form is written.
    pub fn add_document(
        &mut self,
        dir: &Path,
        stem: &str,
        mut root: json::Root,
        buffer: &[u8],
        binary: bool,
    ) -> Result<()> {
        let glb_path = dir.join(format!("{stem}.glb"));
        let gltf_path = dir.join(format!("{stem}.gltf"));
        self.guard(&glb_path);
        self.guard(&gltf_path);

        if binary {
            let glb = assemble_glb(&root, buffer)?;
            self.add(glb_path, glb);
        } else {
            let bin_name = format!("{stem}.bin");
            if let Some(buffer_json) = root.buffers.first_mut() {
                buffer_json.uri = Some(bin_name.clone());
            }
            let text = to_gltf_text(&root)?;
            self.add(gltf_path, text.into_bytes());
            if !buffer.is_empty() {
                self.add(dir.join(bin_name), buffer.to_vec());
            }
        }
        Ok(())
    }

    /// Check guarded targets against `policy`, then write every file
    ///
    /// Returns the number of files written. A declined overwrite is reported
    /// as [`ExportError::OutputExists`] and nothing is written.
    pub fn write(self, policy: OverwritePolicy, prompt: &mut dyn Prompt) -> Result<usize> {
        for path in &self.guarded {
            if !path.exists() {
                continue;
            }
            let allowed = match policy {
                OverwritePolicy::Always => true,
                OverwritePolicy::Never => false,
                OverwritePolicy::Ask => prompt.confirm_overwrite(path)?,
            };
            if !allowed {
                return Err(ExportError::OutputExists { path: path.clone() }.into());
            }
        }

        for file in &self.files {
            if let Some(parent) = file.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
            std::fs::write(&file.path, &file.data)
                .with_context(|| format!("Failed to write: {}", file.path.display()))?;
            tracing::debug!("Wrote {:?} ({} bytes)", file.path, file.data.len());
        }
        Ok(self.files.len())
    }
}

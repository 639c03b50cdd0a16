//! Interactive questions asked during an export

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;

/// Source of answers for texture disambiguation and overwrite checks
pub trait Prompt {
    /// Pick one of `candidates` for `material`; the result must index into it
    fn choose_texture(&mut self, material: &str, candidates: &[String]) -> Result<usize>;

    /// Whether to replace the existing `path`
    fn confirm_overwrite(&mut self, path: &Path) -> Result<bool>;
}

/// Answers every question with its default: texture 0, keep existing files
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Prompt for NonInteractive {
    fn choose_texture(&mut self, _material: &str, _candidates: &[String]) -> Result<usize> {
        Ok(0)
    }

    fn confirm_overwrite(&mut self, _path: &Path) -> Result<bool> {
        Ok(false)
    }
}

/// Line-based prompt over any reader/writer pair (stdin/stdout in the CLI)
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl LinePrompt<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read answer")?;
        Ok((read > 0).then(|| line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn choose_texture(&mut self, material: &str, candidates: &[String]) -> Result<usize> {
        writeln!(
            self.output,
            "Material {material} does not have a matching image! Which image is correct?"
        )?;
        for (i, name) in candidates.iter().enumerate() {
            writeln!(self.output, "{i}. {name}")?;
        }
        loop {
            write!(self.output, "Please select choice by number: ")?;
            self.output.flush()?;
            let Some(answer) = self.read_line()? else {
                anyhow::bail!("Input closed while choosing a texture for {material}");
            };
            match answer.parse::<usize>() {
                Ok(choice) if choice < candidates.len() => return Ok(choice),
                _ => continue,
            }
        }
    }

    fn confirm_overwrite(&mut self, path: &Path) -> Result<bool> {
        write!(self.output, "{} exists! Overwrite? (y/N) ", path.display())?;
        self.output.flush()?;
        let answer = self.read_line()?.unwrap_or_default();
        Ok(answer.to_lowercase().starts_with('y'))
    }
}

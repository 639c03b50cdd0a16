//! vato-export - Valkyrie Anatomia asset export tool
//!
//! Converts game assets (IMDL, IMTN, GLTP, PCK) to open formats
//! (.glb/.gltf, .png, unpacked member files)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vato_export::{
    AssetKind, ExportConfig, Exporter, LinePrompt, NonInteractive, OverwritePolicy, Prompt,
};

#[derive(Parser)]
#[command(name = "vato-export")]
#[command(about = "Valkyrie Anatomia asset export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Never prompt; ambiguous textures use the first candidate and
    /// existing files are kept unless --overwrite is given
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Replace existing output files without asking
    #[arg(short, long, global = true)]
    overwrite: bool,

    /// Write .gltf + .bin instead of .glb
    #[arg(short, long, global = true)]
    text: bool,

    /// Also dump raw vertex/index buffers of every model geometry
    #[arg(short, long, global = true)]
    dump_buffers: bool,

    /// Output directory (default: next to each input)
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an IMDL model (.mdl) to glTF
    Model {
        /// Input .mdl file
        input: PathBuf,
    },

    /// Convert an IMTN motion (.mtn) to a glTF animation
    Animation {
        /// Input .mtn file
        input: PathBuf,

        /// Skeleton model, relative to the motion's directory
        #[arg(short, long)]
        skeleton: Option<PathBuf>,

        /// Keyframe rate (default: 24)
        #[arg(short, long)]
        frame_rate: Option<f32>,
    },

    /// Convert a GLTP texture archive (.txp) to PNG files
    Texture {
        /// Input .txp file
        input: PathBuf,
    },

    /// Unpack a package (.pck)
    Package {
        /// Input .pck file
        input: PathBuf,
    },

    /// Convert every .pck, .txp, .mdl and .mtn below a directory
    All {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

impl Cli {
    fn export_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::load(path)?,
            None => ExportConfig::default(),
        };
        if let Some(dir) = &self.out_dir {
            config.output.dir = Some(dir.clone());
        }
        if self.overwrite {
            config.output.overwrite = OverwritePolicy::Always;
        }
        if self.text {
            config.output.binary = false;
        }
        if self.dump_buffers {
            config.output.dump_raw_buffers = true;
        }
        if let Commands::Animation {
            skeleton,
            frame_rate,
            ..
        } = &self.command
        {
            if let Some(skeleton) = skeleton {
                config.animation.skeleton = Some(skeleton.clone());
            }
            if let Some(rate) = *frame_rate {
                if rate.is_nan() || rate <= 0.0 {
                    anyhow::bail!("--frame-rate must be positive, got {rate}");
                }
                config.animation.frame_rate = rate;
            }
        }
        if self.non_interactive {
            config = config.non_interactive();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let config = cli.export_config()?;
    let mut prompt: Box<dyn Prompt> = if cli.non_interactive {
        Box::new(NonInteractive)
    } else {
        Box::new(LinePrompt::stdio())
    };
    let mut exporter = Exporter::new(&config, prompt.as_mut());

    let (kind, input) = match cli.command {
        Commands::Model { input } => (AssetKind::Model, input),
        Commands::Animation { input, .. } => (AssetKind::Motion, input),
        Commands::Texture { input } => (AssetKind::Texture, input),
        Commands::Package { input } => (AssetKind::Package, input),
        Commands::All { dir } => {
            tracing::info!("Converting everything below {:?}", dir);
            let report = exporter.run_batch(&dir);
            if !report.is_success() {
                anyhow::bail!("{} file(s) failed to convert", report.failed.len());
            }
            return Ok(());
        }
    };

    let written = exporter.export(kind, &input)?;
    tracing::info!("Done! ({written} file(s) written)");
    Ok(())
}

//! mutant-tool - animation archive and texture block tool
//!
//! Packs JSON scene descriptions into binary animation archives (.mut),
//! unpacks them back, and builds/inspects PSP texture blocks (.mtx)

use anyhow::Result;
use clap::{Parser, Subcommand};
use mutant::MUTANT_EXT;
use std::path::{Path, PathBuf};

use mutant_cli::archive;
use mutant_cli::texture::{self, FormatArg, TexturePackOptions};

#[derive(Parser)]
#[command(name = "mutant-tool")]
#[command(about = "Animation archive and texture block tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a JSON scene description into an archive
    Pack {
        /// Input JSON file
        input: PathBuf,

        /// Output archive (defaults to input with .mut extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Unpack an archive to pretty-printed JSON
    Unpack {
        /// Input archive
        input: PathBuf,

        /// Output JSON file (defaults to input with .json extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify that an archive decodes completely
    Check {
        /// Input archive
        input: PathBuf,
    },

    /// Print the archive tree
    Dump {
        /// Input archive
        input: PathBuf,
    },

    /// Texture block commands
    #[command(subcommand)]
    Texture(TextureCommands),
}

#[derive(Subcommand)]
enum TextureCommands {
    /// Build an MTX block from raw pixel data
    Pack {
        /// Raw pixel data
        input: PathBuf,

        /// Output .mtx file
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        width: u32,

        #[arg(long)]
        height: u32,

        /// Row length in pixels (defaults to width)
        #[arg(long)]
        stride: Option<u32>,

        /// Pixel format
        #[arg(short, long, value_enum, default_value = "8888")]
        format: FormatArg,

        /// Raw palette data (required for indexed formats)
        #[arg(short, long)]
        palette: Option<PathBuf>,

        /// Palette entry format
        #[arg(long, value_enum, default_value = "8888")]
        clut_format: FormatArg,

        /// Mark pixel data as swizzled
        #[arg(long)]
        swizzle: bool,
    },

    /// Describe an MTX block
    Info {
        /// Input .mtx file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pack { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension(MUTANT_EXT));
            tracing::info!("Packing {:?} -> {:?}", input, output);
            archive::pack(&input, &output)?;
        }

        Commands::Unpack { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("json"));
            tracing::info!("Unpacking {:?} -> {:?}", input, output);
            archive::unpack(&input, &output)?;
        }

        Commands::Check { input } => {
            let char_set = archive::load_archive(&input)?;
            println!("{}: OK", input.display());
            println!("  {}", archive::ArchiveSummary::of(&char_set));
        }

        Commands::Dump { input } => {
            let char_set = archive::load_archive(&input)?;
            print!("{}", archive::dump(&char_set));
        }

        Commands::Texture(TextureCommands::Pack {
            input,
            output,
            width,
            height,
            stride,
            format,
            palette,
            clut_format,
            swizzle,
        }) => {
            tracing::info!("Converting {:?} -> {:?}", input, output);
            let opts = TexturePackOptions {
                width,
                height,
                stride,
                format: format.into(),
                clut_format: clut_format.into(),
                swizzle,
            };
            texture::pack(&input, palette.as_deref(), &output, &opts)?;
        }

        Commands::Texture(TextureCommands::Info { input }) => {
            let info = texture::info(&input)?;
            print_texture_info(&input, &info);
        }
    }

    Ok(())
}

fn print_texture_info(path: &Path, info: &texture::TextureInfo) {
    println!("{}:", path.display());
    for line in info.to_string().lines() {
        println!("  {}", line);
    }
}

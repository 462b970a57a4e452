use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, ensure, Context, Result};
use clap::{Args, Parser};
use ec_pinmap::{dtb, generate, named_gpios, ChipRegistry, ReaderRegistry};

// ----------------------------------------------------------------------------
// Command-line Interface

#[derive(Debug, Parser)]
#[command(version, about = "Devicetree fragment generator for EC pin-assignment data")]
enum Cli {
    /// Generate a devicetree fragment from a pin-assignment source.
    Generate(GenerateArgs),
    /// Extract gpio-line-names tables from a compiled devicetree blob.
    LineNames(LineNamesArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Chip model the board is wired for.
    #[arg(long)]
    chip: String,
    /// Input format of the pin-assignment source.
    #[arg(long, default_value = "csv")]
    reader: String,
    /// Path of the devicetree fragment to write.
    #[arg(long)]
    output: PathBuf,
    /// Also emit per-controller gpio-line-names tables.
    #[arg(long)]
    names: bool,
    /// Overwrite the output file if it already exists.
    #[arg(long)]
    force: bool,
    /// Pin-assignment source to read.
    input: PathBuf,
}

#[derive(Debug, Args)]
struct LineNamesArgs {
    /// Path of the devicetree fragment to write.
    #[arg(long)]
    output: PathBuf,
    /// Overwrite the output file if it already exists.
    #[arg(long)]
    force: bool,
    /// Compiled devicetree blob to read.
    input: PathBuf,
}

// ----------------------------------------------------------------------------
// Application

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_module("ec_pinmap", log::LevelFilter::Info)
        .init();

    match Cli::parse() {
        Cli::Generate(args) => generate_fragment(args),
        Cli::LineNames(args) => extract_line_names(args),
    }
}

// ----------------------------------------------------------------------------
// Subcommands

fn generate_fragment(args: GenerateArgs) -> Result<()> {
    let mut chips = ChipRegistry::standard();
    let readers = ReaderRegistry::standard();

    let chip_names = chips.names().join(", ");
    let Some(chip) = chips.find(&args.chip) else {
        bail!(
            "unknown chip '{}' (registered chips: {chip_names})",
            args.chip
        );
    };
    let Some(reader) = readers.find(&args.reader) else {
        bail!(
            "unknown reader '{}' (registered readers: {})",
            args.reader,
            readers.names().join(", ")
        );
    };

    check_output(&args.output, args.force)?;
    let mut pins = reader.read(&args.chip, &args.input)?;
    log::info!(
        "read {} pin records for '{}' from '{}'",
        pins.len(),
        chip.name(),
        args.input.display()
    );

    // Render fully in memory so a generation problem cannot leave a partial
    // file behind.
    let mut rendered = Vec::new();
    generate::generate(&mut rendered, &mut pins, chip, args.names)?;
    fs::write(&args.output, &rendered)
        .with_context(|| format!("could not write '{}'", args.output.display()))?;

    log::info!("wrote '{}'", args.output.display());
    Ok(())
}

fn extract_line_names(args: LineNamesArgs) -> Result<()> {
    check_output(&args.output, args.force)?;

    let blob = fs::read(&args.input)
        .with_context(|| format!("could not read '{}'", args.input.display()))?;
    let root = dtb::parse(&blob)
        .with_context(|| format!("could not parse '{}'", args.input.display()))?;

    let mut rendered = Vec::new();
    named_gpios::extract(&mut rendered, &root)?;
    fs::write(&args.output, &rendered)
        .with_context(|| format!("could not write '{}'", args.output.display()))?;

    log::info!("wrote '{}'", args.output.display());
    Ok(())
}

// ----------------------------------------------------------------------------
// Helper Functions

fn check_output(output: &Path, force: bool) -> Result<()> {
    ensure!(
        force || !output.exists(),
        "output file '{}' already exists (use --force to overwrite)",
        output.display()
    );
    Ok(())
}

//! Dictionary Extraction CLI
//!
//! Reads a parsed IFC schema snapshot (JSON) and writes the flattened class
//! and property dictionary plus one translation catalog per package.

use anyhow::Context;
use clap::Parser;
use ifc_dictionary::dictionary::Severity;
use ifc_dictionary::{DictionaryConfig, DictionaryPipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ifc-dictionary")]
#[command(about = "Extract a class and property dictionary from an IFC schema graph")]
struct Cli {
    /// Parsed schema snapshot (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving the dictionary document and catalogs
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Configuration file (TOML), layered over the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip writing translation catalogs
    #[arg(long)]
    no_catalogs: bool,

    /// Print every diagnostic, not only warnings
    #[arg(long)]
    diagnostics: bool,

    /// Also write the effective configuration (TOML) to this path
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().into_owned());
    let config = DictionaryConfig::load_from(config_path.as_deref()).context("loading configuration")?;

    if let Some(path) = &cli.save_config {
        config
            .save(path)
            .with_context(|| format!("saving configuration to {}", path.display()))?;
        println!("💾 Configuration saved to {:?}", path);
    }

    println!("📖 IFC Dictionary Extraction");
    println!("  Input: {:?}", cli.input);
    println!();

    let extraction = DictionaryPipeline::new(&config)
        .run_path(&cli.input)
        .with_context(|| format!("extracting {}", cli.input.display()))?;

    println!("📊 Extraction Summary:");
    println!("  Classes (before filter): {}", extraction.full.len());
    println!("  Classes: {}", extraction.projected.classes.len());
    println!("  Properties: {}", extraction.projected.properties.len());
    println!("  Translations: {}", extraction.projected.translations.len());
    println!("  Input SHA-256: {}", extraction.document_hash);

    let diagnostics = &extraction.diagnostics;
    if !diagnostics.is_empty() {
        println!();
        println!(
            "⚠️  {} warning(s), {} note(s)",
            diagnostics.warning_count(),
            diagnostics.len() - diagnostics.warning_count()
        );
        for item in diagnostics {
            if cli.diagnostics || item.severity() == Severity::Warning {
                println!("  {}", item);
            }
        }
    }

    let catalogs = config.output.write_catalogs && !cli.no_catalogs;
    let written = extraction
        .write(&config, &cli.output_dir, catalogs)
        .with_context(|| format!("writing to {}", cli.output_dir.display()))?;

    println!();
    println!("✅ Dictionary written to {:?}", written.dictionary);
    if !written.catalogs.is_empty() {
        println!("✅ {} catalog(s) written", written.catalogs.len());
    }

    Ok(())
}

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use visgen::build_config::DefineSet;
use visgen::cli::{Cli, Command, OutputFormat, VariantArgs};
use visgen::config::Manifest;
use visgen::header;
use visgen::preprocess::verify_header;
use visgen::report::{ResolveReport, TableReport};
use visgen::variant::{ExportHeaderOptions, LibraryVariant};

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Variants selected by manifest and/or ad-hoc target arguments
fn select_variants(args: &VariantArgs) -> Result<Vec<LibraryVariant>> {
    match (&args.manifest, &args.target) {
        (Some(path), target) => {
            let manifest = Manifest::from_file(path)
                .with_context(|| format!("Failed to load manifest {}", path.display()))?;
            let variants = manifest.variants()?;
            match target {
                Some(target) => {
                    let found: Vec<_> = variants
                        .into_iter()
                        .filter(|v| v.target() == target.as_str())
                        .collect();
                    if found.is_empty() {
                        bail!("Target {} not found in {}", target, path.display());
                    }
                    Ok(found)
                }
                None => Ok(variants),
            }
        }
        (None, Some(target)) => {
            let mut options = ExportHeaderOptions::new(target.clone(), args.kind)
                .with_define_no_deprecated(args.define_no_deprecated);
            if let Some(base_name) = &args.base_name {
                options = options.with_base_name(base_name.clone());
            }
            if let Some(prefix) = &args.prefix {
                options = options.with_prefix(prefix.clone());
            }
            Ok(vec![LibraryVariant::new(options)?])
        }
        (None, None) => {
            bail!("Must specify --manifest or --target. Usage: visgen generate -t NAME [-k static]")
        }
    }
}

/// Commands that inspect a single translation unit need exactly one variant
fn single_variant(args: &VariantArgs) -> Result<LibraryVariant> {
    let mut variants = select_variants(args)?;
    if variants.len() != 1 {
        bail!(
            "Expected exactly one library, found {}. Select one with --target.",
            variants.len()
        );
    }
    Ok(variants.remove(0))
}

fn run_generate(args: &VariantArgs, out_dir: &Path, stdout: bool) -> Result<()> {
    for variant in select_variants(args)? {
        if stdout {
            print!("{}", header::render(&variant));
            continue;
        }
        let written = header::write_header(&variant, out_dir)
            .with_context(|| format!("Failed to write header for {}", variant.target()))?;
        let status = if written.updated { "wrote" } else { "unchanged" };
        println!("{} {}", status, written.path.display());
    }
    Ok(())
}

fn run_resolve(args: &VariantArgs, defines: &[String], format: OutputFormat) -> Result<()> {
    let variant = single_variant(args)?;
    let defines = DefineSet::parse(defines)?;
    let report = ResolveReport::build(&variant, &defines);
    match format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn run_table(args: &VariantArgs, format: OutputFormat) -> Result<()> {
    let reports: Vec<_> = select_variants(args)?
        .iter()
        .map(TableReport::build)
        .collect();
    match format {
        OutputFormat::Text => {
            for report in &reports {
                print!("{}", report.to_text());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(())
}

fn run_check(args: &VariantArgs, header_path: &Path) -> Result<()> {
    let variant = single_variant(args)?;
    let text = fs::read_to_string(header_path)
        .with_context(|| format!("Failed to read {}", header_path.display()))?;
    let mismatches = verify_header(&variant, &text)?;
    if !mismatches.is_empty() {
        for m in &mismatches {
            eprintln!(
                "{}: {} expected {:?}, found {:?}",
                m.config, m.macro_name, m.expected, m.actual
            );
        }
        bail!(
            "{} does not match {} ({} mismatches)",
            header_path.display(),
            variant.target(),
            mismatches.len()
        );
    }
    println!("{}: ok", header_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    match &args.command {
        Command::Generate {
            variant,
            out_dir,
            stdout,
        } => run_generate(variant, out_dir, *stdout),
        Command::Resolve {
            variant,
            defines,
            format,
        } => run_resolve(variant, defines, *format),
        Command::Table { variant, format } => run_table(variant, *format),
        Command::Check { variant, header } => run_check(variant, header),
    }
}

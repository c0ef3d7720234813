//! CLI argument parsing for visgen

use crate::build_config::LibraryKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for resolutions and tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "visgen")]
#[command(version)]
#[command(about = "Symbol visibility export header generator", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write export headers for one target or every library in a manifest
    Generate {
        #[command(flatten)]
        variant: VariantArgs,

        /// Directory the headers are written to
        #[arg(short = 'o', long = "out-dir", value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Print the header to stdout instead of writing files
        #[arg(long = "stdout")]
        stdout: bool,
    },

    /// Resolve the decoration macros one translation unit sees
    Resolve {
        #[command(flatten)]
        variant: VariantArgs,

        /// Preprocessor definition visible to the unit (NAME or NAME=VALUE)
        #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
        defines: Vec<String>,

        /// Output format (text or json)
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the build mode × compilation role decision table
    Table {
        #[command(flatten)]
        variant: VariantArgs,

        /// Output format (text or json)
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Verify an existing header against the resolver for every configuration
    Check {
        #[command(flatten)]
        variant: VariantArgs,

        /// Header file to verify
        #[arg(long = "header", value_name = "FILE")]
        header: PathBuf,
    },
}

/// Selects the library variant(s) a command works on
#[derive(Args, Debug, Clone, Default)]
pub struct VariantArgs {
    /// Manifest listing libraries (visgen.toml)
    #[arg(short = 'm', long = "manifest", value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Build target name (looked up in the manifest when one is given)
    #[arg(short = 't', long = "target", value_name = "NAME")]
    pub target: Option<String>,

    /// Library kind for an ad-hoc target (not allowed with --manifest)
    #[arg(
        short = 'k',
        long = "kind",
        value_name = "KIND",
        default_value = "shared",
        value_parser = parse_kind,
        conflicts_with = "manifest"
    )]
    pub kind: LibraryKind,

    /// Base name for macro and file names (defaults to the target name)
    #[arg(long = "base-name", value_name = "NAME", conflicts_with = "manifest")]
    pub base_name: Option<String>,

    /// Prefix prepended to every macro name
    #[arg(long = "prefix", value_name = "PREFIX", conflicts_with = "manifest")]
    pub prefix: Option<String>,

    /// Enable the NO_DEPRECATED definition
    #[arg(long = "define-no-deprecated", conflicts_with = "manifest")]
    pub define_no_deprecated: bool,
}

fn parse_kind(s: &str) -> Result<LibraryKind, String> {
    s.parse().map_err(|e: crate::error::VisgenError| e.to_string())
}

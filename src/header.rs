//! Export header rendering
//!
//! The header is the artifact consumers include: a single include-guarded
//! file that replays the resolver's decisions as preprocessor conditionals.
//! Every attribute body is taken from [`crate::composer::compose`], so the
//! text and the typed model cannot drift apart.

use crate::build_config::{BuildConfig, BuildMode, CompilationRole};
use crate::composer::{compose, Decoration};
use crate::error::Result;
use crate::variant::LibraryVariant;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Attribute body a decoration gets in the header's dynamic branch
fn dynamic_body(variant: &LibraryVariant, decoration: Decoration, role: CompilationRole) -> String {
    let mode = BuildMode::select(variant.kind(), false);
    compose(decoration, BuildConfig::new(mode, role)).render()
}

fn static_body(decoration: Decoration) -> String {
    compose(
        decoration,
        BuildConfig::new(BuildMode::Static, CompilationRole::Consuming),
    )
    .render()
}

fn define_line(out: &mut String, indent: &str, name: &str, body: &str) {
    if body.is_empty() {
        let _ = writeln!(out, "#{}define {}", indent, name);
    } else {
        let _ = writeln!(out, "#{}define {} {}", indent, name, body);
    }
}

/// Render the export header for `variant`
pub fn render(variant: &LibraryVariant) -> String {
    let export = variant.export_macro();
    let no_export = variant.no_export_macro();
    let deprecated = variant.deprecated_macro();
    let guard = variant.include_guard();
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "#ifndef {}", guard);
    let _ = writeln!(out, "#define {}", guard);
    let _ = writeln!(out);

    let _ = writeln!(out, "#ifdef {}", variant.static_define());
    define_line(&mut out, "  ", export, &static_body(Decoration::Export));
    define_line(&mut out, "  ", no_export, &static_body(Decoration::NoExport));
    let _ = writeln!(out, "#else");
    let _ = writeln!(out, "#  ifndef {}", export);
    let _ = writeln!(out, "#    ifdef {}", variant.exports_define());
    let _ = writeln!(out, "        /* We are building this library */");
    let _ = writeln!(
        out,
        "#      define {} {}",
        export,
        dynamic_body(variant, Decoration::Export, CompilationRole::Building)
    );
    let _ = writeln!(out, "#    else");
    let _ = writeln!(out, "        /* We are using this library */");
    let _ = writeln!(
        out,
        "#      define {} {}",
        export,
        dynamic_body(variant, Decoration::Export, CompilationRole::Consuming)
    );
    let _ = writeln!(out, "#    endif");
    let _ = writeln!(out, "#  endif");
    let _ = writeln!(out);
    let _ = writeln!(out, "#  ifndef {}", no_export);
    let _ = writeln!(
        out,
        "#    define {} {}",
        no_export,
        dynamic_body(variant, Decoration::NoExport, CompilationRole::Consuming)
    );
    let _ = writeln!(out, "#  endif");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out);

    // DEPRECATED carries no visibility, so any configuration renders it
    let _ = writeln!(out, "#ifndef {}", deprecated);
    define_line(&mut out, "  ", deprecated, &static_body(Decoration::Deprecated));
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out);

    for (composite, first) in [
        (Decoration::DeprecatedExport, export),
        (Decoration::DeprecatedNoExport, no_export),
    ] {
        let name = variant.macro_name(composite);
        let _ = writeln!(out, "#ifndef {}", name);
        let _ = writeln!(out, "#  define {} {} {}", name, first, deprecated);
        let _ = writeln!(out, "#endif");
        let _ = writeln!(out);
    }

    let hook = if variant.define_no_deprecated() { 1 } else { 0 };
    let _ = writeln!(out, "#if {} /* DEFINE_NO_DEPRECATED */", hook);
    let _ = writeln!(out, "#  ifndef {}", variant.no_deprecated_macro());
    let _ = writeln!(out, "#    define {}", variant.no_deprecated_macro());
    let _ = writeln!(out, "#  endif");
    let _ = writeln!(out, "#endif");

    if let Some(content) = variant.custom_content() {
        let _ = writeln!(out, "{}", content.trim_end_matches('\n'));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "#endif /* {} */", guard);
    out
}

/// Outcome of writing a header to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenHeader {
    pub path: PathBuf,
    /// False when an identical file already existed and was left untouched
    pub updated: bool,
}

/// Write the header into `dir`, leaving an identical existing file untouched
pub fn write_header(variant: &LibraryVariant, dir: &Path) -> Result<WrittenHeader> {
    let path = dir.join(variant.file_name());
    let content = render(variant);

    if let Ok(existing) = fs::read_to_string(&path) {
        if existing == content {
            tracing::debug!(path = %path.display(), "export header unchanged");
            return Ok(WrittenHeader {
                path,
                updated: false,
            });
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    tracing::info!(
        target_name = variant.target(),
        path = %path.display(),
        "wrote export header"
    );
    Ok(WrittenHeader {
        path,
        updated: true,
    })
}

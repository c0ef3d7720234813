//! Library variants: one parameterized instance of the export interface
//!
//! Every variant (e.g. `rtlsdr` shared and `rtlsdr_static` archive) goes
//! through the same naming rules; only the base name, target name and kind
//! differ between them.
//!
//! # Example
//!
//! ```
//! use visgen::build_config::LibraryKind;
//! use visgen::variant::{ExportHeaderOptions, LibraryVariant};
//!
//! # fn main() -> visgen::error::Result<()> {
//! let variant = LibraryVariant::new(ExportHeaderOptions::new("rtlsdr_static", LibraryKind::Static))?;
//! assert_eq!(variant.export_macro(), "RTLSDR_STATIC_EXPORT");
//! assert_eq!(variant.static_define(), "RTLSDR_STATIC_STATIC_DEFINE");
//! assert_eq!(variant.file_name(), "rtlsdr_static_export.h");
//! # Ok(())
//! # }
//! ```

use crate::build_config::LibraryKind;
use crate::composer::Decoration;
use crate::error::{Result, VisgenError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn identifier_regex() -> &'static Regex {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

/// Whether `name` is usable as a C macro name
pub fn is_c_identifier(name: &str) -> bool {
    identifier_regex().is_match(name)
}

/// Replace every character that cannot appear in a C identifier with `_`
pub fn make_c_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Generator knobs for one export header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportHeaderOptions {
    /// Build target the header belongs to
    pub target: String,

    #[serde(default)]
    pub kind: LibraryKind,

    /// Defaults to the target name
    #[serde(default)]
    pub base_name: Option<String>,

    #[serde(default)]
    pub export_macro_name: Option<String>,

    #[serde(default)]
    pub no_export_macro_name: Option<String>,

    #[serde(default)]
    pub deprecated_macro_name: Option<String>,

    #[serde(default)]
    pub no_deprecated_macro_name: Option<String>,

    #[serde(default)]
    pub static_define: Option<String>,

    /// Per-target define marking library-internal units; defaults to `<target>_EXPORTS`
    #[serde(default)]
    pub define_symbol: Option<String>,

    /// Prepended to every generated macro name
    #[serde(default)]
    pub prefix_name: Option<String>,

    #[serde(default)]
    pub include_guard_name: Option<String>,

    #[serde(default)]
    pub export_file_name: Option<String>,

    /// Emit the `NO_DEPRECATED` definition instead of leaving the hook disabled
    #[serde(default)]
    pub define_no_deprecated: bool,

    /// Extra text placed before the closing include guard
    #[serde(default)]
    pub custom_content: Option<String>,
}

impl ExportHeaderOptions {
    pub fn new(target: impl Into<String>, kind: LibraryKind) -> Self {
        Self {
            target: target.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = Some(base_name.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_name = Some(prefix.into());
        self
    }

    pub fn with_define_no_deprecated(mut self, enabled: bool) -> Self {
        self.define_no_deprecated = enabled;
        self
    }

    pub fn with_custom_content(mut self, content: impl Into<String>) -> Self {
        self.custom_content = Some(content.into());
        self
    }
}

/// Fully named instance of the export interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryVariant {
    target: String,
    kind: LibraryKind,
    base: String,
    export_macro: String,
    no_export_macro: String,
    deprecated_macro: String,
    deprecated_export_macro: String,
    deprecated_no_export_macro: String,
    no_deprecated_macro: String,
    static_define: String,
    exports_define: String,
    include_guard: String,
    file_name: String,
    define_no_deprecated: bool,
    custom_content: Option<String>,
}

impl LibraryVariant {
    pub fn new(options: ExportHeaderOptions) -> Result<Self> {
        if options.target.trim().is_empty() {
            return Err(VisgenError::InvalidIdentifier {
                field: "target",
                value: options.target,
            });
        }

        let base_name = options
            .base_name
            .clone()
            .unwrap_or_else(|| options.target.clone());
        let base_name = make_c_identifier(&base_name);
        let prefix = options.prefix_name.clone().unwrap_or_default();
        let base = format!("{}{}", prefix, base_name.to_ascii_uppercase());

        let export_macro = options
            .export_macro_name
            .clone()
            .unwrap_or_else(|| format!("{}_EXPORT", base));
        let no_export_macro = options
            .no_export_macro_name
            .clone()
            .unwrap_or_else(|| format!("{}_NO_EXPORT", base));
        let deprecated_macro = options
            .deprecated_macro_name
            .clone()
            .unwrap_or_else(|| format!("{}_DEPRECATED", base));
        let no_deprecated_macro = options
            .no_deprecated_macro_name
            .clone()
            .unwrap_or_else(|| format!("{}_NO_DEPRECATED", base));
        let static_define = options
            .static_define
            .clone()
            .unwrap_or_else(|| format!("{}_STATIC_DEFINE", base));
        let exports_define = options
            .define_symbol
            .clone()
            .unwrap_or_else(|| format!("{}_EXPORTS", make_c_identifier(&options.target)));
        let include_guard = options
            .include_guard_name
            .clone()
            .unwrap_or_else(|| format!("{}_H", export_macro));
        let file_name = options
            .export_file_name
            .clone()
            .unwrap_or_else(|| format!("{}_export.h", base_name.to_ascii_lowercase()));

        let variant = Self {
            deprecated_export_macro: format!("{}_EXPORT", deprecated_macro),
            deprecated_no_export_macro: format!("{}_NO_EXPORT", deprecated_macro),
            target: options.target,
            kind: options.kind,
            base,
            export_macro,
            no_export_macro,
            deprecated_macro,
            no_deprecated_macro,
            static_define,
            exports_define,
            include_guard,
            file_name,
            define_no_deprecated: options.define_no_deprecated,
            custom_content: options.custom_content,
        };
        variant.validate()?;
        Ok(variant)
    }

    fn validate(&self) -> Result<()> {
        let names = [
            ("export_macro_name", &self.export_macro),
            ("no_export_macro_name", &self.no_export_macro),
            ("deprecated_macro_name", &self.deprecated_macro),
            ("no_deprecated_macro_name", &self.no_deprecated_macro),
            ("static_define", &self.static_define),
            ("define_symbol", &self.exports_define),
            ("include_guard_name", &self.include_guard),
        ];
        for (field, value) in names {
            if !is_c_identifier(value) {
                return Err(VisgenError::InvalidIdentifier {
                    field,
                    value: value.clone(),
                });
            }
        }
        if self.file_name.trim().is_empty() {
            return Err(VisgenError::InvalidIdentifier {
                field: "export_file_name",
                value: self.file_name.clone(),
            });
        }
        Ok(())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> LibraryKind {
        self.kind
    }

    /// Uppercase, prefixed base shared by the default macro names
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn macro_name(&self, decoration: Decoration) -> &str {
        match decoration {
            Decoration::Export => &self.export_macro,
            Decoration::NoExport => &self.no_export_macro,
            Decoration::Deprecated => &self.deprecated_macro,
            Decoration::DeprecatedExport => &self.deprecated_export_macro,
            Decoration::DeprecatedNoExport => &self.deprecated_no_export_macro,
        }
    }

    pub fn export_macro(&self) -> &str {
        &self.export_macro
    }

    pub fn no_export_macro(&self) -> &str {
        &self.no_export_macro
    }

    pub fn deprecated_macro(&self) -> &str {
        &self.deprecated_macro
    }

    pub fn no_deprecated_macro(&self) -> &str {
        &self.no_deprecated_macro
    }

    pub fn static_define(&self) -> &str {
        &self.static_define
    }

    pub fn exports_define(&self) -> &str {
        &self.exports_define
    }

    pub fn include_guard(&self) -> &str {
        &self.include_guard
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn define_no_deprecated(&self) -> bool {
        self.define_no_deprecated
    }

    pub fn custom_content(&self) -> Option<&str> {
        self.custom_content.as_deref()
    }
}

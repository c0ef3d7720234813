//! Visibility × deprecation composition

use crate::annotation::{Annotation, AnnotationList};
use crate::build_config::BuildConfig;
use crate::resolver::{resolve_export, resolve_no_export};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a declaration is additionally deprecated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeprecationFlag {
    Plain,
    Deprecated,
}

impl DeprecationFlag {
    pub fn annotations(self) -> AnnotationList {
        match self {
            DeprecationFlag::Plain => AnnotationList::empty(),
            DeprecationFlag::Deprecated => AnnotationList::single(Annotation::Deprecated),
        }
    }
}

/// Visibility source of a decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportIntent {
    Export,
    NoExport,
    /// No visibility component (bare `DEPRECATED`)
    Unchanged,
}

/// Public decoration macros of an export header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    Export,
    NoExport,
    Deprecated,
    DeprecatedExport,
    DeprecatedNoExport,
}

impl Decoration {
    pub const ALL: [Decoration; 5] = [
        Decoration::Export,
        Decoration::NoExport,
        Decoration::Deprecated,
        Decoration::DeprecatedExport,
        Decoration::DeprecatedNoExport,
    ];

    pub fn parts(self) -> (ExportIntent, DeprecationFlag) {
        match self {
            Decoration::Export => (ExportIntent::Export, DeprecationFlag::Plain),
            Decoration::NoExport => (ExportIntent::NoExport, DeprecationFlag::Plain),
            Decoration::Deprecated => (ExportIntent::Unchanged, DeprecationFlag::Deprecated),
            Decoration::DeprecatedExport => (ExportIntent::Export, DeprecationFlag::Deprecated),
            Decoration::DeprecatedNoExport => {
                (ExportIntent::NoExport, DeprecationFlag::Deprecated)
            }
        }
    }

    /// Macro name suffix after the variant base, e.g. `DEPRECATED_EXPORT`
    pub fn suffix(self) -> &'static str {
        match self {
            Decoration::Export => "EXPORT",
            Decoration::NoExport => "NO_EXPORT",
            Decoration::Deprecated => "DEPRECATED",
            Decoration::DeprecatedExport => "DEPRECATED_EXPORT",
            Decoration::DeprecatedNoExport => "DEPRECATED_NO_EXPORT",
        }
    }
}

impl fmt::Display for Decoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

fn visibility_part(intent: ExportIntent, config: BuildConfig) -> AnnotationList {
    match intent {
        ExportIntent::Export => resolve_export(config).annotations(),
        ExportIntent::NoExport => resolve_no_export(config).annotations(),
        ExportIntent::Unchanged => AnnotationList::empty(),
    }
}

/// Annotations a decoration expands to: visibility first, deprecation second
pub fn compose(decoration: Decoration, config: BuildConfig) -> AnnotationList {
    let (intent, flag) = decoration.parts();
    visibility_part(intent, config).then(flag.annotations())
}

/// All decorations resolved for one configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composites {
    pub config: BuildConfig,
    pub export: AnnotationList,
    pub no_export: AnnotationList,
    pub deprecated: AnnotationList,
    pub deprecated_export: AnnotationList,
    pub deprecated_no_export: AnnotationList,
}

impl Composites {
    pub fn resolve(config: BuildConfig) -> Self {
        Self {
            config,
            export: compose(Decoration::Export, config),
            no_export: compose(Decoration::NoExport, config),
            deprecated: compose(Decoration::Deprecated, config),
            deprecated_export: compose(Decoration::DeprecatedExport, config),
            deprecated_no_export: compose(Decoration::DeprecatedNoExport, config),
        }
    }

    pub fn get(&self, decoration: Decoration) -> &AnnotationList {
        match decoration {
            Decoration::Export => &self.export,
            Decoration::NoExport => &self.no_export,
            Decoration::Deprecated => &self.deprecated,
            Decoration::DeprecatedExport => &self.deprecated_export,
            Decoration::DeprecatedNoExport => &self.deprecated_no_export,
        }
    }
}

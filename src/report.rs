//! Text and JSON reports for `visgen resolve` and `visgen table`

use crate::annotation::AnnotationList;
use crate::build_config::{BuildConfig, DefineSet, LibraryKind};
use crate::composer::{Composites, Decoration};
use crate::preprocess::defines_for;
use crate::resolver::{DecisionTable, VisibilityDecision};
use crate::variant::LibraryVariant;
use serde::Serialize;
use std::fmt::Write as _;

/// One resolved decoration macro
#[derive(Debug, Clone, Serialize)]
pub struct MacroReport {
    /// Macro name (e.g., "RTLSDR_EXPORT")
    pub name: String,
    /// Ordered annotations the macro expands to
    pub annotations: AnnotationList,
    /// C attribute text (empty for a no-op)
    pub text: String,
}

fn macro_reports(variant: &LibraryVariant, composites: &Composites) -> Vec<MacroReport> {
    Decoration::ALL
        .iter()
        .map(|&d| {
            let annotations = composites.get(d).clone();
            MacroReport {
                name: variant.macro_name(d).to_string(),
                text: annotations.render(),
                annotations,
            }
        })
        .collect()
}

fn display_text(text: &str) -> &str {
    if text.is_empty() {
        "<empty>"
    } else {
        text
    }
}

/// Resolution of every decoration for one translation unit
#[derive(Debug, Clone, Serialize)]
pub struct ResolveReport {
    pub target: String,
    pub kind: LibraryKind,
    pub defines: Vec<String>,
    pub config: BuildConfig,
    pub macros: Vec<MacroReport>,
}

impl ResolveReport {
    pub fn build(variant: &LibraryVariant, defines: &DefineSet) -> Self {
        let config = BuildConfig::resolve(variant, defines);
        let composites = Composites::resolve(config);
        Self {
            target: variant.target().to_string(),
            kind: variant.kind(),
            defines: defines
                .iter()
                .map(|(name, value)| match value {
                    Some(value) => format!("{}={}", name, value),
                    None => name.to_string(),
                })
                .collect(),
            config,
            macros: macro_reports(variant, &composites),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({}): {}", self.target, self.kind, self.config);
        for m in &self.macros {
            let _ = writeln!(out, "  {} = {}", m.name, display_text(&m.text));
        }
        out
    }
}

/// One row of a variant's decision table
#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    /// Configuration the unit asked for through its defines
    pub requested: BuildConfig,
    /// Configuration after the target kind is applied
    pub effective: BuildConfig,
    pub export: VisibilityDecision,
    pub no_export: VisibilityDecision,
    pub macros: Vec<MacroReport>,
}

/// Decision table for one variant
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub target: String,
    pub kind: LibraryKind,
    pub rows: Vec<TableRow>,
}

impl TableReport {
    pub fn build(variant: &LibraryVariant) -> Self {
        let table = DecisionTable::build();
        let rows = BuildConfig::all()
            .into_iter()
            .filter_map(|requested| {
                let effective = BuildConfig::resolve(variant, &defines_for(variant, requested));
                let row = table.row(effective)?;
                Some(TableRow {
                    requested,
                    effective,
                    export: row.export,
                    no_export: row.no_export,
                    macros: macro_reports(variant, &Composites::resolve(effective)),
                })
            })
            .collect();
        Self {
            target: variant.target().to_string(),
            kind: variant.kind(),
            rows,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} ({}) ===", self.target, self.kind);
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<20} -> {:<20} EXPORT={:?} NO_EXPORT={:?}",
                row.requested.to_string(),
                row.effective.to_string(),
                row.export,
                row.no_export
            );
            for m in &row.macros {
                let _ = writeln!(out, "    {} = {}", m.name, display_text(&m.text));
            }
        }
        out
    }
}

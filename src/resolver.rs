//! Export resolution: BuildMode × CompilationRole -> visibility decision

use crate::annotation::{Annotation, AnnotationList, Visibility};
use crate::build_config::{BuildConfig, BuildMode, CompilationRole};
use serde::{Deserialize, Serialize};

/// Resolved visibility for a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityDecision {
    DefaultVisible,
    Hidden,
    None,
}

impl VisibilityDecision {
    pub fn annotations(self) -> AnnotationList {
        match self {
            VisibilityDecision::DefaultVisible => {
                AnnotationList::single(Annotation::Visibility(Visibility::Default))
            }
            VisibilityDecision::Hidden => {
                AnnotationList::single(Annotation::Visibility(Visibility::Hidden))
            }
            VisibilityDecision::None => AnnotationList::empty(),
        }
    }
}

/// Decision behind the `EXPORT` macro.
///
/// Both role arms currently yield default visibility. They stay separate so
/// an import-style annotation for consumers only touches the `Consuming` arm.
pub fn resolve_export(config: BuildConfig) -> VisibilityDecision {
    match config.mode {
        BuildMode::Static => VisibilityDecision::None,
        BuildMode::Dynamic => match config.role {
            CompilationRole::Building => VisibilityDecision::DefaultVisible,
            CompilationRole::Consuming => VisibilityDecision::DefaultVisible,
        },
    }
}

/// Decision behind the `NO_EXPORT` macro; independent of role
pub fn resolve_no_export(config: BuildConfig) -> VisibilityDecision {
    match config.mode {
        BuildMode::Static => VisibilityDecision::None,
        BuildMode::Dynamic => VisibilityDecision::Hidden,
    }
}

/// One row of a decision table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionRow {
    pub config: BuildConfig,
    pub export: VisibilityDecision,
    pub no_export: VisibilityDecision,
}

/// Full decision table over every configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionTable {
    pub rows: Vec<DecisionRow>,
}

impl DecisionTable {
    pub fn build() -> Self {
        let rows = BuildConfig::all()
            .into_iter()
            .map(|config| DecisionRow {
                config,
                export: resolve_export(config),
                no_export: resolve_no_export(config),
            })
            .collect();
        Self { rows }
    }

    pub fn row(&self, config: BuildConfig) -> Option<&DecisionRow> {
        self.rows.iter().find(|r| r.config == config)
    }
}

//! Per-translation-unit build configuration
//!
//! A translation unit sees two facts about the library it is compiled
//! against: whether the library is a static archive ([`BuildMode`]) and
//! whether the unit is part of the library itself ([`CompilationRole`]).
//! Both are resolved once from the unit's preprocessor definitions and held
//! in a [`BuildConfig`] value for the rest of the unit.

use crate::error::{Result, VisgenError};
use crate::variant::{is_c_identifier, LibraryVariant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of target an export header is generated for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    /// Shared object with its own dynamic symbol table
    #[default]
    Shared,
    /// Loadable module (shared object not linked against directly)
    Module,
    /// Static archive
    Static,
    /// Object library (loose object files)
    Object,
}

impl LibraryKind {
    /// Whether the produced binary carries its own exported symbol table
    pub fn has_symbol_table(self) -> bool {
        matches!(self, LibraryKind::Shared | LibraryKind::Module)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LibraryKind::Shared => "shared",
            LibraryKind::Module => "module",
            LibraryKind::Static => "static",
            LibraryKind::Object => "object",
        }
    }
}

impl FromStr for LibraryKind {
    type Err = VisgenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "shared" => Ok(LibraryKind::Shared),
            "module" => Ok(LibraryKind::Module),
            "static" => Ok(LibraryKind::Static),
            "object" => Ok(LibraryKind::Object),
            _ => Err(VisgenError::UnknownKind(s.to_string())),
        }
    }
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the library a unit is compiled against is a static archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Static,
    Dynamic,
}

impl BuildMode {
    /// Select the resolution path for a unit.
    ///
    /// Targets without a symbol table are always static. Otherwise the
    /// static define switches to the static path; an undefined flag falls
    /// through to the dynamic path.
    pub fn select(kind: LibraryKind, static_define_present: bool) -> Self {
        if !kind.has_symbol_table() || static_define_present {
            BuildMode::Static
        } else {
            BuildMode::Dynamic
        }
    }
}

/// Whether the unit belongs to the library or to one of its consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilationRole {
    Building,
    Consuming,
}

impl CompilationRole {
    pub fn from_defines(defines: &DefineSet, exports_define: &str) -> Self {
        if defines.contains(exports_define) {
            CompilationRole::Building
        } else {
            CompilationRole::Consuming
        }
    }
}

/// Preprocessor definitions visible to one translation unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefineSet {
    defines: BTreeMap<String, Option<String>>,
}

impl DefineSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of `NAME` / `NAME=VALUE` definitions
    pub fn parse<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for item in items {
            let (name, value) = parse_define(item.as_ref())?;
            set.defines.insert(name, value);
        }
        Ok(set)
    }

    pub fn define(&mut self, name: impl Into<String>) -> &mut Self {
        self.defines.insert(name.into(), None);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defines.contains_key(name)
    }

    /// Value of a definition; `NAME` without a value reads as `1` like `-DNAME`
    pub fn value(&self, name: &str) -> Option<&str> {
        self.defines
            .get(name)
            .map(|v| v.as_deref().unwrap_or("1"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.defines
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.defines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }
}

impl FromStr for DefineSet {
    type Err = VisgenError;

    /// Comma-separated definitions, e.g. `rtlsdr_EXPORTS,LEVEL=2`
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s.split(',').map(str::trim).filter(|p| !p.is_empty()))
    }
}

fn parse_define(item: &str) -> Result<(String, Option<String>)> {
    let item = item.trim();
    let item = item.strip_prefix("-D").unwrap_or(item);
    let (name, value) = match item.split_once('=') {
        Some((name, value)) => (name, Some(value.to_string())),
        None => (item, None),
    };
    if !is_c_identifier(name) {
        return Err(VisgenError::InvalidDefine(item.to_string()));
    }
    Ok((name.to_string(), value))
}

/// Configuration facts resolved once for a translation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildConfig {
    pub mode: BuildMode,
    pub role: CompilationRole,
}

impl BuildConfig {
    pub fn new(mode: BuildMode, role: CompilationRole) -> Self {
        Self { mode, role }
    }

    /// Resolve the configuration a unit sees for `variant`
    pub fn resolve(variant: &LibraryVariant, defines: &DefineSet) -> Self {
        let mode = BuildMode::select(variant.kind(), defines.contains(variant.static_define()));
        let role = CompilationRole::from_defines(defines, variant.exports_define());
        tracing::debug!(
            variant = variant.base(),
            ?mode,
            ?role,
            "resolved build configuration"
        );
        Self { mode, role }
    }

    /// Every BuildMode × CompilationRole pairing
    pub fn all() -> [BuildConfig; 4] {
        [
            BuildConfig::new(BuildMode::Dynamic, CompilationRole::Building),
            BuildConfig::new(BuildMode::Dynamic, CompilationRole::Consuming),
            BuildConfig::new(BuildMode::Static, CompilationRole::Building),
            BuildConfig::new(BuildMode::Static, CompilationRole::Consuming),
        ]
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            BuildMode::Static => "static",
            BuildMode::Dynamic => "dynamic",
        };
        let role = match self.role {
            CompilationRole::Building => "building",
            CompilationRole::Consuming => "consuming",
        };
        write!(f, "{}/{}", mode, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_defaults_to_dynamic() {
        assert_eq!(BuildMode::select(LibraryKind::Shared, false), BuildMode::Dynamic);
        assert_eq!(BuildMode::select(LibraryKind::Module, false), BuildMode::Dynamic);
    }

    #[test]
    fn test_select_static_define_short_circuits() {
        assert_eq!(BuildMode::select(LibraryKind::Shared, true), BuildMode::Static);
    }

    #[test]
    fn test_select_static_kinds_are_always_static() {
        assert_eq!(BuildMode::select(LibraryKind::Static, false), BuildMode::Static);
        assert_eq!(BuildMode::select(LibraryKind::Object, false), BuildMode::Static);
    }

    #[test]
    fn test_role_from_exports_define() {
        let mut defines = DefineSet::new();
        assert_eq!(
            CompilationRole::from_defines(&defines, "rtlsdr_EXPORTS"),
            CompilationRole::Consuming
        );
        defines.define("rtlsdr_EXPORTS");
        assert_eq!(
            CompilationRole::from_defines(&defines, "rtlsdr_EXPORTS"),
            CompilationRole::Building
        );
    }

    #[test]
    fn test_define_set_parse() {
        let defines = DefineSet::parse(["FOO", "-DBAR=2", "BAZ="]).unwrap();
        assert_eq!(defines.len(), 3);
        assert_eq!(defines.value("FOO"), Some("1"));
        assert_eq!(defines.value("BAR"), Some("2"));
        assert_eq!(defines.value("BAZ"), Some(""));
        assert!(!defines.contains("QUX"));
    }

    #[test]
    fn test_define_set_from_str() {
        let defines: DefineSet = "a_EXPORTS, B=1,".parse().unwrap();
        assert!(defines.contains("a_EXPORTS"));
        assert!(defines.contains("B"));
        assert_eq!(defines.len(), 2);
    }

    #[test]
    fn test_define_set_rejects_bad_names() {
        assert!(DefineSet::parse(["1FOO"]).is_err());
        assert!(DefineSet::parse(["=1"]).is_err());
        assert!(DefineSet::parse(["FOO-BAR"]).is_err());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("SHARED".parse::<LibraryKind>().unwrap(), LibraryKind::Shared);
        assert_eq!("static".parse::<LibraryKind>().unwrap(), LibraryKind::Static);
        assert!("dll".parse::<LibraryKind>().is_err());
    }

    #[test]
    fn test_config_display() {
        let config = BuildConfig::new(BuildMode::Dynamic, CompilationRole::Consuming);
        assert_eq!(config.to_string(), "dynamic/consuming");
    }
}

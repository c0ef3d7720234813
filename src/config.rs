//! Export header manifest (`visgen.toml`)
//!
//! A manifest lists every library variant a project ships. Each variant
//! gets its own header, generated from the same rules.
//!
//! # Example visgen.toml
//!
//! ```toml
//! [[library]]
//! target = "rtlsdr"
//! kind = "shared"
//!
//! [[library]]
//! target = "rtlsdr_static"
//! kind = "static"
//! ```

use crate::error::{Result, VisgenError};
use crate::variant::{ExportHeaderOptions, LibraryVariant};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Root of visgen.toml
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Manifest {
    /// Libraries to generate headers for
    #[serde(default)]
    pub library: Vec<ExportHeaderOptions>,
}

impl Manifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build every variant, rejecting two libraries that share a header file
    pub fn variants(&self) -> Result<Vec<LibraryVariant>> {
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut variants = Vec::with_capacity(self.library.len());

        for options in &self.library {
            let variant = LibraryVariant::new(options.clone())?;
            if let Some(first) = seen.get(variant.file_name()) {
                return Err(VisgenError::DuplicateHeader {
                    file: variant.file_name().to_string(),
                    first: first.clone(),
                    second: variant.target().to_string(),
                });
            }
            seen.insert(variant.file_name().to_string(), variant.target().to_string());
            variants.push(variant);
        }
        Ok(variants)
    }

    /// Look up a variant by target name
    pub fn variant(&self, target: &str) -> Result<Option<LibraryVariant>> {
        Ok(self.variants()?.into_iter().find(|v| v.target() == target))
    }
}

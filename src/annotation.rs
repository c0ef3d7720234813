//! Declaration annotations and their ordered composition
//!
//! A declaration is decorated by an [`AnnotationList`]: visibility first,
//! deprecation second. Composition is plain list concatenation, so applying
//! a composite list is the same as applying its parts one after another.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbol visibility attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Default,
    Hidden,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Default => "default",
            Visibility::Hidden => "hidden",
        }
    }
}

/// A single attribute applied at a declaration site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Annotation {
    Visibility(Visibility),
    Deprecated,
}

impl Annotation {
    /// GCC/Clang attribute spelling
    pub fn to_c_attribute(self) -> String {
        match self {
            Annotation::Visibility(v) => format!("__attribute__((visibility(\"{}\")))", v.as_str()),
            Annotation::Deprecated => "__attribute__ ((__deprecated__))".to_string(),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_c_attribute())
    }
}

/// Ordered list of annotations; empty means no-op
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationList(Vec<Annotation>);

impl AnnotationList {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn single(annotation: Annotation) -> Self {
        Self(vec![annotation])
    }

    /// Concatenate `other` after `self`
    pub fn then(mut self, other: AnnotationList) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn is_noop(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.0
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.0.iter().find_map(|a| match a {
            Annotation::Visibility(v) => Some(*v),
            Annotation::Deprecated => None,
        })
    }

    pub fn is_deprecated(&self) -> bool {
        self.0.contains(&Annotation::Deprecated)
    }

    /// Space-joined C attribute text, empty for a no-op list
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|a| a.to_c_attribute())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for AnnotationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

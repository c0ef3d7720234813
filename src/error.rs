//! Error types for visibility resolution and header generation

use thiserror::Error;

/// Errors raised while building variants, rendering headers or reading manifests
#[derive(Error, Debug)]
pub enum VisgenError {
    #[error("Invalid C identifier for {field}: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("Invalid define: {0:?} (expected NAME or NAME=VALUE)")]
    InvalidDefine(String),

    #[error("Unknown library kind: {0} (expected shared, module, static or object)")]
    UnknownKind(String),

    #[error("Duplicate export header {file} (libraries {first} and {second})")]
    DuplicateHeader {
        file: String,
        first: String,
        second: String,
    },

    #[error("Preprocess error at line {line}: {message}")]
    Preprocess { line: usize, message: String },

    #[error("Manifest error: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for visgen operations
pub type Result<T> = std::result::Result<T, VisgenError>;

//! visgen - Symbol visibility resolution and export header generation
//!
//! This library models the decision of how a library's public symbols are
//! decorated per translation unit: exported from a shared object, hidden
//! inside it, or left unmarked in a static archive, optionally combined
//! with a deprecation marker. The same rules generate the include-guarded
//! export header consumers compile against.

pub mod annotation;
pub mod build_config;
pub mod cli;
pub mod composer;
pub mod config;
pub mod error;
pub mod header;
pub mod preprocess;
pub mod report;
pub mod resolver;
pub mod variant;

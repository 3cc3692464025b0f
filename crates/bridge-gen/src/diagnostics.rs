//! Error types
//!
//! Every failure is fatal for the current generation run. The three
//! contract errors carry the file, the declaration being processed and
//! the offending type or name so the source can be fixed and rerun.

use crate::source::Location;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for bridge generation
pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The requested component is missing or is not a class declaration
    #[error("{}: component `{name}` not found: {reason}", file.display())]
    ComponentNotFound {
        file: PathBuf,
        name: String,
        reason: String,
    },

    /// A type on the public surface cannot be expressed as a type shape
    #[error("{location}: unsupported type `{ty}` in `{decl}`: {reason}")]
    UnsupportedType {
        location: Location,
        decl: String,
        ty: String,
        reason: String,
    },

    /// A referenced type has no local declaration and is not an accepted import
    #[error("{location}: cannot resolve type `{name}` referenced from `{decl}` in the source file or its imports")]
    UnresolvedReference {
        location: Location,
        decl: String,
        name: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TypeScript parse error in {}: {message}", file.display())]
    TypeScriptParse { file: PathBuf, message: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    pub fn config(message: impl Into<String>) -> Self {
        BridgeError::Config(message.into())
    }

    /// True for the errors that describe a problem in the component source
    /// rather than in the environment
    pub fn is_contract_error(&self) -> bool {
        matches!(
            self,
            BridgeError::ComponentNotFound { .. }
                | BridgeError::UnsupportedType { .. }
                | BridgeError::UnresolvedReference { .. }
        )
    }
}

// This module defines the error types for main_maker using the thiserror crate.
// EmitError covers the ways building or writing the demo module can fail: IR
// builder failures reported by LLVM, verifier rejections, target machine setup
// problems, names LLVM cannot take, clashing function declarations and I/O failures on the output destination. Each
// variant carries enough context (reason strings, paths) to print a useful
// message through the Display implementation thiserror derives.

//! Error types for the demo emitter.

use std::path::PathBuf;

use inkwell::builder::BuilderError;
use thiserror::Error;

/// Main error type for emitting and writing the module.
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("IR builder failed: {0}")]
    Builder(#[from] BuilderError),

    #[error("Module verification failed: {reason}")]
    Verification {
        reason: String,
    },

    #[error("Target setup failed: {reason}")]
    Target {
        reason: String,
    },

    #[error("Invalid {field} {name:?}: names cannot contain NUL bytes")]
    InvalidName {
        field: &'static str,
        name: String,
    },

    #[error("Function {name} already exists with an incompatible signature")]
    SignatureMismatch {
        name: String,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for emit operations.
pub type EmitResult<T> = Result<T, EmitError>;

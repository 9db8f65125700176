//! The CLI-boundary error type.
//!
//! The core crate only ever fails with a [`lingua::Diagnostic`], already
//! printed to stderr by [`crate::report`] before we get here; everything in
//! this enum is a failure of the *surrounding* process (files, subprocesses,
//! host detection) rather than of the compiled program itself.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("could not read '{path}': {source}")]
    ReadSource { path: PathBuf, #[source] source: std::io::Error },

    #[error("could not write '{path}': {source}")]
    WriteOutput { path: PathBuf, #[source] source: std::io::Error },

    #[error("could not run '{path}': {source}")]
    Spawn { path: PathBuf, #[source] source: std::io::Error },

    #[error("aborting due to previous error")]
    Compile,

    #[error("no default target for host platform {os}/{arch}; pass --target explicitly")]
    UnknownHostTarget { os: String, arch: String },
}

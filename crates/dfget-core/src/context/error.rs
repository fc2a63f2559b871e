//! Error types for context assembly.

use std::io;
use std::path::PathBuf;

/// Why a run context was rejected. Every variant is fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// A required logger handle was never attached.
    #[error("{0} handle is missing")]
    MissingCollaborator(&'static str),
    /// The URL does not have the shape of an http(s) address with a host.
    #[error("invalid url: {url}")]
    InvalidUrl { url: String },
    /// The destination could not be resolved or is unsafe to write.
    #[error("invalid output {}: {reason}", .path.display())]
    InvalidOutput { path: PathBuf, reason: OutputProblem },
}

#[derive(Debug, thiserror::Error)]
pub enum OutputProblem {
    #[error("cannot derive a file name from url [{url}]")]
    NoFileName { url: String },
    #[error("cannot read current directory: {0}")]
    CurrentDir(#[source] io::Error),
    #[error("path is a directory but a file path is required")]
    IsDirectory,
    #[error("not writable by user [{user}]: {source}")]
    NotWritable {
        user: String,
        #[source]
        source: io::Error,
    },
}

impl ContextError {
    pub(crate) fn output(path: impl Into<PathBuf>, reason: OutputProblem) -> Self {
        ContextError::InvalidOutput {
            path: path.into(),
            reason,
        }
    }
}

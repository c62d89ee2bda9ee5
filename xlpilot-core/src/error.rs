use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by the configuration store and the launch dispatcher.
#[derive(Debug, Error)]
pub enum XlPilotError {
    /// Backing file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Document shape does not match the expected record graph.
    #[error("malformed document {origin}: {reason}")]
    Malformed { origin: String, reason: String },

    /// Destination is not a writable file path.
    #[error("invalid destination path: {}", .0.display())]
    InvalidDestination(PathBuf),

    #[error("no directory specified for button \"{0}\"")]
    MissingWorkingDirectory(String),

    #[error("file not found: {}", .0.display())]
    MissingTargetFile(PathBuf),

    #[error("unrecognized special action: \"{0}\"")]
    UnrecognizedSpecialAction(String),

    #[error("unsupported button type: \"{0}\"")]
    UnsupportedButtonKind(String),

    #[error("action {0} requires a selected XL installation")]
    MissingInstallation(String),

    #[error("failed to launch {}: {source}", program.display())]
    LaunchFailed {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// User input contains characters that may not be persisted.
    #[error("{field} contains forbidden characters: {characters}")]
    ForbiddenCharacters {
        field: &'static str,
        characters: String,
    },

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("XML serialization failed: {0}")]
    Serialize(#[from] quick_xml::SeError),

    #[error("unexpected failure: {0}")]
    Internal(String),
}

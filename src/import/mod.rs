//! Library import: export worker handshake and incremental streaming.

pub mod manifest;
pub mod pipeline;
pub mod worker;

use std::time::Duration;
use thiserror::Error;

use crate::core::errors::CoreError;

pub use manifest::{Manifest, ManifestBrush, ManifestTexture};
pub use pipeline::{ImportOptions, ImportState, ImportSummary, LibraryImport, StepOutcome};
pub use worker::{ProcessLauncher, WorkerHandle, WorkerInvocation, WorkerLauncher};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Library path is empty")]
    EmptyPath,

    #[error("Import already started")]
    AlreadyStarted,

    #[error("Another import is streaming into this mode")]
    Busy,

    #[error("Import not running")]
    NotStarted,

    #[error("Failed to spawn export worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Timed out after {waited:?} waiting for {phase}")]
    ManifestTimeout { phase: &'static str, waited: Duration },

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Import cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Data(#[from] CoreError),
}

impl From<ImportError> for String {
    fn from(err: ImportError) -> Self {
        err.to_string()
    }
}

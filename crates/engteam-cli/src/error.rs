use std::path::PathBuf;
use thiserror::Error;

/// Failures a command reports to the user as-is
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No agents or skills found in catalog {root:?}")]
    EmptyCatalog { root: PathBuf },

    #[error("No engineering-team configuration found in {dir:?}. Run `engineering-team init` first.")]
    NotConfigured { dir: PathBuf },

    #[error("Could not read project configuration for {dir:?}")]
    ProjectMissing { dir: PathBuf },

    #[error("Unknown {kind} '{name}', not in the catalog")]
    UnknownName { kind: &'static str, name: String },

    #[error("Invalid stack item '{0}', expected type:name[@version]")]
    InvalidStackItem(String),
}

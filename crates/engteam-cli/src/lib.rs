//! engineering-team command-line tool
//!
//! Configures agents and skills from a catalog into project directories and
//! records each project's selection in a local SQLite file.

pub mod commands;
pub mod config;
pub mod error;
pub mod prompts;
pub mod render;

pub use commands::{Context, Outcome};
pub use config::Config;
pub use error::CommandError;

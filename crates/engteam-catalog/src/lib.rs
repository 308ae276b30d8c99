//! Engineering Team Catalog
//!
//! Reads the bundled catalog of agent and skill definitions and places
//! selected entries into a project.
//!
//! ## Layout
//!
//! - `agents/<name>.md`: agent document with YAML frontmatter
//!   (`name`, `description`, `tools`, `model`, `skills`)
//! - `skills/<category>/<skill>/SKILL.md`: skill document, optionally with
//!   `references/` and `assets/` directories
//!
//! ## Flow
//!
//! 1. [`build_registry`] discovers every entry into a [`Registry`](engteam_types::Registry)
//! 2. [`resolve_skill_dependencies`] expands an agent selection into required skills
//! 3. A [`Materializer`] copies chosen entries into the project

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_imports,
    unused_variables
)]

pub mod frontmatter;
pub mod materializer;
pub mod registry;
pub mod resolver;

pub use frontmatter::{parse_frontmatter, DocumentMetadata, Frontmatter};
pub use materializer::{install_all, FsMaterializer, InstallReport, Materializer};
pub use registry::{build_registry, discover_agents, discover_skills};
pub use resolver::{resolve_skill_dependencies, SkillRequirements};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{build_registry, resolve_skill_dependencies, FsMaterializer, Materializer};
}

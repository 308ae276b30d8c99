//! Engineering Team Types - Core types shared across the workspace
//!
//! Catalog entries (agents, skills, categories) and the persisted project
//! record shapes.

pub mod catalog;
pub mod project;

pub use catalog::{
    category_display_name, Agent, Registry, Skill, SkillCategory, DEFAULT_DESCRIPTION,
};
pub use project::{ProjectId, ProjectRecord, StackItem};

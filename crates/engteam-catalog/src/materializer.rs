//! Copying catalog resources into a project
//!
//! Agents land in `<dest>/agents/<file>.md`, skills in `<dest>/skills/<name>/`.

use anyhow::{anyhow, bail, Context, Result};
use engteam_types::{Agent, Registry, Skill};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::registry::{
    is_safe_name, AGENTS_DIR, ASSETS_DIR, REFERENCES_DIR, SKILLS_DIR, SKILL_FILE,
};

/// Places catalog resources into a destination directory
pub trait Materializer {
    /// Copy an agent document, overwriting any previous copy
    fn place_agent(&self, agent: &Agent, dest_root: &Path) -> Result<PathBuf>;

    /// Copy a skill directory, replacing any previous copy
    fn place_skill(&self, skill: &Skill, dest_root: &Path) -> Result<PathBuf>;
}

/// Plain file-system copy
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMaterializer;

impl FsMaterializer {
    /// Create a file-system materializer
    pub fn new() -> Self {
        Self
    }
}

/// Recursively copy `src` into `dest`
fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", src))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("Unexpected path {:?} under {:?}", entry.path(), src))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {:?}", target))?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {:?} to {:?}", entry.path(), target))?;
        }
    }
    Ok(())
}

impl Materializer for FsMaterializer {
    fn place_agent(&self, agent: &Agent, dest_root: &Path) -> Result<PathBuf> {
        let agents_dir = dest_root.join(AGENTS_DIR);
        fs::create_dir_all(&agents_dir)
            .with_context(|| format!("Failed to create {:?}", agents_dir))?;

        let file_name = agent
            .file_path
            .file_name()
            .ok_or_else(|| anyhow!("Agent '{}' has no source file name", agent.name))?;
        let dest = agents_dir.join(file_name);

        fs::copy(&agent.file_path, &dest)
            .with_context(|| format!("Failed to copy {:?} to {:?}", agent.file_path, dest))?;
        debug!("Placed agent {} at {:?}", agent.name, dest);
        Ok(dest)
    }

    fn place_skill(&self, skill: &Skill, dest_root: &Path) -> Result<PathBuf> {
        if !is_safe_name(&skill.name) {
            bail!("Refusing to place skill with unusable name '{}'", skill.name);
        }
        let dest = dest_root.join(SKILLS_DIR).join(&skill.name);

        if dest.exists() {
            fs::remove_dir_all(&dest)
                .with_context(|| format!("Failed to remove previous copy {:?}", dest))?;
        }
        fs::create_dir_all(&dest).with_context(|| format!("Failed to create {:?}", dest))?;

        let src_file = skill.dir_path.join(SKILL_FILE);
        fs::copy(&src_file, dest.join(SKILL_FILE))
            .with_context(|| format!("Failed to copy {:?}", src_file))?;

        for (present, sub_dir) in [
            (skill.has_references, REFERENCES_DIR),
            (skill.has_assets, ASSETS_DIR),
        ] {
            if present {
                copy_tree(&skill.dir_path.join(sub_dir), &dest.join(sub_dir))?;
            }
        }

        debug!("Placed skill {} at {:?}", skill.name, dest);
        Ok(dest)
    }
}

/// Outcome of placing a batch of named resources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Placed agent documents
    pub agents: Vec<PathBuf>,
    /// Placed skill directories
    pub skills: Vec<PathBuf>,
    /// Requested agent names absent from the catalog
    pub missing_agents: Vec<String>,
    /// Requested skill names absent from the catalog
    pub missing_skills: Vec<String>,
}

impl InstallReport {
    /// Whether any requested name was absent from the catalog
    pub fn has_missing(&self) -> bool {
        !self.missing_agents.is_empty() || !self.missing_skills.is_empty()
    }
}

/// Place every named agent and skill found in `registry` under `dest_root`
pub fn install_all(
    materializer: &dyn Materializer,
    registry: &Registry,
    agent_names: &[String],
    skill_names: &[String],
    dest_root: &Path,
) -> Result<InstallReport> {
    let mut report = InstallReport::default();

    for name in agent_names {
        match registry.get_agent(name) {
            Some(agent) => report.agents.push(materializer.place_agent(agent, dest_root)?),
            None => {
                warn!("Agent '{}' not found in catalog", name);
                report.missing_agents.push(name.clone());
            }
        }
    }

    for name in skill_names {
        match registry.get_skill(name) {
            Some(skill) => report.skills.push(materializer.place_skill(skill, dest_root)?),
            None => {
                warn!("Skill '{}' not found in catalog", name);
                report.missing_skills.push(name.clone());
            }
        }
    }

    Ok(report)
}

//! Catalog discovery
//!
//! Walks the catalog layout and builds a [`Registry`] snapshot:
//! - `<root>/agents/*.md`: one document per agent
//! - `<root>/skills/<category>/<skill>/SKILL.md`: one directory per skill

use engteam_types::{Agent, Registry, Skill, SkillCategory, DEFAULT_DESCRIPTION};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::frontmatter::parse_frontmatter;

/// Directory under the catalog root holding agent documents
pub const AGENTS_DIR: &str = "agents";
/// Directory under the catalog root holding skill categories
pub const SKILLS_DIR: &str = "skills";
/// Primary document every skill directory must contain
pub const SKILL_FILE: &str = "SKILL.md";
/// Optional skill sub-directory with reference material
pub const REFERENCES_DIR: &str = "references";
/// Optional skill sub-directory with assets
pub const ASSETS_DIR: &str = "assets";

/// Whether `name` can be used as a single path component under the install root
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

/// Directory entries of `dir` sorted by file name; empty if unreadable
fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot read directory {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    paths
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Discover all agents under `<catalog_root>/agents`, ordered by file name
pub fn discover_agents(catalog_root: &Path) -> Vec<Agent> {
    let agents_dir = catalog_root.join(AGENTS_DIR);
    if !agents_dir.is_dir() {
        debug!("Agents directory does not exist: {:?}", agents_dir);
        return Vec::new();
    }

    let mut agents = Vec::new();
    for path in sorted_entries(&agents_dir) {
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "md") {
            continue;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping unreadable agent document {:?}: {}", path, e);
                continue;
            }
        };

        let metadata = parse_frontmatter(&content).metadata();
        let name = metadata
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(&path));
        if !is_safe_name(&name) {
            warn!("Skipping agent {:?}: unusable name '{}'", path, name);
            continue;
        }

        let agent = Agent {
            description: metadata
                .description()
                .unwrap_or(DEFAULT_DESCRIPTION)
                .to_string(),
            tools: metadata.tools,
            model: metadata.model,
            skills: metadata.skills,
            ..Agent::new(name, path.clone())
        };
        debug!("Discovered agent: {} at {:?}", agent.name, path);
        agents.push(agent);
    }

    agents
}

/// Load one skill directory; `None` when it has no primary document
fn load_skill(category: &str, skill_dir: &Path) -> Option<Skill> {
    let skill_file = skill_dir.join(SKILL_FILE);
    if !skill_file.is_file() {
        debug!("Skipping {:?}: {} not found", skill_dir, SKILL_FILE);
        return None;
    }

    let content = match fs::read_to_string(&skill_file) {
        Ok(content) => content,
        Err(e) => {
            warn!("Skipping unreadable skill document {:?}: {}", skill_file, e);
            return None;
        }
    };

    let metadata = parse_frontmatter(&content).metadata();
    let name = metadata
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| dir_name(skill_dir));
    if !is_safe_name(&name) {
        warn!("Skipping skill {:?}: unusable name '{}'", skill_dir, name);
        return None;
    }

    Some(Skill {
        description: metadata
            .description()
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string(),
        has_references: skill_dir.join(REFERENCES_DIR).exists(),
        has_assets: skill_dir.join(ASSETS_DIR).exists(),
        ..Skill::new(name, category, skill_dir)
    })
}

/// Discover all skill categories under `<catalog_root>/skills`.
///
/// Categories and skills are ordered by directory name. Categories without
/// any skill are left out.
pub fn discover_skills(catalog_root: &Path) -> Vec<SkillCategory> {
    let skills_dir = catalog_root.join(SKILLS_DIR);
    if !skills_dir.is_dir() {
        debug!("Skills directory does not exist: {:?}", skills_dir);
        return Vec::new();
    }

    let mut categories = Vec::new();
    for category_dir in sorted_entries(&skills_dir) {
        if !category_dir.is_dir() {
            continue;
        }

        let mut category = SkillCategory::new(dir_name(&category_dir));
        for skill_dir in sorted_entries(&category_dir) {
            if !skill_dir.is_dir() {
                continue;
            }
            if let Some(skill) = load_skill(&category.name, &skill_dir) {
                debug!("Discovered skill: {} in {}", skill.name, category.name);
                category.skills.push(skill);
            }
        }

        if category.skills.is_empty() {
            debug!("Dropping empty skill category: {}", category.name);
        } else {
            categories.push(category);
        }
    }

    categories
}

fn warn_duplicates<'a>(kind: &str, names: impl Iterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            warn!("Duplicate {} name '{}' in catalog; the first one wins", kind, name);
        }
    }
}

/// Build the complete registry of agents and skills for `catalog_root`
pub fn build_registry(catalog_root: &Path) -> Registry {
    let registry = Registry::new(discover_agents(catalog_root), discover_skills(catalog_root));

    warn_duplicates("agent", registry.agents.iter().map(|a| a.name.as_str()));
    warn_duplicates("skill", registry.skill_names().into_iter());

    info!(
        "Catalog {:?}: {} agents, {} skills in {} categories",
        catalog_root,
        registry.agents.len(),
        registry.all_skills().len(),
        registry.categories.len()
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_missing_directories_yield_empty() {
        let temp = TempDir::new().unwrap();
        assert!(discover_agents(temp.path()).is_empty());
        assert!(discover_skills(temp.path()).is_empty());
        assert!(build_registry(temp.path()).is_empty());
    }

    #[test]
    fn test_agents_sorted_with_defaults() {
        let temp = TempDir::new().unwrap();
        let agents = temp.path().join(AGENTS_DIR);
        write(&agents.join("zeta.md"), "---\nname: zeta-agent\n---\nbody");
        write(&agents.join("alpha.md"), "# no frontmatter at all");
        write(&agents.join("notes.txt"), "---\nname: ignored\n---\n");

        let found = discover_agents(temp.path());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "alpha");
        assert_eq!(found[0].description, DEFAULT_DESCRIPTION);
        assert!(found[0].skills.is_empty());
        assert_eq!(found[1].name, "zeta-agent");
        assert_eq!(found[1].file_path, agents.join("zeta.md"));
    }

    #[test]
    fn test_skill_without_primary_document_is_skipped() {
        let temp = TempDir::new().unwrap();
        let skills = temp.path().join(SKILLS_DIR);
        write(&skills.join("languages/rust/SKILL.md"), "---\nname: rust\n---\n");
        fs::create_dir_all(skills.join("languages/go")).unwrap();
        fs::create_dir_all(skills.join("cloud/aws/references")).unwrap();

        let categories = discover_skills(temp.path());
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "languages");
        assert_eq!(categories[0].skills.len(), 1);
        assert_eq!(categories[0].skills[0].name, "rust");
    }

    #[test]
    fn test_skill_sub_resources() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(SKILLS_DIR).join("frameworks/react");
        write(&dir.join(SKILL_FILE), "---\ndescription: UI library\n---\n");
        fs::create_dir_all(dir.join(REFERENCES_DIR)).unwrap();

        let categories = discover_skills(temp.path());
        let skill = &categories[0].skills[0];
        assert_eq!(skill.name, "react");
        assert_eq!(skill.category, "frameworks");
        assert_eq!(skill.description, "UI library");
        assert!(skill.has_references);
        assert!(!skill.has_assets);
        assert_eq!(categories[0].display_name, "Frameworks");
    }

    #[test]
    fn test_names_escaping_the_install_root_are_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(&root.join("agents/sneaky.md"), "---\nname: ../sneaky\n---\n");
        write(&root.join("agents/ok.md"), "---\nname: ok\n---\n");
        write(
            &root.join(SKILLS_DIR).join("misc/escape").join(SKILL_FILE),
            "---\nname: ../../outside\n---\n",
        );
        write(
            &root.join(SKILLS_DIR).join("misc/dots").join(SKILL_FILE),
            "---\nname: ..\n---\n",
        );

        let registry = build_registry(root);
        assert_eq!(registry.agent_names(), vec!["ok"]);
        assert!(registry.categories.is_empty());
    }

    #[test]
    fn test_is_safe_name() {
        assert!(is_safe_name("typescript"));
        assert!(is_safe_name("test-tools.v2"));
        assert!(!is_safe_name(""));
        assert!(!is_safe_name(".."));
        assert!(!is_safe_name("a/b"));
        assert!(!is_safe_name("a\\b"));
    }

    #[test]
    fn test_numeric_model_keeps_declared_skills() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("agents/ml-dev.md"),
            "---\nname: ml-dev\ndescription: ML engineer\nmodel: 4\nskills: [python]\n---\n",
        );

        let agents = discover_agents(temp.path());
        assert_eq!(agents[0].description, "ML engineer");
        assert_eq!(agents[0].model.as_deref(), Some("4"));
        assert_eq!(agents[0].skills, vec!["python"]);
    }

    #[test]
    fn test_build_registry_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for name in ["c", "a", "b"] {
            write(&root.join(AGENTS_DIR).join(format!("{name}.md")), "");
            write(
                &root.join(SKILLS_DIR).join("misc").join(name).join(SKILL_FILE),
                "",
            );
        }

        let first = build_registry(root);
        let second = build_registry(root);
        assert_eq!(first, second);
        assert_eq!(first.agent_names(), vec!["a", "b", "c"]);
        assert_eq!(first.skill_names(), vec!["a", "b", "c"]);
    }
}

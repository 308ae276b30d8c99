//! Text and JSON output for command results

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use engteam_catalog::InstallReport;
use engteam_types::{Agent, ProjectRecord, Registry, SkillCategory, StackItem};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Shown in place of a description for names the catalog no longer has
pub const NOT_IN_REGISTRY: &str = "Not found in registry";

/// Shorten `text` to at most `max` characters, ending in "..." when cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Bold, underlined section title
pub fn heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    table
}

// =============================================================================
// Catalog listing
// =============================================================================

fn agents_table(agents: &[Agent]) -> Table {
    let mut table = new_table(vec!["Name", "Description", "Model"]);
    for agent in agents {
        table.add_row(vec![
            agent.name.clone(),
            truncate(&agent.description, 60),
            agent.model.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}

fn category_table(category: &SkillCategory) -> Table {
    let mut table = new_table(vec!["Name", "Description", "Refs", "Assets"]);
    let flag = |present: bool| (if present { "Yes" } else { "-" }).to_string();
    for skill in &category.skills {
        table.add_row(vec![
            skill.name.clone(),
            truncate(&skill.description, 50),
            flag(skill.has_references),
            flag(skill.has_assets),
        ]);
    }
    table
}

/// Catalog as tables; `show_agents`/`show_skills` pick the sections
pub fn catalog_text(registry: &Registry, show_agents: bool, show_skills: bool) -> String {
    let mut out = String::new();

    if show_agents && !registry.agents.is_empty() {
        out.push_str(&format!("{}\n", heading("Available Agents")));
        out.push_str(&format!("{}\n\n", agents_table(&registry.agents)));
    }

    if show_skills {
        for category in &registry.categories {
            out.push_str(&format!(
                "{}\n",
                heading(&format!("Skills: {}", category.display_name))
            ));
            out.push_str(&format!("{}\n\n", category_table(category)));
        }
    }

    if out.is_empty() {
        out.push_str("Catalog is empty.\n");
    }
    out
}

/// Catalog as JSON: `{"agents": [...], "skills": {"<category>": [...]}}`
pub fn catalog_json(registry: &Registry, show_agents: bool, show_skills: bool) -> Value {
    let mut data = Map::new();

    if show_agents {
        let agents: Vec<Value> = registry
            .agents
            .iter()
            .map(|agent| {
                json!({
                    "name": agent.name,
                    "description": agent.description,
                    "model": agent.model,
                    "tools": agent.tools,
                    "skills": agent.skills,
                })
            })
            .collect();
        data.insert("agents".to_string(), Value::Array(agents));
    }

    if show_skills {
        let mut skills = Map::new();
        for category in &registry.categories {
            let entries: Vec<Value> = category
                .skills
                .iter()
                .map(|skill| {
                    json!({
                        "name": skill.name,
                        "description": skill.description,
                        "hasReferences": skill.has_references,
                        "hasAssets": skill.has_assets,
                    })
                })
                .collect();
            skills.insert(category.name.clone(), Value::Array(entries));
        }
        data.insert("skills".to_string(), Value::Object(skills));
    }

    Value::Object(data)
}

// =============================================================================
// Project status
// =============================================================================

/// Installed agent with catalog details, when the catalog still has it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledAgent {
    pub name: String,
    pub description: Option<String>,
    pub model: Option<String>,
}

/// Installed skill with catalog details, when the catalog still has it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledSkill {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Everything `status` reports for a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStatus {
    pub project: ProjectRecord,
    pub agents: Vec<InstalledAgent>,
    pub skills: Vec<InstalledSkill>,
    pub stack: Vec<StackItem>,
}

impl ProjectStatus {
    /// Join stored names with catalog details
    pub fn new(
        project: ProjectRecord,
        registry: &Registry,
        agent_names: &[String],
        skill_names: &[String],
        stack: Vec<StackItem>,
    ) -> Self {
        let agents = agent_names
            .iter()
            .map(|name| {
                let agent = registry.get_agent(name);
                InstalledAgent {
                    name: name.clone(),
                    description: agent.map(|a| a.description.clone()),
                    model: agent.and_then(|a| a.model.clone()),
                }
            })
            .collect();

        let skills = skill_names
            .iter()
            .map(|name| {
                let skill = registry.get_skill(name);
                InstalledSkill {
                    name: name.clone(),
                    category: skill.map(|s| s.category.clone()),
                    description: skill.map(|s| s.description.clone()),
                }
            })
            .collect();

        Self {
            project,
            agents,
            skills,
            stack,
        }
    }
}

pub fn status_text(status: &ProjectStatus) -> String {
    let mut out = String::new();
    let label = status.project.name.as_deref().unwrap_or(&status.project.path);
    out.push_str(&format!("\n{} {}\n", "Project:".bold(), label));
    out.push_str(&format!("{}\n", format!("Path: {}", status.project.path).dimmed()));
    out.push_str(&format!(
        "{}\n\n",
        format!(
            "Updated: {}",
            status.project.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .dimmed()
    ));

    if status.agents.is_empty() {
        out.push_str(&format!("{}\n\n", "No agents installed.".dimmed()));
    } else {
        let mut table = new_table(vec!["Name", "Description", "Model"]);
        for agent in &status.agents {
            table.add_row(vec![
                agent.name.clone(),
                agent
                    .description
                    .as_deref()
                    .map(|d| truncate(d, 60))
                    .unwrap_or_else(|| NOT_IN_REGISTRY.to_string()),
                agent.model.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        out.push_str(&format!("{}\n{}\n\n", heading("Installed Agents"), table));
    }

    if status.skills.is_empty() {
        out.push_str(&format!("{}\n", "No skills installed.".dimmed()));
    } else {
        let mut table = new_table(vec!["Name", "Category", "Description"]);
        for skill in &status.skills {
            table.add_row(vec![
                skill.name.clone(),
                skill.category.clone().unwrap_or_else(|| "-".to_string()),
                skill
                    .description
                    .as_deref()
                    .map(|d| truncate(d, 50))
                    .unwrap_or_else(|| NOT_IN_REGISTRY.to_string()),
            ]);
        }
        out.push_str(&format!("{}\n{}\n", heading("Installed Skills"), table));
    }

    if !status.stack.is_empty() {
        let mut table = new_table(vec!["Type", "Name", "Version"]);
        for item in &status.stack {
            table.add_row(vec![
                item.stack_type.clone(),
                item.name.clone(),
                item.version.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        out.push_str(&format!("\n{}\n{}\n", heading("Stack"), table));
    }

    out
}

// =============================================================================
// Installation
// =============================================================================

/// One line per placed file, relative to `project_dir`, prefixed with `marker`
pub fn install_text(report: &InstallReport, project_dir: &Path, marker: &str) -> String {
    let relative = |path: &Path| {
        path.strip_prefix(project_dir)
            .unwrap_or(path)
            .display()
            .to_string()
    };

    let mut out = String::new();
    for (title, paths) in [("Agents", &report.agents), ("Skills", &report.skills)] {
        if paths.is_empty() {
            continue;
        }
        out.push_str(&format!("{}\n", title.bold()));
        for path in paths {
            out.push_str(&format!("  {} {}\n", marker.green(), relative(path)));
        }
    }

    for name in &report.missing_agents {
        out.push_str(&format!(
            "  {} agent '{}' not found in catalog\n",
            "!".yellow(),
            name
        ));
    }
    for name in &report.missing_skills {
        out.push_str(&format!(
            "  {} skill '{}' not found in catalog\n",
            "!".yellow(),
            name
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use engteam_types::{ProjectId, Skill, DEFAULT_DESCRIPTION};
    use std::path::PathBuf;

    fn record() -> ProjectRecord {
        let now = "2024-05-01T12:00:00Z".parse().unwrap();
        ProjectRecord {
            id: ProjectId(1),
            path: "/work/shop".to_string(),
            name: Some("shop".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    fn registry() -> Registry {
        let mut agent = Agent::new("backend-dev", "agents/backend-dev.md");
        agent.model = Some("sonnet".to_string());
        agent.tools = Some("Read, Write".to_string());
        agent.skills = vec!["typescript".to_string()];

        let mut languages = SkillCategory::new("languages");
        let mut ts = Skill::new("typescript", "languages", "skills/languages/typescript");
        ts.has_references = true;
        languages.skills.push(ts);

        Registry::new(vec![agent], vec![languages])
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("a longer description", 10), "a longe...");
        assert_eq!(truncate("a longer description", 10).chars().count(), 10);
    }

    #[test]
    fn test_catalog_json_shape() {
        let value = catalog_json(&registry(), true, true);
        assert_eq!(value["agents"][0]["name"], "backend-dev");
        assert_eq!(value["agents"][0]["model"], "sonnet");
        assert_eq!(value["agents"][0]["skills"][0], "typescript");
        assert_eq!(value["skills"]["languages"][0]["hasReferences"], true);
        assert_eq!(value["skills"]["languages"][0]["hasAssets"], false);
    }

    #[test]
    fn test_catalog_json_filters() {
        let agents_only = catalog_json(&registry(), true, false);
        assert!(agents_only.get("skills").is_none());
        let skills_only = catalog_json(&registry(), false, true);
        assert!(skills_only.get("agents").is_none());
    }

    #[test]
    fn test_catalog_text_lists_entries() {
        let text = catalog_text(&registry(), true, true);
        assert!(text.contains("backend-dev"));
        assert!(text.contains("typescript"));
        assert!(text.contains("Languages"));
        assert_eq!(catalog_text(&Registry::default(), true, true), "Catalog is empty.\n");
    }

    #[test]
    fn test_status_marks_unknown_names() {
        let status = ProjectStatus::new(
            record(),
            &registry(),
            &["backend-dev".to_string(), "retired-agent".to_string()],
            &["cobol".to_string()],
            vec![StackItem::new("language", "TypeScript")],
        );
        assert_eq!(status.agents[0].description.as_deref(), Some(DEFAULT_DESCRIPTION));
        assert_eq!(status.agents[1].description, None);
        assert_eq!(status.skills[0].category, None);

        let text = status_text(&status);
        assert!(text.contains(NOT_IN_REGISTRY));
        assert!(text.contains("retired-agent"));
        assert!(text.contains("TypeScript"));
    }

    #[test]
    fn test_install_text_relative_paths() {
        let project = PathBuf::from("/work/shop");
        let report = InstallReport {
            agents: vec![project.join(".claude/agents/backend-dev.md")],
            skills: vec![],
            missing_agents: vec![],
            missing_skills: vec!["cobol".to_string()],
        };
        let text = install_text(&report, &project, "+");
        assert!(text.contains(".claude/agents/backend-dev.md"));
        assert!(!text.contains("/work/shop/.claude"));
        assert!(text.contains("cobol"));
    }
}

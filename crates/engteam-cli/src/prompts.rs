//! Selection prompts
//!
//! Commands talk to the user only through [`SelectionUi`], so they run the
//! same with a terminal ([`DialoguerUi`]) or with answers fixed up front
//! ([`PresetUi`]).

use anyhow::Result;
use dialoguer::{Confirm, MultiSelect};
use engteam_catalog::SkillRequirements;
use engteam_types::{category_display_name, Agent, Registry, Skill};

use crate::render::truncate;

/// Answers the questions asked while configuring a project.
///
/// `Ok(None)` or `Ok(false)` means the user cancelled.
pub trait SelectionUi {
    /// Whether to replace an existing configuration
    fn confirm_reconfigure(&self) -> Result<bool>;

    /// Agent names to install
    fn choose_agents(&self, agents: &[Agent], preselected: &[String]) -> Result<Option<Vec<String>>>;

    /// Skill names to install, given the skills the chosen agents require
    fn choose_skills(
        &self,
        registry: &Registry,
        required: &SkillRequirements,
        preselected: &[String],
    ) -> Result<Option<Vec<String>>>;

    /// Final go-ahead for the chosen sets
    fn confirm_installation(&self, agents: &[String], skills: &[String]) -> Result<bool>;
}

/// Agents bucketed for display: Backend, Mobile, then General
pub fn group_agents(agents: &[Agent]) -> Vec<(&'static str, Vec<&Agent>)> {
    let mut backend = Vec::new();
    let mut mobile = Vec::new();
    let mut general = Vec::new();

    for agent in agents {
        let name = agent.name.to_lowercase();
        if name.contains("backend") {
            backend.push(agent);
        } else if name.contains("mobile") {
            mobile.push(agent);
        } else {
            general.push(agent);
        }
    }

    [("Backend", backend), ("Mobile", mobile), ("General", general)]
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .collect()
}

fn agent_label(group: &str, agent: &Agent) -> String {
    let mut label = format!(
        "[{}] {:<28} {}",
        group,
        agent.name,
        truncate(&agent.description, 50)
    );
    if !agent.skills.is_empty() {
        label.push_str(&format!("   needs: {}", agent.skills.join(", ")));
    }
    label
}

/// One row of the skill picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillChoice {
    pub name: String,
    pub label: String,
    pub checked: bool,
    pub required: bool,
}

/// Flat skill list: required skills first and checked, then the rest,
/// checked when previously installed
pub fn skill_choices(
    registry: &Registry,
    required: &SkillRequirements,
    preselected: &[String],
) -> Vec<SkillChoice> {
    let all = registry.all_skills();
    let (required_skills, additional): (Vec<_>, Vec<_>) =
        all.into_iter().partition(|s| required.contains(&s.name));

    let choice = |skill: &Skill, is_required: bool, checked: bool| SkillChoice {
        name: skill.name.clone(),
        label: format!(
            "{:<24} {}   [{}]",
            skill.name,
            truncate(&skill.description, 45),
            category_display_name(&skill.category)
        ),
        checked,
        required: is_required,
    };

    required_skills
        .into_iter()
        .map(|s| choice(s, true, true))
        .chain(
            additional
                .into_iter()
                .map(|s| choice(s, false, preselected.contains(&s.name))),
        )
        .collect()
}

/// Interactive terminal prompts
#[derive(Debug, Default)]
pub struct DialoguerUi;

impl SelectionUi for DialoguerUi {
    fn confirm_reconfigure(&self) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt("A configuration already exists. Do you want to reconfigure?")
            .default(false)
            .interact_opt()?;
        Ok(answer.unwrap_or(false))
    }

    fn choose_agents(&self, agents: &[Agent], preselected: &[String]) -> Result<Option<Vec<String>>> {
        if agents.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let mut names = Vec::new();
        let mut labels = Vec::new();
        let mut checked = Vec::new();
        for (group, members) in group_agents(agents) {
            for agent in members {
                names.push(agent.name.clone());
                labels.push(agent_label(group, agent));
                checked.push(preselected.contains(&agent.name));
            }
        }

        let picked = MultiSelect::new()
            .with_prompt("Select agents to install (space to toggle, enter to confirm)")
            .items(&labels)
            .defaults(&checked)
            .interact_opt()?;

        Ok(picked.map(|indices| indices.into_iter().map(|i| names[i].clone()).collect()))
    }

    fn choose_skills(
        &self,
        registry: &Registry,
        required: &SkillRequirements,
        preselected: &[String],
    ) -> Result<Option<Vec<String>>> {
        let choices = skill_choices(registry, required, preselected);
        if choices.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
        let checked: Vec<bool> = choices.iter().map(|c| c.checked).collect();

        let picked = MultiSelect::new()
            .with_prompt("Select skills (required skills are pre-selected)")
            .items(&labels)
            .defaults(&checked)
            .interact_opt()?;

        Ok(picked.map(|indices| {
            indices
                .into_iter()
                .map(|i| choices[i].name.clone())
                .collect()
        }))
    }

    fn confirm_installation(&self, agents: &[String], skills: &[String]) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(format!(
                "Install {} agent(s) and {} skill(s)?",
                agents.len(),
                skills.len()
            ))
            .default(true)
            .interact_opt()?;
        Ok(answer.unwrap_or(false))
    }
}

/// Answers fixed by command-line flags
#[derive(Debug, Clone, Default)]
pub struct PresetUi {
    /// Explicit agents; `None` keeps the previous selection
    pub agents: Option<Vec<String>>,
    /// Explicit skills; `None` takes required plus previously installed
    pub skills: Option<Vec<String>>,
    /// Answer yes to reconfiguring an existing project
    pub assume_yes: bool,
}

impl SelectionUi for PresetUi {
    fn confirm_reconfigure(&self) -> Result<bool> {
        Ok(self.assume_yes)
    }

    fn choose_agents(&self, _agents: &[Agent], preselected: &[String]) -> Result<Option<Vec<String>>> {
        Ok(Some(
            self.agents.clone().unwrap_or_else(|| preselected.to_vec()),
        ))
    }

    fn choose_skills(
        &self,
        registry: &Registry,
        required: &SkillRequirements,
        preselected: &[String],
    ) -> Result<Option<Vec<String>>> {
        if let Some(skills) = &self.skills {
            return Ok(Some(skills.clone()));
        }
        Ok(Some(
            skill_choices(registry, required, preselected)
                .into_iter()
                .filter(|c| c.checked)
                .map(|c| c.name)
                .collect(),
        ))
    }

    fn confirm_installation(&self, _agents: &[String], _skills: &[String]) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engteam_catalog::resolve_skill_dependencies;
    use engteam_types::SkillCategory;

    fn agent(name: &str, skills: &[&str]) -> Agent {
        let mut agent = Agent::new(name, format!("agents/{name}.md"));
        agent.skills = skills.iter().map(|s| s.to_string()).collect();
        agent
    }

    fn registry() -> Registry {
        let mut languages = SkillCategory::new("languages");
        for name in ["python", "typescript"] {
            languages
                .skills
                .push(Skill::new(name, "languages", format!("skills/languages/{name}")));
        }
        let mut cloud = SkillCategory::new("cloud");
        cloud.skills.push(Skill::new("aws", "cloud", "skills/cloud/aws"));
        Registry::new(
            vec![
                agent("code-reviewer", &[]),
                agent("backend-dev", &["typescript"]),
                agent("mobile-dev", &[]),
            ],
            vec![cloud, languages],
        )
    }

    #[test]
    fn test_group_agents() {
        let registry = registry();
        let groups = group_agents(&registry.agents);
        let names: Vec<(&str, Vec<&str>)> = groups
            .iter()
            .map(|(g, members)| (*g, members.iter().map(|a| a.name.as_str()).collect()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Backend", vec!["backend-dev"]),
                ("Mobile", vec!["mobile-dev"]),
                ("General", vec!["code-reviewer"]),
            ]
        );
    }

    #[test]
    fn test_agent_label_shows_needs() {
        let label = agent_label("Backend", &agent("backend-dev", &["typescript", "postgres"]));
        assert!(label.starts_with("[Backend] backend-dev"));
        assert!(label.ends_with("needs: typescript, postgres"));
    }

    #[test]
    fn test_skill_choices_order_and_checks() {
        let registry = registry();
        let required = resolve_skill_dependencies(&registry, &["backend-dev".to_string()]);
        let choices = skill_choices(&registry, &required, &["aws".to_string()]);

        let summary: Vec<(&str, bool, bool)> = choices
            .iter()
            .map(|c| (c.name.as_str(), c.required, c.checked))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("typescript", true, true),
                ("aws", false, true),
                ("python", false, false),
            ]
        );
        assert!(choices[0].label.contains("[Languages]"));
    }

    #[test]
    fn test_preset_ui_defaults() {
        let registry = registry();
        let ui = PresetUi::default();
        assert!(!ui.confirm_reconfigure().unwrap());

        let agents = ui
            .choose_agents(&registry.agents, &["code-reviewer".to_string()])
            .unwrap();
        assert_eq!(agents, Some(vec!["code-reviewer".to_string()]));

        let required = resolve_skill_dependencies(&registry, &["backend-dev".to_string()]);
        let skills = ui.choose_skills(&registry, &required, &[]).unwrap();
        assert_eq!(skills, Some(vec!["typescript".to_string()]));
        assert!(ui.confirm_installation(&[], &[]).unwrap());
    }

    #[test]
    fn test_preset_ui_explicit_lists() {
        let registry = registry();
        let ui = PresetUi {
            agents: Some(vec!["mobile-dev".to_string()]),
            skills: Some(vec![]),
            assume_yes: true,
        };
        assert!(ui.confirm_reconfigure().unwrap());
        assert_eq!(
            ui.choose_agents(&registry.agents, &[]).unwrap(),
            Some(vec!["mobile-dev".to_string()])
        );
        let required = SkillRequirements::new();
        assert_eq!(
            ui.choose_skills(&registry, &required, &["aws".to_string()])
                .unwrap(),
            Some(vec![])
        );
    }
}

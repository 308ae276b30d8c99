//! Skill dependency resolution for agent selections

use engteam_types::Registry;
use tracing::debug;

/// Skills required by a set of agents, in the order they were first seen,
/// each with the agents that require it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillRequirements {
    entries: Vec<(String, Vec<String>)>,
}

impl SkillRequirements {
    /// Empty set of requirements
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `agent` requires `skill`
    pub fn insert(&mut self, skill: &str, agent: &str) {
        match self.entries.iter_mut().find(|(name, _)| name == skill) {
            Some((_, agents)) => agents.push(agent.to_string()),
            None => self
                .entries
                .push((skill.to_string(), vec![agent.to_string()])),
        }
    }

    /// Agents requiring `skill`, if any
    pub fn get(&self, skill: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == skill)
            .map(|(_, agents)| agents.as_slice())
    }

    /// Whether any agent requires `skill`
    pub fn contains(&self, skill: &str) -> bool {
        self.get(skill).is_some()
    }

    /// Required skill names in first-seen order
    pub fn skill_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Skills with their requiring agents, in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, agents)| (name.as_str(), agents.as_slice()))
    }

    /// Number of distinct required skills
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no skill is required
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Required skills absent from `selected`, with their requiring agents
    pub fn missing_from(&self, selected: &[String]) -> Vec<(&str, &[String])> {
        self.iter()
            .filter(|(skill, _)| !selected.iter().any(|s| s == skill))
            .collect()
    }
}

/// Map each skill required by `agent_names` to the agents that need it.
///
/// Names missing from the registry contribute nothing.
pub fn resolve_skill_dependencies(registry: &Registry, agent_names: &[String]) -> SkillRequirements {
    let mut requirements = SkillRequirements::new();
    for name in agent_names {
        let Some(agent) = registry.get_agent(name) else {
            debug!("Agent '{}' not in catalog; no skills resolved for it", name);
            continue;
        };
        for skill in &agent.skills {
            requirements.insert(skill, name);
        }
    }
    requirements
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Description used when a catalog document does not declare one
pub const DEFAULT_DESCRIPTION: &str = "No description available";

/// An agent definition discovered in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub description: String,
    pub file_path: PathBuf,
    pub tools: Option<String>,
    pub model: Option<String>,
    /// Skills this agent requires, in declaration order
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Agent {
    pub fn new(name: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            description: DEFAULT_DESCRIPTION.to_string(),
            file_path: file_path.into(),
            tools: None,
            model: None,
            skills: Vec::new(),
        }
    }

    pub fn requires(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

/// A skill directory discovered in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub category: String,
    pub dir_path: PathBuf,
    #[serde(default)]
    pub has_references: bool,
    #[serde(default)]
    pub has_assets: bool,
}

impl Skill {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        dir_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            description: DEFAULT_DESCRIPTION.to_string(),
            category: category.into(),
            dir_path: dir_path.into(),
            has_references: false,
            has_assets: false,
        }
    }
}

/// A named group of skills
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl SkillCategory {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: category_display_name(&name),
            name,
            skills: Vec::new(),
        }
    }
}

/// Display label for a category identifier.
///
/// Known categories use a fixed label; anything else is title-cased, with
/// every letter following a non-letter starting a new word.
pub fn category_display_name(name: &str) -> String {
    match name {
        "languages" => "Languages".to_string(),
        "frameworks" => "Frameworks".to_string(),
        "databases" => "Databases".to_string(),
        "design" => "Design & Documentation".to_string(),
        "cloud" => "Cloud & Infrastructure".to_string(),
        "product" => "Product".to_string(),
        "test-tools" => "Test Tools".to_string(),
        other => title_case(other),
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Snapshot of every agent and skill in the catalog.
///
/// Built fresh for each command and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub categories: Vec<SkillCategory>,
}

impl Registry {
    pub fn new(agents: Vec<Agent>, categories: Vec<SkillCategory>) -> Self {
        Self { agents, categories }
    }

    /// Find an agent by exact name
    pub fn get_agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Find a skill by exact name across all categories
    pub fn get_skill(&self, name: &str) -> Option<&Skill> {
        self.categories
            .iter()
            .flat_map(|c| c.skills.iter())
            .find(|s| s.name == name)
    }

    /// All skills, category by category
    pub fn all_skills(&self) -> Vec<&Skill> {
        self.categories
            .iter()
            .flat_map(|c| c.skills.iter())
            .collect()
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn skill_names(&self) -> Vec<&str> {
        self.all_skills().into_iter().map(|s| s.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.categories.is_empty()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row identity of a project record in the state store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted per-directory installation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    /// Absolute project directory; unique across records
    pub path: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A technology the project uses, e.g. `language:python@3.12`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackItem {
    pub stack_type: String,
    pub name: String,
    pub version: Option<String>,
}

impl StackItem {
    pub fn new(stack_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            stack_type: stack_type.into(),
            name: name.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Parse `type:name` or `type:name@version`
    pub fn parse(raw: &str) -> Option<Self> {
        let (stack_type, rest) = raw.split_once(':')?;
        let (name, version) = match rest.split_once('@') {
            Some((name, version)) => (name, Some(version)),
            None => (rest, None),
        };
        let stack_type = stack_type.trim();
        let name = name.trim();
        if stack_type.is_empty() || name.is_empty() {
            return None;
        }
        let item = Self::new(stack_type, name);
        Some(match version.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => item.with_version(v),
            None => item,
        })
    }
}

impl fmt::Display for StackItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stack_type, self.name)?;
        if let Some(version) = &self.version {
            write!(f, "@{}", version)?;
        }
        Ok(())
    }
}

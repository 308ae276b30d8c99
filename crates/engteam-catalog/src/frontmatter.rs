//! Frontmatter parsing for catalog documents
//!
//! Each agent document and SKILL.md starts with a YAML block delimited by
//! `---` lines. A missing or malformed block never fails the caller: it
//! yields [`Frontmatter::Fallback`] and the caller applies its own defaults.

use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

/// Metadata keys recognised in a catalog document header.
///
/// Scalar values of any YAML type are kept as strings, so `model: 4` reads
/// as `"4"` instead of rejecting the whole header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    /// Declared identifier
    #[serde(deserialize_with = "scalar")]
    pub name: Option<String>,
    /// One-line summary
    #[serde(deserialize_with = "scalar")]
    pub description: Option<String>,
    /// Tool list; a YAML sequence is joined with `", "`
    #[serde(deserialize_with = "scalar_or_joined")]
    pub tools: Option<String>,
    /// Preferred model
    #[serde(deserialize_with = "scalar")]
    pub model: Option<String>,
    /// Required skill names; a single scalar becomes a one-item list
    #[serde(deserialize_with = "scalar_list")]
    pub skills: Vec<String>,
}

impl DocumentMetadata {
    /// Declared name, ignoring blank values
    pub fn name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    /// Declared description, ignoring blank values
    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// String form of a YAML scalar; `None` for null, sequences and mappings
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(scalar_string))
}

fn scalar_or_joined<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Sequence(items)) => Some(
            items
                .iter()
                .filter_map(scalar_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Some(value) => scalar_string(&value),
        None => None,
    })
}

fn scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
        Some(value) => scalar_string(&value).into_iter().collect(),
        None => Vec::new(),
    })
}

/// Result of splitting a document into header metadata and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frontmatter {
    /// Header found and parsed; `body` is the text after the closing marker
    Parsed {
        /// Parsed header values
        metadata: DocumentMetadata,
        /// Text after the closing marker
        body: String,
    },
    /// No usable header; `body` is the original document
    Fallback {
        /// The untouched document
        body: String,
    },
}

impl Frontmatter {
    /// Metadata, or empty metadata for a fallback
    pub fn metadata(&self) -> DocumentMetadata {
        match self {
            Frontmatter::Parsed { metadata, .. } => metadata.clone(),
            Frontmatter::Fallback { .. } => DocumentMetadata::default(),
        }
    }

    /// Document text after the header, or the whole document for a fallback
    pub fn body(&self) -> &str {
        match self {
            Frontmatter::Parsed { body, .. } | Frontmatter::Fallback { body } => body,
        }
    }

    /// Split into metadata (empty for a fallback) and body
    pub fn into_parts(self) -> (DocumentMetadata, String) {
        match self {
            Frontmatter::Parsed { metadata, body } => (metadata, body),
            Frontmatter::Fallback { body } => (DocumentMetadata::default(), body),
        }
    }

    /// Whether a header was found and parsed
    pub fn is_parsed(&self) -> bool {
        matches!(self, Frontmatter::Parsed { .. })
    }
}

/// Split `content` into frontmatter metadata and body
pub fn parse_frontmatter(content: &str) -> Frontmatter {
    let fallback = || Frontmatter::Fallback {
        body: content.to_string(),
    };

    if !content.starts_with("---") {
        return fallback();
    }

    // Opening marker, then everything up to the first "\n---\n"
    let frontmatter_re = match Regex::new(r"(?s)\A---(.*?)\n---\n") {
        Ok(re) => re,
        Err(e) => {
            debug!("Failed to compile frontmatter regex: {}", e);
            return fallback();
        }
    };

    let Some(captures) = frontmatter_re.captures(content) else {
        debug!("Frontmatter has no closing marker");
        return fallback();
    };

    let yaml_str = captures.get(1).map(|m| m.as_str()).unwrap_or("");
    let body_start = captures.get(0).map(|m| m.end()).unwrap_or(content.len());
    let body = content[body_start..].to_string();

    if yaml_str.trim().is_empty() {
        return Frontmatter::Parsed {
            metadata: DocumentMetadata::default(),
            body,
        };
    }

    match parse_metadata(yaml_str) {
        Ok(metadata) => Frontmatter::Parsed { metadata, body },
        Err(e) => {
            debug!("Ignoring malformed frontmatter: {}", e);
            fallback()
        }
    }
}

fn parse_metadata(yaml_str: &str) -> Result<DocumentMetadata, serde_yaml::Error> {
    match serde_yaml::from_str::<Value>(yaml_str)? {
        Value::Null => Ok(DocumentMetadata::default()),
        value @ Value::Mapping(_) => serde_yaml::from_value(value),
        other => Err(serde::de::Error::custom(format!(
            "expected a mapping, found {:?}",
            other
        ))),
    }
}

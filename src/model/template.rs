use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::edge::WorkflowEdge;
use super::node::WorkflowNode;

/// How hard a preset is to run safely.
///
/// Written in lowercase. Reading is case-insensitive, accepts the common
/// synonyms (easy, medium, hard, expert) and falls back to `Beginner` for
/// anything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

impl Difficulty {
    /// Lenient reading of a difficulty label.
    pub fn from_label(label: &str) -> Option<Difficulty> {
        match label.trim().to_ascii_lowercase().as_str() {
            "beginner" | "easy" | "basic" => Some(Difficulty::Beginner),
            "intermediate" | "medium" => Some(Difficulty::Intermediate),
            "advanced" | "hard" | "expert" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Some(label) = Option::<String>::deserialize(deserializer)? else {
            return Ok(Difficulty::default());
        };
        Ok(Difficulty::from_label(&label).unwrap_or_else(|| {
            tracing::debug!(%label, "unknown template difficulty, using beginner");
            Difficulty::default()
        }))
    }
}

/// A named, serializable snapshot of a workflow graph.
///
/// Field names are the exchange format shared with externally generated
/// templates and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

/// Descriptive fields of a template, without the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateMeta {
    pub name: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
}

impl TemplateMeta {
    pub fn named(name: impl Into<String>) -> Self {
        TemplateMeta {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl WorkflowTemplate {
    pub fn meta(&self) -> TemplateMeta {
        TemplateMeta {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

use serde::{Deserialize, Serialize};

use crate::model::template::{Difficulty, WorkflowTemplate};
use crate::model::{WorkflowEdge, WorkflowNode};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StartResponse {
    #[serde(rename = "executionId", alias = "execution_id", alias = "id")]
    pub execution_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StopRequest<'a> {
    #[serde(rename = "executionId")]
    pub execution_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub prompt: &'a str,
}

/// Nodes and edges proposed by the workflow generator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedGraph {
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
}

/// Response of `POST /api/ai/generate-workflow`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedWorkflow {
    pub success: bool,
    #[serde(default)]
    pub workflow: GeneratedGraph,
    /// Generator mode reported by the backend, e.g. "ai" or "template".
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, rename = "strategyType")]
    pub strategy_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GeneratedWorkflow {
    /// Wrap the generated graph as a template named after the prompt.
    pub fn into_template(self, prompt: &str) -> WorkflowTemplate {
        WorkflowTemplate {
            name: prompt.chars().take(60).collect(),
            description: format!("Generated from prompt: {prompt}"),
            category: self.strategy_type.unwrap_or_else(|| "generated".to_string()),
            difficulty: Difficulty::Intermediate,
            nodes: self.workflow.nodes,
            edges: self.workflow.edges,
        }
    }
}

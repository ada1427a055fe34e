//! Per-node execution status as reported by the engine.
//!
//! This crate never schedules execution; it only mirrors what the engine
//! reports. Within one pass a node moves `none → running → success|error`
//! and stays there until the next pass resets everything to `none`.

pub mod view;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::logs::LogEntry;
use crate::model::node::{ExecutionStatus, NodeId};

pub use view::{ExecutionView, RenderNode, render};

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("Node `{node_id}` already finished this pass ({from}); ignoring {to}")]
    Terminal {
        node_id: NodeId,
        from: ExecutionStatus,
        to: ExecutionStatus,
    },

    #[error("Node `{node_id}` cannot go from {from} to {to}")]
    Invalid {
        node_id: NodeId,
        from: ExecutionStatus,
        to: ExecutionStatus,
    },
}

static STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:\[[^\]]*\]\s*)?(Executing node|ERROR executing node|Executing|Execute|Completed|Success|Failed)[:\s]+'?([A-Za-z0-9_.\-]+)'?",
    )
    .expect("valid status line pattern")
});

/// Map an engine log line such as `Executing: swap-1` to a status update.
pub fn parse_status_line(message: &str) -> Option<(NodeId, ExecutionStatus)> {
    let caps = STATUS_LINE.captures(message)?;
    let status = match caps.get(1)?.as_str() {
        "Execute" | "Executing" | "Executing node" => ExecutionStatus::Running,
        "Completed" | "Success" => ExecutionStatus::Success,
        _ => ExecutionStatus::Error,
    };
    Some((caps.get(2)?.as_str().to_string(), status))
}

/// Execution status of every node for the current pass.
#[derive(Debug, Clone, Default)]
pub struct ExecutionTracker {
    statuses: HashMap<NodeId, ExecutionStatus>,
    order: Vec<NodeId>,
    pass: u64,
}

impl ExecutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass: every node goes back to `none`. `order` is the
    /// expected execution order (dependency order or engine-reported).
    pub fn begin_pass(&mut self, order: Vec<NodeId>) -> u64 {
        self.statuses.clear();
        self.order = order;
        self.pass += 1;
        tracing::debug!(pass = self.pass, nodes = self.order.len(), "execution pass started");
        self.pass
    }

    pub fn pass(&self) -> u64 {
        self.pass
    }

    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn status(&self, node_id: &str) -> ExecutionStatus {
        self.statuses.get(node_id).copied().unwrap_or_default()
    }

    /// Record a reported status. A `none → success|error` report counts as
    /// an implicit start; repeating the current status is a no-op.
    pub fn mark(&mut self, node_id: &str, to: ExecutionStatus) -> Result<(), TransitionError> {
        use ExecutionStatus as S;

        let from = self.status(node_id);
        if from == to {
            return Ok(());
        }
        match (from, to) {
            (S::None, S::Running | S::Success | S::Error) | (S::Running, S::Success | S::Error) => {
                self.statuses.insert(node_id.to_string(), to);
                Ok(())
            }
            (S::Success | S::Error, _) => Err(TransitionError::Terminal {
                node_id: node_id.to_string(),
                from,
                to,
            }),
            _ => Err(TransitionError::Invalid {
                node_id: node_id.to_string(),
                from,
                to,
            }),
        }
    }

    /// Apply a status line from the engine log. Rejected transitions are
    /// logged and dropped.
    pub fn apply_log(&mut self, entry: &LogEntry) -> Option<(NodeId, ExecutionStatus)> {
        let (node_id, status) = parse_status_line(&entry.message)?;
        match self.mark(&node_id, status) {
            Ok(()) => Some((node_id, status)),
            Err(e) => {
                tracing::warn!("{e}");
                None
            }
        }
    }

    pub fn running(&self) -> impl Iterator<Item = &str> {
        self.statuses
            .iter()
            .filter(|(_, s)| **s == ExecutionStatus::Running)
            .map(|(id, _)| id.as_str())
    }

    /// Every node in the pass order reached success or error.
    pub fn is_complete(&self) -> bool {
        !self.order.is_empty() && self.order.iter().all(|id| self.status(id).is_terminal())
    }

    pub fn has_errors(&self) -> bool {
        self.statuses.values().any(|s| *s == ExecutionStatus::Error)
    }

    pub fn statuses(&self) -> &HashMap<NodeId, ExecutionStatus> {
        &self.statuses
    }
}

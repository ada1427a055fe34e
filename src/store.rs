//! The single owner of editor state.
//!
//! The workflow graph, the log stream, the decision projection and the
//! execution tracker live here and change only through these methods.
//! Views read from accessors.

use crate::execution::{self, ExecutionTracker, ExecutionView};
use crate::graph::{GraphError, NodeDataPatch, WorkflowGraph};
use crate::logs::{AgentDecisions, LogEntry, LogStream, Projector};
use crate::model::node::{ExecutionStatus, Position, WorkflowNode};
use crate::model::template::{TemplateMeta, WorkflowTemplate};
use crate::model::{Balance, Transaction, WorkflowEdge};
use crate::sequence::{Latest, RequestSequencer, Resolution, Ticket};
use crate::validate::ValidationError;

/// Raw log lines shown next to the decision panel.
pub const DEFAULT_TAIL: usize = 50;

#[derive(Debug)]
pub struct Store {
    graph: WorkflowGraph,
    meta: TemplateMeta,
    logs: LogStream,
    projector: Projector,
    tracker: ExecutionTracker,
    execution_id: Option<String>,
    log_feed: RequestSequencer,
    balances: Latest<Vec<Balance>>,
    transactions: Latest<Vec<Transaction>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Store {
    /// Empty store; `log_capacity` bounds the retained raw log.
    pub fn new(log_capacity: Option<usize>) -> Self {
        Store {
            graph: WorkflowGraph::new(),
            meta: TemplateMeta::named("Untitled workflow"),
            logs: match log_capacity {
                Some(cap) => LogStream::with_capacity(cap),
                None => LogStream::unbounded(),
            },
            projector: Projector::new(),
            tracker: ExecutionTracker::new(),
            execution_id: None,
            log_feed: RequestSequencer::new(),
            balances: Latest::new(),
            transactions: Latest::new(),
        }
    }

    // ── Graph ───────────────────────────────────────────────────────

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn meta(&self) -> &TemplateMeta {
        &self.meta
    }

    pub fn set_meta(&mut self, meta: TemplateMeta) {
        self.meta = meta;
    }

    pub fn add_node(&mut self, node_type: &str, position: Position) -> &WorkflowNode {
        self.graph.add_node(node_type, position)
    }

    pub fn remove_node(&mut self, id: &str) -> Option<WorkflowNode> {
        self.graph.remove_node(id)
    }

    pub fn connect(
        &mut self,
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> Result<&WorkflowEdge, GraphError> {
        self.graph.connect(source, source_handle, target, target_handle)
    }

    pub fn disconnect(&mut self, edge_id: &str) -> Option<WorkflowEdge> {
        self.graph.disconnect(edge_id)
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        self.graph.move_node(id, position)
    }

    pub fn update_node_data(&mut self, id: &str, patch: &NodeDataPatch) -> Result<bool, GraphError> {
        self.graph.update_node_data(id, patch)
    }

    /// Replace the graph with a template instance. On error the current
    /// graph stays as it was.
    pub fn load_template(&mut self, template: &WorkflowTemplate) -> Result<(), Vec<ValidationError>> {
        self.graph = WorkflowGraph::from_template_with(self.graph.shared_registry(), template)?;
        self.meta = template.meta();
        self.tracker = ExecutionTracker::new();
        Ok(())
    }

    pub fn template(&self) -> WorkflowTemplate {
        self.graph.to_template(self.meta.clone())
    }

    // ── Execution ───────────────────────────────────────────────────

    pub fn execution_id(&self) -> Option<&str> {
        self.execution_id.as_deref()
    }

    /// Start following a new execution. Resets node statuses, clears the
    /// raw log and the decisions, and returns the ticket log batches for
    /// this execution must carry.
    pub fn begin_execution(&mut self, execution_id: impl Into<String>) -> Ticket {
        let execution_id = execution_id.into();
        tracing::info!(%execution_id, "following execution");

        let order = self.graph.topological_order();
        for id in &order {
            self.graph.set_status(id, ExecutionStatus::None);
        }
        self.tracker.begin_pass(order);
        self.logs.clear();
        self.projector.reset_at(self.logs.next_seq());
        self.execution_id = Some(execution_id);
        self.log_feed.issue()
    }

    /// Stop following the current execution; later batches are stale.
    pub fn end_execution(&mut self) {
        self.execution_id = None;
        self.log_feed.issue();
    }

    /// Whether batches fetched under `ticket` still belong to the followed
    /// execution.
    pub fn is_following(&self, ticket: Ticket) -> bool {
        self.log_feed.is_current(ticket)
    }

    /// Append a batch of log entries fetched under `ticket`. Batches from a
    /// superseded execution are dropped.
    pub fn accept_logs(&mut self, ticket: Ticket, entries: Vec<LogEntry>) -> Resolution {
        if !self.is_following(ticket) {
            tracing::debug!(ticket = ticket.value(), "dropping stale log batch");
            return Resolution::Stale;
        }
        self.ingest_logs(entries);
        Resolution::Applied
    }

    /// Append entries and fold them into the decisions and node statuses.
    pub fn ingest_logs(&mut self, entries: impl IntoIterator<Item = LogEntry>) -> usize {
        let mut appended = 0;
        for entry in entries {
            if let Some((node_id, status)) = self.tracker.apply_log(&entry) {
                self.graph.set_status(&node_id, status);
            }
            self.logs.append(entry);
            // Project before a later append can evict this entry.
            self.projector.catch_up(&self.logs);
            appended += 1;
        }
        appended
    }

    pub fn decisions(&self) -> &AgentDecisions {
        self.projector.decisions()
    }

    pub fn logs(&self) -> &LogStream {
        &self.logs
    }

    /// The last `n` raw log lines.
    pub fn raw_tail(&self, n: usize) -> Vec<&LogEntry> {
        self.logs.tail(n)
    }

    pub fn tracker(&self) -> &ExecutionTracker {
        &self.tracker
    }

    /// Render-ready nodes with live status.
    pub fn view(&self) -> ExecutionView {
        execution::render(&self.graph, &self.tracker)
    }

    // ── Backend data ────────────────────────────────────────────────

    pub fn balances(&self) -> &Latest<Vec<Balance>> {
        &self.balances
    }

    pub fn begin_balances(&mut self) -> Ticket {
        self.balances.begin()
    }

    pub fn resolve_balances<E: std::fmt::Display>(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Balance>, E>,
    ) -> Resolution {
        self.balances.resolve(ticket, result)
    }

    pub fn transactions(&self) -> &Latest<Vec<Transaction>> {
        &self.transactions
    }

    pub fn begin_transactions(&mut self) -> Ticket {
        self.transactions.begin()
    }

    pub fn resolve_transactions<E: std::fmt::Display>(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Transaction>, E>,
    ) -> Resolution {
        self.transactions.resolve(ticket, result)
    }
}

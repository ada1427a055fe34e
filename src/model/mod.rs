pub mod account;
pub mod config;
pub mod edge;
pub mod node;
pub mod template;

pub use account::{Balance, Transaction};
pub use config::NodeConfig;
pub use edge::WorkflowEdge;
pub use node::{ExecutionStatus, NodeId, Position, WorkflowNode};
pub use template::{Difficulty, TemplateMeta, WorkflowTemplate};

//! Node type registry: static declarations of each node type's ports and
//! default configuration.

mod catalog;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use serde::Serialize;

use crate::model::config::NodeConfig;
use crate::model::node::Ports;

/// Static declaration of a node type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTypeDescriptor {
    #[serde(rename = "type")]
    pub node_type: String,
    pub label: String,
    pub icon: String,
    pub category: String,
    pub inputs: Ports,
    pub outputs: Ports,
    #[serde(rename = "defaultConfig")]
    pub default_config: NodeConfig,
}

impl NodeTypeDescriptor {
    pub fn is_fallback(&self) -> bool {
        self.node_type == crate::model::config::kind::DEFAULT
    }
}

/// Lookup table from node type key to descriptor.
///
/// `resolve` is total: unknown keys yield the fallback descriptor.
#[derive(Debug, Clone)]
pub struct NodeTypeRegistry {
    descriptors: Vec<NodeTypeDescriptor>,
    index: HashMap<String, usize>,
    fallback: NodeTypeDescriptor,
}

static BUILTIN: LazyLock<Arc<NodeTypeRegistry>> =
    LazyLock::new(|| Arc::new(NodeTypeRegistry::with_descriptors(catalog::builtin())));

impl NodeTypeRegistry {
    /// Registry with no types besides the fallback.
    pub fn empty() -> Self {
        NodeTypeRegistry {
            descriptors: Vec::new(),
            index: HashMap::new(),
            fallback: catalog::fallback(),
        }
    }

    pub fn with_descriptors(descriptors: impl IntoIterator<Item = NodeTypeDescriptor>) -> Self {
        let mut registry = Self::empty();
        for d in descriptors {
            registry.register(d);
        }
        registry
    }

    /// Shared instance holding the built-in catalog.
    pub fn builtin() -> Arc<NodeTypeRegistry> {
        Arc::clone(&BUILTIN)
    }

    /// Add a descriptor, replacing any existing one with the same type key.
    pub fn register(&mut self, descriptor: NodeTypeDescriptor) {
        match self.index.get(&descriptor.node_type) {
            Some(&i) => self.descriptors[i] = descriptor,
            None => {
                self.index
                    .insert(descriptor.node_type.clone(), self.descriptors.len());
                self.descriptors.push(descriptor);
            }
        }
    }

    pub fn get(&self, node_type: &str) -> Option<&NodeTypeDescriptor> {
        self.index.get(node_type).map(|&i| &self.descriptors[i])
    }

    pub fn resolve(&self, node_type: &str) -> &NodeTypeDescriptor {
        self.get(node_type).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.index.contains_key(node_type)
    }

    /// Registered descriptors in registration order (fallback excluded).
    pub fn descriptors(&self) -> impl Iterator<Item = &NodeTypeDescriptor> {
        self.descriptors.iter()
    }

    pub fn fallback(&self) -> &NodeTypeDescriptor {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for NodeTypeRegistry {
    fn default() -> Self {
        Self::with_descriptors(catalog::builtin())
    }
}

//! Two-level category tree derived from a flat assignment list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::common::*;

/// A nested category. Children never carry children of their own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChildNode {
    pub id: CategoryId,
    pub name: Option<String>,
    pub notes: Option<String>,
}

/// A top-level category with its ordered children.
///
/// `name` stays `None` for a placeholder whose own record was never found.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParentNode {
    pub id: CategoryId,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub children: Vec<ChildNode>,
}

impl ParentNode {
    /// Creates a node synthesized before its defining record has been seen.
    pub fn placeholder(id: CategoryId) -> Self {
        Self {
            id,
            name: None,
            notes: None,
            children: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.name.is_none()
    }

    pub fn child(&self, id: CategoryId) -> Option<&ChildNode> {
        self.children.iter().find(|child| child.id == id)
    }
}

/// Borrowed view over either node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Parent(&'a ParentNode),
    Child {
        parent: &'a ParentNode,
        node: &'a ChildNode,
    },
}

impl<'a> NodeRef<'a> {
    pub fn notes(&self) -> Option<&'a str> {
        match *self {
            NodeRef::Parent(parent) => parent.notes.as_deref(),
            NodeRef::Child { node, .. } => node.notes.as_deref(),
        }
    }

    pub fn parent_id(&self) -> Option<CategoryId> {
        match *self {
            NodeRef::Parent(_) => None,
            NodeRef::Child { parent, .. } => Some(parent.id),
        }
    }
}

impl Identifiable for ChildNode {
    fn id(&self) -> CategoryId {
        self.id
    }
}

impl Identifiable for ParentNode {
    fn id(&self) -> CategoryId {
        self.id
    }
}

impl Identifiable for NodeRef<'_> {
    fn id(&self) -> CategoryId {
        match self {
            NodeRef::Parent(parent) => parent.id,
            NodeRef::Child { node, .. } => node.id,
        }
    }
}

impl NamedEntity for ChildNode {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl NamedEntity for ParentNode {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl NamedEntity for NodeRef<'_> {
    fn name(&self) -> Option<&str> {
        match self {
            NodeRef::Parent(parent) => parent.name.as_deref(),
            NodeRef::Child { node, .. } => node.name.as_deref(),
        }
    }
}

/// Parent nodes keyed by id, in first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTree {
    nodes: IndexMap<CategoryId, ParentNode>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: CategoryId) -> Option<&ParentNode> {
        self.nodes.get(&id)
    }

    /// Returns the parent entry for `id`, inserting a placeholder when absent.
    pub fn entry_or_placeholder(&mut self, id: CategoryId) -> &mut ParentNode {
        self.nodes
            .entry(id)
            .or_insert_with(|| ParentNode::placeholder(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParentNode> {
        self.nodes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParentNode> {
        self.nodes.values_mut()
    }

    pub fn parent_ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.nodes.keys().copied()
    }

    /// Locates a node by id, whether it is a parent or nested under one.
    pub fn find(&self, id: CategoryId) -> Option<NodeRef<'_>> {
        if let Some(parent) = self.nodes.get(&id) {
            return Some(NodeRef::Parent(parent));
        }
        self.nodes.values().find_map(|parent| {
            parent
                .child(id)
                .map(|node| NodeRef::Child { parent, node })
        })
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.find(id).is_some()
    }

    /// Total number of nodes, parents and children together.
    pub fn node_count(&self) -> usize {
        self.nodes
            .values()
            .map(|parent| 1 + parent.children.len())
            .sum()
    }
}

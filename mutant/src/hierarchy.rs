//! Flattened node hierarchies
//!
//! Nodes reference their children by position in the same flattened list, so
//! the serialized form carries no pointers and cannot express ownership
//! cycles by accident. Index validity is still checked on load.

use serde::{Deserialize, Serialize};

/// One node of a hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    /// Positions of child nodes within the owning hierarchy
    #[serde(default)]
    pub children: Vec<u32>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }
}

/// Structural problem in a hierarchy's child indices
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("node {node} references child {child}, but hierarchy has {len} nodes")]
    ChildOutOfRange { node: usize, child: u32, len: usize },

    #[error("node {node} is reachable from itself")]
    Cycle { node: usize },
}

/// Named tree of nodes, stored flat
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hierarchy {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Hierarchy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Append a node, returning its index
    pub fn add_node(&mut self, name: impl Into<String>) -> u32 {
        self.nodes.push(Node::new(name));
        (self.nodes.len() - 1) as u32
    }

    /// Append a node as the last child of `parent`, returning its index.
    ///
    /// # Panics
    /// If `parent` is not an existing node index.
    pub fn add_child(&mut self, parent: u32, name: impl Into<String>) -> u32 {
        assert!(
            (parent as usize) < self.nodes.len(),
            "parent index {} out of range",
            parent
        );
        let child = self.add_node(name);
        self.nodes[parent as usize].children.push(child);
        child
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<u32> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| i as u32)
    }

    /// Indices of nodes that no other node lists as a child
    pub fn roots(&self) -> Vec<u32> {
        let mut is_child = vec![false; self.nodes.len()];
        for node in &self.nodes {
            for &c in &node.children {
                if let Some(flag) = is_child.get_mut(c as usize) {
                    *flag = true;
                }
            }
        }
        is_child
            .iter()
            .enumerate()
            .filter(|(_, child)| !**child)
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Check that every child index is in range and the graph is acyclic.
    ///
    /// A node listed under more than one parent is accepted.
    pub fn validate(&self) -> Result<(), HierarchyError> {
        let len = self.nodes.len();
        for (node, n) in self.nodes.iter().enumerate() {
            if let Some(&child) = n.children.iter().find(|&&c| c as usize >= len) {
                return Err(HierarchyError::ChildOutOfRange { node, child, len });
            }
        }

        // Iterative three-color DFS
        const WHITE: u8 = 0;
        const GRAY: u8 = 1;
        const BLACK: u8 = 2;
        let mut color = vec![WHITE; len];
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..len {
            if color[start] != WHITE {
                continue;
            }
            color[start] = GRAY;
            stack.push((start, 0));

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let children = &self.nodes[node].children;
                if top.1 < children.len() {
                    let child = children[top.1] as usize;
                    top.1 += 1;
                    match color[child] {
                        WHITE => {
                            color[child] = GRAY;
                            stack.push((child, 0));
                        }
                        GRAY => return Err(HierarchyError::Cycle { node: child }),
                        _ => {}
                    }
                } else {
                    color[node] = BLACK;
                    stack.pop();
                }
            }
        }

        Ok(())
    }
}

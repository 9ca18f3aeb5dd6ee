//! The markdown AST container.

use super::MarkdownNode;
use serde::Serialize;
use std::fmt;

/// Ordered sequence of top-level nodes, plus front matter kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkdownAst {
    nodes: Vec<MarkdownNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    front_matter: Option<String>,
}

impl MarkdownAst {
    /// Creates an empty AST.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level node.
    pub fn add_node(&mut self, node: MarkdownNode) {
        self.nodes.push(node);
    }

    /// Returns the top-level nodes.
    pub fn nodes(&self) -> &[MarkdownNode] {
        &self.nodes
    }

    /// Returns the top-level nodes mutably.
    pub fn nodes_mut(&mut self) -> &mut [MarkdownNode] {
        &mut self.nodes
    }

    /// Consumes the AST and returns its top-level nodes.
    pub fn into_nodes(self) -> Vec<MarkdownNode> {
        self.nodes
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds the top-level node starting at the given source line.
    pub fn node_at_line(&self, line: usize) -> Option<&MarkdownNode> {
        self.nodes.iter().find(|node| node.line == line)
    }

    /// YAML front matter block (including its `---` fences), if any.
    pub fn front_matter(&self) -> Option<&str> {
        self.front_matter.as_deref()
    }

    pub fn set_front_matter(&mut self, front_matter: Option<String>) {
        self.front_matter = front_matter;
    }

    /// Pre-order walk over every node and its descendants.
    ///
    /// The callback receives the node, its index among its siblings and the
    /// sibling slice it belongs to.
    pub fn walk<F>(&self, mut callback: F)
    where
        F: FnMut(&MarkdownNode, usize, &[MarkdownNode]),
    {
        fn walk_level<F>(nodes: &[MarkdownNode], callback: &mut F)
        where
            F: FnMut(&MarkdownNode, usize, &[MarkdownNode]),
        {
            for (index, node) in nodes.iter().enumerate() {
                callback(node, index, nodes);
                walk_level(&node.children, callback);
            }
        }
        walk_level(&self.nodes, &mut callback);
    }

    /// Mutable pre-order walk.
    ///
    /// The callback receives the node, its index among its siblings and the
    /// number of siblings (the slice itself cannot be lent alongside `&mut`).
    pub fn walk_mut<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut MarkdownNode, usize, usize),
    {
        fn walk_level<F>(nodes: &mut [MarkdownNode], callback: &mut F)
        where
            F: FnMut(&mut MarkdownNode, usize, usize),
        {
            let count = nodes.len();
            for (index, node) in nodes.iter_mut().enumerate() {
                callback(node, index, count);
                walk_level(&mut node.children, callback);
            }
        }
        walk_level(&mut self.nodes, &mut callback);
    }

    /// Total number of nodes including descendants.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _, _| count += 1);
        count
    }
}

impl fmt::Display for MarkdownAst {
    /// Renders nodes one after another without spacing hints.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .nodes
            .iter()
            .map(crate::render::render_node)
            .collect();
        f.write_str(&rendered.join("\n"))
    }
}

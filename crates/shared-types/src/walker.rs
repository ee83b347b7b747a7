//! Read-only traversal of the structure tree
//!
//! All lookups borrow the tree; mutation goes through the auto-fix engine.

use crate::structure::{Document, NodeId, StructureNode, Tag};

/// Lazy pre-order iterator over a subtree
pub struct PreOrder<'a> {
    stack: Vec<&'a StructureNode>,
}

impl<'a> PreOrder<'a> {
    pub fn new(root: &'a StructureNode) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a StructureNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl StructureNode {
    /// Pre-order traversal of this node and its descendants
    pub fn walk(&self) -> PreOrder<'_> {
        PreOrder::new(self)
    }

    /// Subtree text in document order, whitespace normalized
    pub fn text_content(&self) -> String {
        self.walk()
            .flat_map(|node| node.text.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Path of nodes from this node down to `id`, both ends included
    pub fn path_to(&self, id: NodeId) -> Option<Vec<&StructureNode>> {
        if self.id == id {
            return Some(vec![self]);
        }
        for child in &self.children {
            if let Some(mut path) = child.path_to(id) {
                path.insert(0, self);
                return Some(path);
            }
        }
        None
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut StructureNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }
}

impl Document {
    pub fn walk(&self) -> PreOrder<'_> {
        self.root.walk()
    }

    pub fn find(&self, id: NodeId) -> Option<&StructureNode> {
        self.walk().find(|node| node.id == id)
    }

    /// Mutable lookup, reserved for the auto-fix engine
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut StructureNode> {
        self.root.find_mut(id)
    }

    /// All nodes matching `predicate`, in document order
    pub fn find_all<P>(&self, predicate: P) -> Vec<&StructureNode>
    where
        P: Fn(&StructureNode) -> bool,
    {
        self.walk().filter(|node| predicate(node)).collect()
    }

    pub fn find_by_tag(&self, tag: Tag) -> Vec<&StructureNode> {
        self.find_all(|node| node.tag == tag)
    }

    pub fn headings(&self) -> Vec<&StructureNode> {
        self.find_all(|node| node.tag.is_heading())
    }

    /// Ancestors of `id`, nearest first. Empty for the root or an unknown id.
    pub fn ancestors(&self, id: NodeId) -> Vec<&StructureNode> {
        match self.root.path_to(id) {
            Some(mut path) => {
                path.pop();
                path.reverse();
                path
            }
            None => Vec::new(),
        }
    }

    pub fn has_ancestor_tag(&self, id: NodeId, tag: Tag) -> bool {
        self.ancestors(id).iter().any(|node| node.tag == tag)
    }

    /// Heading of the section containing `id`: the nearest heading that is an
    /// ancestor of the node or precedes it in reading order.
    pub fn nearest_heading(&self, id: NodeId) -> Option<&StructureNode> {
        let mut current = None;
        for node in self.walk() {
            if node.id == id {
                return current;
            }
            if node.tag.is_heading() {
                current = Some(node);
            }
        }
        None
    }

    /// Page of a node, inherited from the nearest ancestor that has one
    pub fn effective_page(&self, id: NodeId) -> Option<u32> {
        self.root
            .path_to(id)?
            .iter()
            .rev()
            .find_map(|node| node.page)
    }

    /// True when any node carries extractable text
    pub fn has_text(&self) -> bool {
        self.walk().any(|node| node.has_text())
    }
}

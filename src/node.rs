//! Shared packed parse forests.
//!
//! Every node covers a span `[start, end)` of the input and records each way
//! that span can be derived as a *family* of at most two children. A node
//! with more than one family is a packing point for ambiguity: the
//! alternatives share the node instead of duplicating the subtrees above it.
//!
//! Nodes are owned by a [`Forest`] arena and referred to by [`NodeId`]. The
//! forest is only grown by the Earley engine; callers get it back read-only.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range;

mod tree;

pub use tree::{Tree, TreeMaker};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Label<T, N> {
    Terminal(T),
    Nonterminal(N),
    /// A proper prefix `X_1 ... X_dot` of the body of rule `rule`. Only used
    /// to keep the forest binary.
    Intermediate { rule: usize, dot: usize },
}

impl<T, N> Label<T, N> {
    pub fn is_intermediate(&self) -> bool {
        matches!(self, Label::Intermediate { .. })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Family {
    /// The node derives the empty string.
    Epsilon,
    Unary(NodeId),
    Binary(NodeId, NodeId),
}

impl Family {
    /// The child in position `slot`, if the family has that many children.
    pub fn child(&self, slot: usize) -> Option<NodeId> {
        match (*self, slot) {
            (Family::Unary(c), 0) => Some(c),
            (Family::Binary(l, _), 0) => Some(l),
            (Family::Binary(_, r), 1) => Some(r),
            _ => None,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..2).map_while(move |slot| self.child(slot))
    }

    pub fn arity(&self) -> usize {
        self.children().count()
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SppfNode<T, N> {
    pub(crate) label: Label<T, N>,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) families: Vec<Family>,
}

impl<T, N> SppfNode<T, N> {
    pub fn label(&self) -> &Label<T, N> {
        &self.label
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Families in the order they were discovered. Empty for terminal nodes.
    pub fn families(&self) -> &[Family] {
        &self.families
    }

    pub fn is_packed(&self) -> bool {
        self.families.len() > 1
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Forest<T, N> {
    nodes: Vec<SppfNode<T, N>>,
}

impl<T, N> Default for Forest<T, N> {
    fn default() -> Self {
        Forest { nodes: Vec::new() }
    }
}

impl<T, N> Forest<T, N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> &SppfNode<T, N> {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SppfNode<T, N>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub(crate) fn alloc(&mut self, label: Label<T, N>, start: usize, end: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SppfNode { label, start, end, families: vec![] });
        id
    }

    /// Records `family` under `id` unless an identical family is already
    /// there. Returns whether it was added.
    pub(crate) fn add_family(&mut self, id: NodeId, family: Family) -> bool {
        let families = &mut self.nodes[id.0].families;
        if families.contains(&family) {
            false
        } else {
            families.push(family);
            true
        }
    }
}

/// The canonical node for each `(label, start, end)` created while
/// processing one column.
pub(crate) struct NodePool<T, N> {
    canonical: HashMap<(Label<T, N>, usize, usize), NodeId>,
}

impl<T: Clone + Eq + Hash, N: Clone + Eq + Hash> NodePool<T, N> {
    pub(crate) fn new() -> Self {
        NodePool { canonical: HashMap::new() }
    }

    pub(crate) fn get(&self, label: &Label<T, N>, start: usize, end: usize) -> Option<NodeId> {
        // FIXME: the key is rebuilt (and the label cloned) just to look it up.
        self.canonical.get(&(label.clone(), start, end)).copied()
    }

    pub(crate) fn fetch_or_create(
        &mut self,
        forest: &mut Forest<T, N>,
        label: Label<T, N>,
        start: usize,
        end: usize,
    ) -> NodeId {
        *self
            .canonical
            .entry((label.clone(), start, end))
            .or_insert_with(|| forest.alloc(label, start, end))
    }
}

#[cfg(test)]
#[path = "tests/node.rs"]
mod tests_for_node;

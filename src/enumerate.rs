//! Reading concrete derivation trees back out of a forest.
//!
//! A derivation is fixed by choosing one family at every ambiguous node it
//! visits. [`Trees`] keeps those choices as an odometer, one digit per
//! ambiguous node visit in preorder, and builds one tree per setting of the
//! odometer: families vary slowest, then the left subtree, then the right.
//! So the trees come out in exactly the order a nested "for each family,
//! for each left derivation, for each right derivation" walk would produce
//! them, without ever holding more than one derivation at a time.
//!
//! Intermediate nodes never show up in the output; their children are
//! spliced into the parent, so every branch gets the arity of the rule that
//! produced it.

use crate::node::{Family, Forest, Label, NodeId};

use std::collections::HashSet;
use std::ops::Range;

/// How the enumerator turns forest nodes into the caller's tree type.
pub trait TreeBuilder<T, N, Tok> {
    type Tree;

    /// A terminal, built from the token that was parsed at `span.start`.
    fn leaf(&mut self, terminal: &T, token: &Tok, span: Range<usize>) -> Self::Tree;

    /// A nonterminal that derived the empty string; `span` is empty.
    fn covert(&mut self, nonterminal: &N, span: Range<usize>) -> Self::Tree;

    fn branch(
        &mut self,
        nonterminal: &N,
        span: Range<usize>,
        children: Vec<Self::Tree>,
    ) -> Self::Tree;
}

/// A [`TreeBuilder`] made of three closures.
pub struct TreeFns<L, C, B> {
    pub leaf: L,
    pub covert: C,
    pub branch: B,
}

impl<T, N, Tok, Out, L, C, B> TreeBuilder<T, N, Tok> for TreeFns<L, C, B>
where
    L: FnMut(&T, &Tok, Range<usize>) -> Out,
    C: FnMut(&N, Range<usize>) -> Out,
    B: FnMut(&N, Range<usize>, Vec<Out>) -> Out,
{
    type Tree = Out;

    fn leaf(&mut self, terminal: &T, token: &Tok, span: Range<usize>) -> Out {
        (self.leaf)(terminal, token, span)
    }

    fn covert(&mut self, nonterminal: &N, span: Range<usize>) -> Out {
        (self.covert)(nonterminal, span)
    }

    fn branch(&mut self, nonterminal: &N, span: Range<usize>, children: Vec<Out>) -> Out {
        (self.branch)(nonterminal, span, children)
    }
}

#[derive(Copy, Clone, Debug)]
struct Choice {
    taken: usize,
    count: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Status {
    /// The odometer holds a setting that has not been tried yet.
    Fresh,
    /// The current setting was used up (yielded or pruned); advance first.
    Spent,
    Done,
}

/// The derivation that the current odometer setting leads into revisits a
/// node on its own ancestor path, after `consumed` choices were read.
struct Pruned {
    consumed: usize,
}

struct Frame<Out> {
    node: NodeId,
    family: Family,
    next_slot: usize,
    children: Vec<Out>,
}

/// Lazy iterator over the derivation trees below one root.
pub struct Trees<'f, T, N, Tok, B> {
    forest: &'f Forest<T, N>,
    root: Option<NodeId>,
    tokens: &'f [Tok],
    builder: B,
    choices: Vec<Choice>,
    status: Status,
}

impl<'f, T, N, Tok, B: TreeBuilder<T, N, Tok>> Trees<'f, T, N, Tok, B> {
    /// # Panics
    ///
    /// If `root` is an intermediate node, or if `tokens` does not cover the
    /// span of `root`.
    pub fn new(
        forest: &'f Forest<T, N>,
        root: Option<NodeId>,
        tokens: &'f [Tok],
        builder: B,
    ) -> Self {
        if let Some(root) = root {
            let node = forest.node(root);
            assert!(
                !node.label().is_intermediate(),
                "intermediate node {:?} cannot root a derivation",
                root
            );
            assert!(
                tokens.len() >= node.end,
                "{} tokens cannot cover a forest spanning {} terminals",
                tokens.len(),
                node.end
            );
        }
        Trees { forest, root, tokens, builder, choices: Vec::new(), status: Status::Fresh }
    }

    /// Moves the odometer to the next setting; false once every setting has
    /// been used.
    fn advance(&mut self) -> bool {
        while let Some(last) = self.choices.last_mut() {
            if last.taken + 1 < last.count {
                last.taken += 1;
                return true;
            }
            self.choices.pop();
        }
        false
    }

    /// Picks the family to expand at `node`, reading (or extending) the
    /// odometer when the node is ambiguous.
    fn choose(&mut self, node: NodeId, cursor: &mut usize) -> Option<Family> {
        let families = self.forest.node(node).families();
        match families.len() {
            0 => None,
            1 => Some(families[0]),
            count => {
                let taken = match self.choices.get(*cursor) {
                    Some(choice) => choice.taken,
                    None => {
                        self.choices.push(Choice { taken: 0, count });
                        0
                    }
                };
                *cursor += 1;
                Some(families[taken])
            }
        }
    }

    fn build(&mut self, root: NodeId) -> Result<B::Tree, Pruned> {
        let forest = self.forest;
        let tokens = self.tokens;
        let root_node = forest.node(root);
        if let Label::Terminal(t) = root_node.label() {
            return Ok(self.builder.leaf(t, &tokens[root_node.start], root_node.span()));
        }

        let mut cursor = 0;
        let mut on_path = HashSet::new();
        let mut stack: Vec<Frame<B::Tree>> = Vec::new();

        on_path.insert(root);
        let family = self.choose(root, &mut cursor).ok_or(Pruned { consumed: cursor })?;
        stack.push(Frame { node: root, family, next_slot: 0, children: Vec::new() });

        while let Some(top) = stack.last_mut() {
            if let Some(child) = top.family.child(top.next_slot) {
                top.next_slot += 1;
                let child_node = forest.node(child);
                if let Label::Terminal(t) = child_node.label() {
                    let leaf = self.builder.leaf(t, &tokens[child_node.start], child_node.span());
                    top.children.push(leaf);
                    continue;
                }
                if !on_path.insert(child) {
                    tracing::trace!(node = child.index(), "pruning cyclic derivation");
                    return Err(Pruned { consumed: cursor });
                }
                let family = match self.choose(child, &mut cursor) {
                    Some(family) => family,
                    None => return Err(Pruned { consumed: cursor }),
                };
                stack.push(Frame { node: child, family, next_slot: 0, children: Vec::new() });
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            on_path.remove(&frame.node);
            let node = forest.node(frame.node);
            let finished = match (node.label(), frame.family) {
                (Label::Intermediate { .. }, _) => {
                    // splice into the parent; `new` refuses intermediate roots
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.children.extend(frame.children);
                            continue;
                        }
                        None => unreachable!("intermediate node {:?} at the root", frame.node),
                    }
                }
                (Label::Nonterminal(n), Family::Epsilon) => self.builder.covert(n, node.span()),
                (Label::Nonterminal(n), _) => self.builder.branch(n, node.span(), frame.children),
                (Label::Terminal(_), _) => unreachable!("terminal nodes are never expanded"),
            };
            match stack.last_mut() {
                Some(parent) => parent.children.push(finished),
                None => return Ok(finished),
            }
        }
        unreachable!("the root frame always finishes the walk")
    }
}

impl<'f, T, N, Tok, B: TreeBuilder<T, N, Tok>> Iterator for Trees<'f, T, N, Tok, B> {
    type Item = B::Tree;

    fn next(&mut self) -> Option<B::Tree> {
        let root = self.root?;
        loop {
            match self.status {
                Status::Done => return None,
                Status::Fresh => {}
                Status::Spent => {
                    if !self.advance() {
                        self.status = Status::Done;
                        return None;
                    }
                }
            }
            self.status = Status::Spent;
            match self.build(root) {
                Ok(tree) => return Some(tree),
                Err(Pruned { consumed }) => self.choices.truncate(consumed),
            }
        }
    }
}

impl<T, N> Forest<T, N> {
    /// Every derivation tree below `root`, lazily. `tokens` must line up
    /// with the parsed terminals. No root, no trees.
    pub fn trees<'f, Tok, B>(
        &'f self,
        root: Option<NodeId>,
        tokens: &'f [Tok],
        builder: B,
    ) -> Trees<'f, T, N, Tok, B>
    where
        B: TreeBuilder<T, N, Tok>,
    {
        Trees::new(self, root, tokens, builder)
    }
}

#[cfg(test)]
#[path = "tests/enumerate.rs"]
mod tests_for_enumerate;

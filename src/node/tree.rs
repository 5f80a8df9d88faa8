use crate::enumerate::TreeBuilder;

use std::ops::Range;

/// A concrete derivation tree, with the rule arities of the grammar (no
/// intermediate nodes).
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Tree<N, Tok> {
    Leaf { token: Tok, span: Range<usize> },
    /// A nonterminal that derived the empty string at position `at`.
    Covert { label: N, at: usize },
    Branch { label: N, span: Range<usize>, children: Vec<Tree<N, Tok>> },
}

const NONTERM_BRACKETS: (char, char) = ('(', ')');

const COVERT: &str = "∅";

impl<N, Tok> Tree<N, Tok> {
    pub fn label(&self) -> Option<&N> {
        match self {
            Tree::Leaf { .. } => None,
            Tree::Covert { label, .. } | Tree::Branch { label, .. } => Some(label),
        }
    }

    pub fn span(&self) -> Range<usize> {
        match self {
            Tree::Leaf { span, .. } | Tree::Branch { span, .. } => span.clone(),
            Tree::Covert { at, .. } => *at..*at,
        }
    }

    pub fn children(&self) -> &[Tree<N, Tok>] {
        match self {
            Tree::Branch { children, .. } => children,
            Tree::Leaf { .. } | Tree::Covert { .. } => &[],
        }
    }

    /// The overt tokens, left to right.
    pub fn leaves(&self) -> Vec<&Tok> {
        let mut accum = Vec::new();
        let mut pending = vec![self];
        while let Some(tree) = pending.pop() {
            match tree {
                Tree::Leaf { token, .. } => accum.push(token),
                Tree::Covert { .. } => continue,
                Tree::Branch { children, .. } => pending.extend(children.iter().rev()),
            }
        }
        accum
    }

    /// Preorder iteration over every subtree, this one included.
    pub fn subtrees(&self) -> impl Iterator<Item = &Tree<N, Tok>> {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            let tree = pending.pop()?;
            pending.extend(tree.children().iter().rev());
            Some(tree)
        })
    }
}

impl<N: std::fmt::Display, Tok: std::fmt::Display> std::fmt::Display for Tree<N, Tok> {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        let bd = NONTERM_BRACKETS;
        match self {
            Tree::Leaf { token, .. } => write!(w, "\"{}\"", token),
            Tree::Covert { label, .. } => {
                write!(w, "{NT}{b}{c}{d}", NT = label, b = bd.0, c = COVERT, d = bd.1)
            }
            Tree::Branch { label, children, .. } => {
                write!(w, "{NT}{b}", NT = label, b = bd.0)?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(w, " ")?;
                    }
                    write!(w, "{}", child)?;
                }
                write!(w, "{d}", d = bd.1)
            }
        }
    }
}

/// Builds [`Tree`]s out of cloned nonterminals and tokens.
#[derive(Copy, Clone, Default, Debug)]
pub struct TreeMaker;

impl<T, N: Clone, Tok: Clone> TreeBuilder<T, N, Tok> for TreeMaker {
    type Tree = Tree<N, Tok>;

    fn leaf(&mut self, _terminal: &T, token: &Tok, span: Range<usize>) -> Tree<N, Tok> {
        Tree::Leaf { token: token.clone(), span }
    }

    fn covert(&mut self, nonterminal: &N, span: Range<usize>) -> Tree<N, Tok> {
        Tree::Covert { label: nonterminal.clone(), at: span.start }
    }

    fn branch(
        &mut self,
        nonterminal: &N,
        span: Range<usize>,
        children: Vec<Tree<N, Tok>>,
    ) -> Tree<N, Tok> {
        Tree::Branch { label: nonterminal.clone(), span, children }
    }
}

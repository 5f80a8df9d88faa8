use crate::earley::{EarleyParser, Item, ItemSet};
use crate::grammar::Symbol;
use crate::node::{Family, Forest, Label, NodeId, Tree};

use std::collections::HashSet;
use std::fmt::{Debug, Display};
use std::hash::Hash;

pub trait Rendered {
    fn rendered(&self) -> String;
}

/// Tokens as the sentence they came from.
impl<Tok: Display> Rendered for [Tok] {
    fn rendered(&self) -> String {
        self.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
    }
}

/// The source text a tree covers.
impl<N, Tok: Display> Rendered for Tree<N, Tok> {
    fn rendered(&self) -> String {
        self.leaves().into_iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
    }
}

impl<T, N> EarleyParser<T, N>
where
    T: Clone + Eq + Hash + Debug,
    N: Clone + Eq + Hash + Debug + Display,
{
    fn show_symbol(&self, symbol: &Symbol<T, N>) -> String {
        match symbol {
            Symbol::Terminal(t) => self.show_terminal(t),
            Symbol::Nonterminal(n) => n.to_string(),
        }
    }

    fn dotted(&self, rule: usize, dot: usize) -> String {
        let rule = &self.grammar().rules[rule];
        let (pre, post) = rule.body.split_at(dot);
        let pre: Vec<String> = pre.iter().map(|s| self.show_symbol(s)).collect();
        let post: Vec<String> = post.iter().map(|s| self.show_symbol(s)).collect();
        format!("{} → {}•{}", rule.head, pre.join(" "), post.join(" "))
    }

    /// An item as `(S → a•A b B, 0)`.
    pub fn show_item(&self, item: &Item) -> String {
        format!("({}, {})", self.dotted(item.rule(), item.dot()), item.origin())
    }

    pub fn show_label(&self, label: &Label<T, N>) -> String {
        match label {
            Label::Terminal(t) => self.show_terminal(t),
            Label::Nonterminal(n) => n.to_string(),
            Label::Intermediate { rule, dot } => format!("({})", self.dotted(*rule, *dot)),
        }
    }

    /// Every column of an Earley table, items in the order they were found.
    pub fn render_table(&self, table: &[ItemSet]) -> String {
        let mut out = String::new();
        for (i, set) in table.iter().enumerate() {
            out.push_str(&format!("column {}\n", i));
            for item in set.iter() {
                out.push_str(&format!("  {}\n", self.show_item(item)));
            }
        }
        out
    }

    /// The part of `forest` reachable from `root`, one line per
    /// non-terminal node in preorder: `label[start..end] := family | ...`.
    pub fn render_forest(&self, forest: &Forest<T, N>, root: Option<NodeId>) -> String {
        let show = |id: NodeId| {
            let node = forest.node(id);
            format!("{}[{}..{}]", self.show_label(node.label()), node.start(), node.end())
        };

        let mut out = String::new();
        let mut seen = HashSet::new();
        let mut pending: Vec<NodeId> = root.into_iter().collect();
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            let node = forest.node(id);
            if node.families().is_empty() {
                continue;
            }
            let families: Vec<String> = node
                .families()
                .iter()
                .map(|f| match f {
                    Family::Epsilon => "ε".to_string(),
                    _ => f.children().map(show).collect::<Vec<_>>().join(" "),
                })
                .collect();
            out.push_str(&format!("{} := {}\n", show(id), families.join(" | ")));
            let children: Vec<NodeId> = node.families().iter().flat_map(|f| f.children()).collect();
            pending.extend(children.into_iter().rev());
        }
        out
    }
}

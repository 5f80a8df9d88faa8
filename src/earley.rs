//! Earley recognition with SPPF construction: gradually build, from left to
//! right, the set of Earley items for each position in the input, and while
//! doing so build a shared packed parse forest of every derivation.
//!
//! This follows the cubic-time parser of Scott & Johnstone, "Recognition is
//! not parsing: SPPF-style parsing from cubic recognisers", Science of
//! Computer Programming 75 (2010) 55–70, page 60. The paper indexes the
//! input from 1; everything here is zero-indexed, so the terminal that is
//! shifted out of column `i` is `input[i]`.
//!
//! Two details keep the forest small:
//!
//!  * nodes created while processing a column are looked up by
//!    `(label, start, end)` before a new one is made, so every span is
//!    derived by at most one node per label and alternatives get packed;
//!
//!  * nullable nonterminals completed in the current column are remembered,
//!    so an item predicting one of them can step over it immediately instead
//!    of waiting for a completion that has already happened.

use crate::enumerate::{TreeBuilder, Trees};
use crate::grammar::{Grammar, Rule, Symbol};
use crate::node::{Family, Forest, Label, NodeId, NodePool, SppfNode};
use crate::GrammarError;

use indexmap::IndexSet;
use linear_map::LinearMap;

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

/// `(rule, dot, origin)`: rule `rule` has matched its first `dot` symbols
/// over the input starting at column `origin`. `node` is the forest node of
/// that partial match, absent while `dot == 0`.
///
/// Items compare and hash on `(rule, dot, origin)` alone; within one parse
/// the node is determined by the other three.
#[derive(Copy, Clone, Debug)]
pub struct Item {
    rule: usize,
    dot: usize,
    origin: usize,
    node: Option<NodeId>,
}

impl Item {
    fn predicted(rule: usize, origin: usize) -> Self {
        Item { rule, dot: 0, origin, node: None }
    }

    fn advanced(self, node: NodeId) -> Self {
        Item { dot: self.dot + 1, node: Some(node), ..self }
    }

    pub fn rule(&self) -> usize {
        self.rule
    }

    pub fn dot(&self) -> usize {
        self.dot
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        (self.rule, self.dot, self.origin) == (other.rule, other.dot, other.origin)
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.rule, self.dot, self.origin).hash(state)
    }
}

/// The items of one column, in the order they were added.
#[derive(Clone, Default, Debug)]
pub struct ItemSet {
    items: IndexSet<Item>,
}

impl ItemSet {
    fn insert(&mut self, item: Item) -> bool {
        self.items.insert(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, rule: usize, dot: usize, origin: usize) -> Option<&Item> {
        self.items.get(&Item { rule, dot, origin, node: None })
    }

    pub fn contains(&self, rule: usize, dot: usize, origin: usize) -> bool {
        self.get(rule, dot, origin).is_some()
    }
}

/// What one call to [`EarleyParser::parse`] produces.
#[derive(Clone, Debug)]
pub struct ParseResult<T, N> {
    table: Vec<ItemSet>,
    forest: Forest<T, N>,
    root: Option<NodeId>,
}

impl<T, N> ParseResult<T, N> {
    /// One item set per column, `input.len() + 1` in all.
    pub fn table(&self) -> &[ItemSet] {
        &self.table
    }

    pub fn forest(&self) -> &Forest<T, N> {
        &self.forest
    }

    /// The start symbol's node over the whole input; `None` when the input
    /// has no derivation.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn root_node(&self) -> Option<&SppfNode<T, N>> {
        self.root.map(|id| self.forest.node(id))
    }

    pub fn accepted(&self) -> bool {
        self.root.is_some()
    }

    /// Every derivation tree of the input, lazily; see [`Trees`].
    pub fn trees<'a, Tok, B>(&'a self, tokens: &'a [Tok], builder: B) -> Trees<'a, T, N, Tok, B>
    where
        B: TreeBuilder<T, N, Tok>,
    {
        self.forest.trees(self.root, tokens, builder)
    }
}

pub struct EarleyParser<T, N> {
    grammar: Grammar<T, N>,
    by_head: HashMap<N, Vec<usize>>,
    show_terminal: Box<dyn Fn(&T) -> String>,
}

impl<T, N> EarleyParser<T, N>
where
    T: Clone + Eq + Hash + Debug,
    N: Clone + Eq + Hash + Debug,
{
    /// `show_terminal` is only used to render items and forests for people
    /// to read.
    pub fn new(
        grammar: Grammar<T, N>,
        show_terminal: impl Fn(&T) -> String + 'static,
    ) -> Result<Self, GrammarError> {
        grammar.validate()?;
        let mut by_head: HashMap<N, Vec<usize>> = HashMap::new();
        for (index, rule) in grammar.rules.iter().enumerate() {
            by_head.entry(rule.head.clone()).or_default().push(index);
        }
        Ok(EarleyParser { grammar, by_head, show_terminal: Box::new(show_terminal) })
    }

    pub fn grammar(&self) -> &Grammar<T, N> {
        &self.grammar
    }

    pub(crate) fn show_terminal(&self, terminal: &T) -> String {
        (self.show_terminal)(terminal)
    }

    fn rules_headed_by(&self, nonterm: &N) -> &[usize] {
        self.by_head.get(nonterm).map(|v| &v[..]).unwrap_or(&[])
    }

    fn is_final(&self, item: &Item) -> bool {
        let rule = &self.grammar.rules[item.rule];
        rule.head == self.grammar.start && item.dot == rule.body.len() && item.origin == 0
    }

    /// Parses `input`, returning the Earley table and the forest of all
    /// derivations. Never fails: an ungrammatical input just has no root.
    ///
    /// # Panics
    ///
    /// If the engine's own bookkeeping is found inconsistent (an item
    /// queued for shifting that does not expect the current terminal).
    pub fn parse(&self, input: &[T]) -> ParseResult<T, N> {
        let n = input.len();
        let rules = &self.grammar.rules[..];
        let _span =
            tracing::debug_span!("earley_parse", terminals = n, rules = rules.len()).entered();

        let mut table: Vec<ItemSet> = (0..=n).map(|_| ItemSet::default()).collect();
        let mut sppf = SppfBuilder::new(rules);
        let mut shift_next: Vec<Item> = Vec::new();

        // for all (S ::= α) ∈ P { if α ∈ ΣN add (S ::= ·α, 0, null) to E0
        //                         if α = a1 α′ add (S ::= ·α, 0, null) to Q′ }
        for &r in self.rules_headed_by(&self.grammar.start) {
            let item = Item::predicted(r, 0);
            match rules[r].body.first() {
                None | Some(Symbol::Nonterminal(_)) => {
                    table[0].insert(item);
                }
                Some(Symbol::Terminal(t)) => {
                    if input.first() == Some(t) && table[0].insert(item) {
                        shift_next.push(item);
                    }
                }
            }
        }

        for i in 0..=n {
            let mut column = Column {
                rules,
                lookahead: input.get(i),
                worklist: table[i].iter().copied().collect(),
                shift: std::mem::take(&mut shift_next),
            };
            let mut nullable: LinearMap<N, NodeId> = LinearMap::new();

            while let Some(item) = column.worklist.pop_front() {
                let rule = &rules[item.rule];
                match rule.body.get(item.dot) {
                    Some(Symbol::Nonterminal(c)) => {
                        for &r in self.rules_headed_by(c) {
                            column.update(&mut table[i], Item::predicted(r, i));
                        }
                        if let Some(&v) = nullable.get(c) {
                            let y = sppf.make_node(
                                item.rule,
                                item.dot + 1,
                                item.origin,
                                i,
                                item.node,
                                v,
                            );
                            column.update(&mut table[i], item.advanced(y));
                        }
                    }
                    None => {
                        let head = &rule.head;
                        let w = match item.node {
                            Some(w) => w,
                            None => sppf.epsilon(head, i),
                        };
                        if item.origin == i {
                            nullable.insert(head.clone(), w);
                        }
                        let waiting: Vec<Item> = table[item.origin]
                            .iter()
                            .filter(|e| {
                                matches!(
                                    rules[e.rule].body.get(e.dot),
                                    Some(Symbol::Nonterminal(d)) if d == head
                                )
                            })
                            .copied()
                            .collect();
                        for e in waiting {
                            let y = sppf.make_node(e.rule, e.dot + 1, e.origin, i, e.node, w);
                            column.update(&mut table[i], e.advanced(y));
                        }
                    }
                    Some(Symbol::Terminal(_)) => {
                        // already queued for the shift, if it matches
                    }
                }
            }
            tracing::trace!(
                column = i,
                items = table[i].len(),
                shifts = column.shift.len(),
                "column closed"
            );

            let Some(terminal) = input.get(i) else { break };
            sppf.next_column();
            let v = sppf.leaf(terminal, i);
            for item in column.shift {
                let rule = &rules[item.rule];
                match rule.body.get(item.dot) {
                    Some(Symbol::Terminal(t)) if t == terminal => {}
                    other => panic!(
                        "item {:?} was queued to shift {:?} at column {} \
                         but expects {:?} (rule {:?})",
                        item, terminal, i, other, rule
                    ),
                }
                let y = sppf.make_node(item.rule, item.dot + 1, item.origin, i + 1, item.node, v);
                let next = item.advanced(y);
                match rule.body.get(next.dot) {
                    None | Some(Symbol::Nonterminal(_)) => {
                        table[i + 1].insert(next);
                    }
                    Some(Symbol::Terminal(t)) => {
                        if input.get(i + 1) == Some(t) && table[i + 1].insert(next) {
                            shift_next.push(next);
                        }
                    }
                }
            }
        }

        // if (S ::= τ ·, 0, w) ∈ En return w
        let root = table[n]
            .iter()
            .find(|item| self.is_final(item))
            .and_then(|item| item.node.or_else(|| sppf.existing(&self.grammar.start, 0, n)));

        let forest = sppf.finish();
        tracing::debug!(nodes = forest.len(), accepted = root.is_some(), "parse finished");
        ParseResult { table, forest, root }
    }
}

/// The per-column bookkeeping of the recogniser: the items still to be
/// processed and the items waiting for the terminal at `lookahead`.
struct Column<'g, T, N> {
    rules: &'g [Rule<T, N>],
    lookahead: Option<&'g T>,
    worklist: VecDeque<Item>,
    shift: Vec<Item>,
}

impl<'g, T: PartialEq, N> Column<'g, T, N> {
    /// Adds `item` to the column. Items that expect a nonterminal (or
    /// nothing) are queued for processing; items that expect the lookahead
    /// are queued for the shift; items expecting any other terminal are
    /// dead and dropped.
    fn update(&mut self, set: &mut ItemSet, item: Item) {
        match self.rules[item.rule].body.get(item.dot) {
            None | Some(Symbol::Nonterminal(_)) => {
                if set.insert(item) {
                    self.worklist.push_back(item);
                }
            }
            Some(Symbol::Terminal(t)) => {
                if self.lookahead == Some(t) && set.insert(item) {
                    self.shift.push(item);
                }
            }
        }
    }
}

/// The forest under construction, plus the pool of nodes made for the
/// current column.
struct SppfBuilder<'g, T, N> {
    rules: &'g [Rule<T, N>],
    forest: Forest<T, N>,
    pool: NodePool<T, N>,
}

impl<'g, T: Clone + Eq + Hash, N: Clone + Eq + Hash> SppfBuilder<'g, T, N> {
    fn new(rules: &'g [Rule<T, N>]) -> Self {
        SppfBuilder { rules, forest: Forest::new(), pool: NodePool::new() }
    }

    fn next_column(&mut self) {
        self.pool = NodePool::new();
    }

    fn leaf(&mut self, terminal: &T, at: usize) -> NodeId {
        self.forest.alloc(Label::Terminal(terminal.clone()), at, at + 1)
    }

    /// The node for `head` over the empty span at `at`, carrying the
    /// epsilon family.
    fn epsilon(&mut self, head: &N, at: usize) -> NodeId {
        let label = Label::Nonterminal(head.clone());
        let w = self.pool.fetch_or_create(&mut self.forest, label, at, at);
        self.forest.add_family(w, Family::Epsilon);
        w
    }

    fn existing(&self, nonterm: &N, start: usize, end: usize) -> Option<NodeId> {
        self.pool.get(&Label::Nonterminal(nonterm.clone()), start, end)
    }

    /// MAKE_NODE(B ::= αx · β, j, i, w, v, V): the node for rule `rule` with
    /// `dot` symbols matched over `[start, end)`, whose last symbol is
    /// derived by `right` and whose earlier symbols (if any) by `left`.
    fn make_node(
        &mut self,
        rule: usize,
        dot: usize,
        start: usize,
        end: usize,
        left: Option<NodeId>,
        right: NodeId,
    ) -> NodeId {
        let r = &self.rules[rule];
        if dot == 1 && r.body.len() > 1 {
            // a one-symbol prefix of a longer body has nothing to pack
            return right;
        }
        let label = if dot == r.body.len() {
            Label::Nonterminal(r.head.clone())
        } else {
            Label::Intermediate { rule, dot }
        };
        let y = self.pool.fetch_or_create(&mut self.forest, label, start, end);
        let family = match left {
            Some(w) => Family::Binary(w, right),
            None => Family::Unary(right),
        };
        self.forest.add_family(y, family);
        y
    }

    fn finish(self) -> Forest<T, N> {
        self.forest
    }
}

#[cfg(test)]
#[path = "tests/earley.rs"]
mod tests_for_earley;

use crate::GrammarError;

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

// A grammar G is a tuple (Sigma, Delta, A_0, R), where
//   Sigma is a finite set of terminals
//   Delta is a finite set of non-terminals
//   A_0 in Delta is the start non-terminal, and
//   R is an ordered list of rules `A ::= X_1 ... X_k` (k may be zero)
//
// The order of R matters: rule indices identify items and intermediate
// forest nodes, and the enumerator yields trees in the order the rules
// produced them.

#[derive(PartialEq, Eq, Clone, Hash, Debug)]
pub enum Symbol<T, N> {
    Terminal(T),
    Nonterminal(N),
}

impl<T, N> Symbol<T, N> {
    pub fn terminal(&self) -> Option<&T> {
        match self {
            Symbol::Terminal(t) => Some(t),
            Symbol::Nonterminal(_) => None,
        }
    }

    pub fn nonterminal(&self) -> Option<&N> {
        match self {
            Symbol::Terminal(_) => None,
            Symbol::Nonterminal(n) => Some(n),
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Rule<T, N> {
    pub head: N,
    pub body: Vec<Symbol<T, N>>,
}

impl<T, N> Rule<T, N> {
    pub fn new(head: N, body: Vec<Symbol<T, N>>) -> Self {
        Rule { head, body }
    }

    pub fn epsilon(head: N) -> Self {
        Rule { head, body: vec![] }
    }

    pub fn is_epsilon(&self) -> bool {
        self.body.is_empty()
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Grammar<T, N> {
    pub start: N,
    pub rules: Vec<Rule<T, N>>,
}

impl<T, N> Grammar<T, N> {
    pub fn new(start: N, rules: Vec<Rule<T, N>>) -> Self {
        Grammar { start, rules }
    }
}

impl<T: Clone + Eq + Hash, N: Clone + Eq + Hash + Debug> Grammar<T, N> {
    /// The nonterminals that head at least one rule.
    pub fn nonterms(&self) -> HashSet<N> {
        self.rules.iter().map(|r| r.head.clone()).collect()
    }

    pub fn terms(&self) -> HashSet<T> {
        self.rules
            .iter()
            .flat_map(|r| r.body.iter().filter_map(Symbol::terminal).cloned())
            .collect()
    }

    /// Rules headed by `nonterm`, with their indices.
    pub fn rules_for<'a>(
        &'a self,
        nonterm: &'a N,
    ) -> impl Iterator<Item = (usize, &'a Rule<T, N>)> + 'a {
        self.rules.iter().enumerate().filter(move |(_, r)| &r.head == nonterm)
    }

    /// Checks that the start symbol and every nonterminal mentioned on a
    /// right-hand side head some rule.
    pub fn validate(&self) -> Result<(), GrammarError> {
        let declared = self.nonterms();
        if !declared.contains(&self.start) {
            return Err(GrammarError::MissingStart { start: format!("{:?}", self.start) });
        }
        for (index, rule) in self.rules.iter().enumerate() {
            for nonterm in rule.body.iter().filter_map(Symbol::nonterminal) {
                if !declared.contains(nonterm) {
                    return Err(GrammarError::UndeclaredNonterminal {
                        rule: index,
                        nonterminal: format!("{:?}", nonterm),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Grammar<String, String> {
    /// Reads the textual notation
    ///
    /// ```text
    /// S ::= 'a' A 'b' B ;
    /// A ::= 'a' ;
    /// B ::= A | 'a' ;
    /// ```
    ///
    /// Bare identifiers are nonterminals, quoted words are terminals, and an
    /// alternative that is empty (or just `ε`) is an epsilon rule. The head
    /// of the first production is the start symbol.
    pub fn from_bnf(src: &str) -> Result<Self, GrammarError> {
        let rules = crate::bnf::RulesParser::new()
            .parse(src)
            .map_err(|e| GrammarError::Syntax(e.to_string()))?;
        let start = match rules.first() {
            Some(rule) => rule.head.clone(),
            None => return Err(GrammarError::Empty),
        };
        let grammar = Grammar { start, rules };
        grammar.validate()?;
        Ok(grammar)
    }
}

#[cfg(test)]
#[path = "tests/grammar.rs"]
mod tests_for_grammar;

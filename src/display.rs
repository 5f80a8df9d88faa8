use crate::grammar::{Grammar, Rule, Symbol};

use std::fmt::Display;

// Grammars print in the notation `Grammar::from_bnf` reads. The text only
// reads back to the same grammar when the start symbol heads a rule, the
// nonterminals are identifiers and no terminal contains a `'`.

impl<T: Display, N: Display> Display for Symbol<T, N> {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(w, "'{}'", t),
            Symbol::Nonterminal(n) => write!(w, "{}", n),
        }
    }
}

impl<T: Display, N: Display> Display for Rule<T, N> {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(w, "{} ::=", self.head)?;
        if self.body.is_empty() {
            return write!(w, " ε");
        }
        for symbol in &self.body {
            write!(w, " {}", symbol)?;
        }
        Ok(())
    }
}

impl<T: Display, N: Display + PartialEq> Display for Grammar<T, N> {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        // the start symbol is implied by the first rule
        let first = self.rules.iter().position(|r| r.head == self.start);
        if let Some(first) = first {
            writeln!(w, "{} ;", self.rules[first])?;
        }
        for (i, rule) in self.rules.iter().enumerate() {
            if Some(i) != first {
                writeln!(w, "{} ;", rule)?;
            }
        }
        Ok(())
    }
}

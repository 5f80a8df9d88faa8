// This is actually defined at `crate::enumerate::tests_for_enumerate`

use crate::enumerate::*;
use crate::node::{Tree, TreeMaker};
use crate::tests::*;
use crate::Rendered;

use expect_test::expect;

fn shown<N, Tok>(trees: impl Iterator<Item = Tree<N, Tok>>) -> String
where
    N: std::fmt::Display,
    Tok: std::fmt::Display,
{
    trees.map(|t| format!("{}\n", t)).collect()
}

#[test]
fn toaq_trees_over_parts_of_speech() {
    let parser = toaq();
    let input = words("predicate pronoun pronoun");
    let result = parser.parse(&input);
    expect![[r#"
        Clause("predicate" "pronoun" "pronoun")
        Clause(Verb("predicate") "pronoun" "pronoun")
        Clause(Verb(Test(∅) "predicate") "pronoun" "pronoun")
    "#]]
    .assert_eq(&shown(result.trees(&input, TreeMaker)));
}

#[test]
fn toaq_trees_carry_the_words() {
    let parser = toaq();
    let result = parser.parse(&words("predicate pronoun pronoun"));
    let tokens = words("Maı jí súq");
    let trees: Vec<Tree<String, String>> = result.trees(&tokens, TreeMaker).collect();
    assert_eq!(trees.len(), 3);
    assert_eq!(tokens.rendered(), "Maı jí súq");
    for tree in &trees {
        assert_eq!(tree.rendered(), tokens.rendered());
        assert_eq!(tree.span(), 0..3);
    }
    expect![[r#"Clause(Verb(Test(∅) "Maı") "jí" "súq")"#]].assert_eq(&trees[2].to_string());
}

#[test]
fn covert_nodes_sit_at_their_position() {
    let parser = toaq();
    let result = parser.parse(&words("predicate pronoun pronoun"));
    let tokens = words("Maı jí súq");
    let last = result.trees(&tokens, TreeMaker).last().unwrap();
    let covert: Vec<&Tree<String, String>> =
        last.subtrees().filter(|t| matches!(t, Tree::Covert { .. })).collect();
    assert_eq!(covert.len(), 1);
    assert_eq!(covert[0].label().map(String::as_str), Some("Test"));
    assert_eq!(covert[0].span(), 0..0);
    assert!(covert[0].children().is_empty());
}

#[test]
fn gamma4_trees() {
    let parser = gamma4();
    let input = input("aaba");
    let result = parser.parse(&input);
    expect![[r#"
        S("a" A("a") "b" B("a"))
        S("a" A("a") "b" B(A("a")))
    "#]]
    .assert_eq(&shown(result.trees(&input, TreeMaker)));
}

#[test]
fn no_root_no_trees() {
    let parser = gamma4();
    let input = input("abab");
    let result = parser.parse(&input);
    assert_eq!(result.trees(&input, TreeMaker).count(), 0);
}

#[test]
fn empty_derivation() {
    let parser = parser("S ::= ε | 'a' S ;");
    let result = parser.parse(&[]);
    let tokens: Vec<String> = vec![];
    let trees: Vec<Tree<String, String>> = result.trees(&tokens, TreeMaker).collect();
    assert_eq!(trees, vec![Tree::Covert { label: "S".to_string(), at: 0 }]);
    assert_eq!(trees[0].to_string(), "S(∅)");
    assert_eq!(trees[0].rendered(), "");
}

#[test]
fn ambiguity_multiplies() {
    // the Catalan numbers: 1, 1, 2, 5, 14, 42
    let parser = parser("S ::= S S | 'a' ;");
    for (n, expected) in [(1, 1), (2, 1), (3, 2), (4, 5), (5, 14), (6, 42)] {
        let input = input(&"a".repeat(n));
        let result = parser.parse(&input);
        assert_eq!(result.trees(&input, TreeMaker).count(), expected, "n = {}", n);
    }
}

#[test]
fn trees_are_distinct_and_repeatable() {
    let parser = parser("S ::= S S | 'a' ;");
    let input = input("aaaaa");
    let result = parser.parse(&input);
    let first: Vec<String> = result.trees(&input, TreeMaker).map(|t| t.to_string()).collect();
    let again: Vec<String> = result.trees(&input, TreeMaker).map(|t| t.to_string()).collect();
    assert_eq!(first, again);
    let mut unique = first.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), first.len());
}

#[test]
fn enumeration_is_lazy() {
    let parser = parser("S ::= S S | 'a' ;");
    let input = input(&"a".repeat(12));
    let result = parser.parse(&input);
    // 58786 trees in all; taking two must not build the rest
    let mut built = 0;
    let builder = TreeFns {
        leaf: |_: &String, _: &String, _| (),
        covert: |_: &String, _| (),
        branch: |_: &String, _, _: Vec<()>| built += 1,
    };
    assert_eq!(result.trees(&input, builder).take(2).count(), 2);
    // eleven `S S` branches and twelve `'a'` branches per tree
    assert_eq!(built, 2 * 23);
}

#[test]
fn cycles_are_cut() {
    let parser = parser("S ::= S | 'a' ;");
    let input = input("a");
    let result = parser.parse(&input);
    assert_eq!(shown(result.trees(&input, TreeMaker)), "S(\"a\")\n");
}

#[test]
fn cycle_through_a_nullable() {
    let parser = parser("S ::= S N | 'a' ; N ::= ε ;");
    let input = input("a");
    let result = parser.parse(&input);
    assert_eq!(shown(result.trees(&input, TreeMaker)), "S(\"a\")\n");
}

#[test]
fn closures_as_builder() {
    let parser = gamma4();
    let input = input("aaba");
    let result = parser.parse(&input);
    let builder = TreeFns {
        leaf: |_: &String, tok: &String, _| tok.clone(),
        covert: |n: &String, _| n.to_lowercase(),
        branch: |n: &String, span: std::ops::Range<usize>, kids: Vec<String>| {
            format!("[{}@{}..{} {}]", n, span.start, span.end, kids.join(" "))
        },
    };
    let trees: Vec<String> = result.trees(&input, builder).collect();
    assert_eq!(
        trees,
        vec!["[S@0..4 a [A@1..2 a] b [B@3..4 a]]", "[S@0..4 a [A@1..2 a] b [B@3..4 [A@3..4 a]]]"]
    );
}

#[test]
#[should_panic(expected = "cannot cover")]
fn too_few_tokens() {
    let parser = gamma4();
    let result = parser.parse(&input("aaba"));
    let tokens = input("aab");
    let _ = result.trees(&tokens, TreeMaker).count();
}

#[test]
fn duplicate_rules_share_short_families() {
    // one- and two-symbol bodies build the same family under either rule
    for src in ["S ::= 'a' | 'a' ;", "S ::= 'a' 'a' | 'a' 'a' ;"] {
        let parser = parser(src);
        let input = input(&"a".repeat(parser.grammar().rules[0].body.len()));
        let result = parser.parse(&input);
        assert_eq!(result.root_node().unwrap().families().len(), 1, "{}", src);
        assert_eq!(result.trees(&input, TreeMaker).count(), 1, "{}", src);
    }

    // longer bodies go through an intermediate node per rule
    let parser = parser("S ::= 'a' 'a' 'a' | 'a' 'a' 'a' ;");
    let input = input("aaa");
    let result = parser.parse(&input);
    assert_eq!(
        shown(result.trees(&input, TreeMaker)),
        "S(\"a\" \"a\" \"a\")\nS(\"a\" \"a\" \"a\")\n"
    );
}

#[test]
#[should_panic(expected = "cannot root a derivation")]
fn intermediate_root_is_refused() {
    let parser = gamma4();
    let input = input("aaba");
    let result = parser.parse(&input);
    let (intermediate, _) = result
        .forest()
        .iter()
        .find(|(_, node)| node.label().is_intermediate())
        .unwrap();
    let _ = result.forest().trees(Some(intermediate), &input, TreeMaker);
}

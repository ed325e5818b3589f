use crate::alphabet::MAX_REPEAT;
use crate::ast::{Bounds, Node, NodeKind};
use crate::error::PatternSyntaxError;

/// Compile a pattern against the given reference alphabet.
///
/// The alphabet is the character set produced by `.` and by inverted classes;
/// it must be sorted ascending by code point.
pub fn compile(pattern: &str, alphabet: &[char]) -> Result<Node, PatternSyntaxError> {
    Compiler::new(pattern, alphabet).compile()
}

/// A sequence whose children are still being appended.
///
/// `branches` is `None` while the sequence looks like a plain concatenation.
/// The first `|` flips it to `Some`: the nodes collected so far move into the
/// branch list retroactively, and every later `|` seals another branch.
struct OpenSequence {
    nodes: Vec<Node>,
    branches: Option<Vec<Vec<Node>>>,
}

impl OpenSequence {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            branches: None,
        }
    }

    /// Seal the current run of nodes as one more alternative branch.
    fn seal_branch(&mut self) {
        let branch = std::mem::take(&mut self.nodes);
        self.branches.get_or_insert_with(Vec::new).push(branch);
    }

    /// Overwrite the bounds of the most recently appended node.
    fn set_last_bounds(&mut self, bounds: Bounds, at: usize) -> Result<(), PatternSyntaxError> {
        match self.nodes.last_mut() {
            Some(node) => {
                node.bounds = bounds;
                Ok(())
            }
            None => Err(PatternSyntaxError::DanglingQuantifier(at)),
        }
    }

    /// Close the sequence into a single node: an `Alternation` if any `|` was
    /// seen (the pending nodes become the final branch), a `Sequence`
    /// otherwise.
    fn close(mut self) -> Node {
        match self.branches.take() {
            Some(mut branches) => {
                branches.push(self.nodes);
                Node::new(NodeKind::Alternation(branches))
            }
            None => Node::new(NodeKind::Sequence(self.nodes)),
        }
    }

    /// Close as the pattern root. The root is always a `Sequence`, so a
    /// top-level alternation gets wrapped in a synthetic one.
    fn close_root(self) -> Node {
        if self.branches.is_some() {
            let alternation = self.close();
            Node::new(NodeKind::Sequence(vec![alternation]))
        } else {
            self.close()
        }
    }
}

/// Compiler for the restricted pattern language.
///
/// One left-to-right scan over the pattern's characters, with an explicit
/// stack of open sequences for nested groups. `pos` is a character index and
/// is what error variants report.
pub struct Compiler<'a> {
    chars: Vec<char>,
    pos: usize,
    alphabet: &'a [char],
}

impl<'a> Compiler<'a> {
    pub fn new(pattern: &str, alphabet: &'a [char]) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
            alphabet,
        }
    }

    /// Look at the current character without consuming it.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Look `offset` characters past the current one.
    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Consume the current character and return it.
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    /// Run the scan to completion and return the root `Sequence` node.
    ///
    /// Examples:
    /// - Pattern: `ab`    → Sequence([Class(['a']), Class(['b'])])
    /// - Pattern: `a|b`   → Sequence([Alternation([[Class(['a'])], [Class(['b'])]])])
    /// - Pattern: `(ab)+` → Sequence([Sequence([...]) with bounds (1,10)])
    pub fn compile(mut self) -> Result<Node, PatternSyntaxError> {
        let mut stack: Vec<OpenSequence> = Vec::new();
        let mut current = OpenSequence::new();

        while let Some(ch) = self.peek() {
            match ch {
                '(' => {
                    self.advance();
                    stack.push(std::mem::replace(&mut current, OpenSequence::new()));
                }
                ')' => {
                    let at = self.pos;
                    self.advance();
                    let Some(enclosing) = stack.pop() else {
                        return Err(PatternSyntaxError::UnmatchedCloseGroup(at));
                    };
                    let closed = current.close();
                    current = enclosing;
                    current.nodes.push(closed);
                }
                '|' => {
                    self.advance();
                    current.seal_branch();
                }
                '[' => {
                    let class = self.parse_class()?;
                    current.nodes.push(class);
                }
                '{' => {
                    let at = self.pos;
                    let bounds = self.parse_counted_quantifier()?;
                    current.set_last_bounds(bounds, at)?;
                }
                '?' => {
                    let at = self.pos;
                    self.advance();
                    current.set_last_bounds(Bounds::new(0, 1), at)?;
                }
                '*' => {
                    let at = self.pos;
                    self.advance();
                    current.set_last_bounds(Bounds::new(0, MAX_REPEAT), at)?;
                }
                '+' => {
                    let at = self.pos;
                    self.advance();
                    current.set_last_bounds(Bounds::new(1, MAX_REPEAT), at)?;
                }
                '.' => {
                    self.advance();
                    current
                        .nodes
                        .push(Node::new(NodeKind::Class(self.alphabet.to_vec())));
                }
                '\\' => {
                    self.advance();
                    current.nodes.push(self.parse_escape());
                }
                literal => {
                    self.advance();
                    current.nodes.push(Node::new(NodeKind::Class(vec![literal])));
                }
            }
        }

        if !stack.is_empty() {
            return Err(PatternSyntaxError::UnmatchedOpenGroup);
        }
        Ok(current.close_root())
    }

    /// Parse what follows a backslash.
    ///
    /// A single digit forms a backreference (`\3` → BackRef(3); a second
    /// digit is a separate literal). Anything else is the escaped character
    /// as a literal, including a lone backslash at the end of the pattern.
    fn parse_escape(&mut self) -> Node {
        match self.advance() {
            Some(digit) if digit.is_ascii_digit() => {
                let index = (digit as u8 - b'0') as usize;
                Node::new(NodeKind::BackRef(index))
            }
            Some(ch) => Node::new(NodeKind::Class(vec![ch])),
            None => Node::new(NodeKind::Class(vec!['\\'])),
        }
    }

    /// Parse a character class, e.g. `[abc]`, `[a-f0-9]`, or `[^abc]`.
    ///
    /// Ranges expand ascending by code point; a descending range expands to
    /// nothing. A `-` that is first, last, or followed by `]` is a literal.
    /// Inversion subtracts the sorted class from the sorted alphabet in one
    /// merge pass: each explicit character consumes the first alphabet
    /// character at or above it, so duplicate entries eat extra alphabet
    /// characters. An empty body is an error only when not inverted.
    fn parse_class(&mut self) -> Result<Node, PatternSyntaxError> {
        let open_at = self.pos;
        self.advance();

        let invert = if self.peek() == Some('^') {
            self.advance();
            true
        } else {
            false
        };

        let mut chars = Vec::new();
        loop {
            match self.peek() {
                None => return Err(PatternSyntaxError::UnterminatedClass(open_at)),
                Some(']') => {
                    self.advance();
                    break;
                }
                Some(start) => match (self.peek_ahead(1), self.peek_ahead(2)) {
                    (Some('-'), Some(end)) if end != ']' => {
                        chars.extend((start as u32..=end as u32).filter_map(char::from_u32));
                        self.pos += 3;
                    }
                    _ => {
                        chars.push(start);
                        self.pos += 1;
                    }
                },
            }
        }

        if invert {
            chars.sort_unstable();
            Ok(Node::new(NodeKind::Class(invert_class(
                &chars,
                self.alphabet,
            ))))
        } else if chars.is_empty() {
            Err(PatternSyntaxError::EmptyClass(open_at))
        } else {
            Ok(Node::new(NodeKind::Class(chars)))
        }
    }

    /// Parse a counted quantifier `{m}`, `{m,}` or `{m,n}`.
    ///
    /// `{m}` → (m,m); `{m,}` → (m, m+MAX_REPEAT). A written maximum of 0 is
    /// indistinguishable from an omitted one and is treated the same way.
    /// More than one comma or any non-digit is a syntax error; m > n is a
    /// range error. A pattern ending before `}` applies whatever was parsed.
    fn parse_counted_quantifier(&mut self) -> Result<Bounds, PatternSyntaxError> {
        self.advance();

        let mut counts = [0usize; 2];
        let mut side = 0;
        loop {
            match self.peek() {
                None => break,
                Some('}') => {
                    self.advance();
                    break;
                }
                Some(',') => {
                    side += 1;
                    if side > 1 {
                        return Err(PatternSyntaxError::QuantifierSyntax {
                            position: self.pos,
                            found: ',',
                        });
                    }
                    self.advance();
                }
                Some(digit) if digit.is_ascii_digit() => {
                    counts[side] = counts[side] * 10 + (digit as u8 - b'0') as usize;
                    self.advance();
                }
                Some(other) => {
                    return Err(PatternSyntaxError::QuantifierSyntax {
                        position: self.pos,
                        found: other,
                    });
                }
            }
        }

        if side == 0 {
            counts[1] = counts[0];
        } else if counts[1] == 0 {
            counts[1] = counts[0] + MAX_REPEAT;
        }
        if counts[0] > counts[1] {
            return Err(PatternSyntaxError::QuantifierRange {
                min: counts[0],
                max: counts[1],
            });
        }
        Ok(Bounds::new(counts[0], counts[1]))
    }
}

/// Subtract `sorted` from the sorted alphabet in one merge pass.
fn invert_class(sorted: &[char], alphabet: &[char]) -> Vec<char> {
    let mut inverted = Vec::new();
    let mut next = 0;
    for &ch in alphabet {
        if next < sorted.len() && ch >= sorted[next] {
            next += 1;
        } else {
            inverted.push(ch);
        }
    }
    inverted
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::alphabet::reference_alphabet;

    fn compiled(pattern: &str) -> Node {
        compile(pattern, &reference_alphabet()).expect("pattern should compile")
    }

    fn error(pattern: &str) -> PatternSyntaxError {
        compile(pattern, &reference_alphabet()).expect_err("pattern should not compile")
    }

    fn lit(ch: char) -> Node {
        Node::new(NodeKind::Class(vec![ch]))
    }

    fn seq(nodes: Vec<Node>) -> Node {
        Node::new(NodeKind::Sequence(nodes))
    }

    #[test]
    fn literal_pattern_is_one_class_per_character() {
        assert_eq!(compiled("abc"), seq(vec![lit('a'), lit('b'), lit('c')]));
    }

    #[test]
    fn empty_pattern_is_an_empty_sequence() {
        assert_eq!(compiled(""), seq(vec![]));
    }

    #[test]
    fn dot_covers_the_whole_alphabet() {
        let alphabet = reference_alphabet();
        assert_eq!(compiled("."), seq(vec![Node::new(NodeKind::Class(alphabet))]));
    }

    #[test]
    fn escape_neutralizes_metacharacters() {
        assert_eq!(compiled(r"\*\(\["), seq(vec![lit('*'), lit('('), lit('[')]));
    }

    #[test]
    fn escaped_digit_is_a_backreference() {
        assert_eq!(
            compiled(r"\3"),
            seq(vec![Node::new(NodeKind::BackRef(3))])
        );
    }

    #[test]
    fn backreference_takes_a_single_digit_only() {
        // \12 is backreference 1 followed by the literal 2
        assert_eq!(
            compiled(r"\12"),
            seq(vec![Node::new(NodeKind::BackRef(1)), lit('2')])
        );
    }

    #[test]
    fn trailing_backslash_is_a_literal() {
        assert_eq!(compiled("a\\"), seq(vec![lit('a'), lit('\\')]));
    }

    #[test]
    fn quantifiers_overwrite_the_last_nodes_bounds() {
        let root = compiled("a?b*c+");
        let NodeKind::Sequence(nodes) = &root.kind else {
            panic!("expected sequence, got {root:?}");
        };
        assert_eq!(nodes[0].bounds, Bounds::new(0, 1));
        assert_eq!(nodes[1].bounds, Bounds::new(0, MAX_REPEAT));
        assert_eq!(nodes[2].bounds, Bounds::new(1, MAX_REPEAT));
    }

    #[test]
    fn counted_quantifier_forms() {
        let bounds_of = |pattern: &str| {
            let root = compiled(pattern);
            let NodeKind::Sequence(nodes) = root.kind else {
                panic!("expected sequence");
            };
            nodes[0].bounds
        };
        assert_eq!(bounds_of("a{3}"), Bounds::new(3, 3));
        assert_eq!(bounds_of("a{2,}"), Bounds::new(2, 2 + MAX_REPEAT));
        assert_eq!(bounds_of("a{2,4}"), Bounds::new(2, 4));
        // a written maximum of 0 reads as an omitted maximum
        assert_eq!(bounds_of("a{2,0}"), Bounds::new(2, 2 + MAX_REPEAT));
    }

    #[test]
    fn quantifier_applies_to_a_whole_group() {
        let root = compiled("(ab){2,3}");
        let NodeKind::Sequence(nodes) = &root.kind else {
            panic!("expected sequence");
        };
        assert_eq!(nodes[0].bounds, Bounds::new(2, 3));
        assert!(matches!(nodes[0].kind, NodeKind::Sequence(_)));
    }

    #[test]
    fn extra_comma_in_quantifier_is_rejected() {
        assert_eq!(
            error("a{1,2,3}"),
            PatternSyntaxError::QuantifierSyntax {
                position: 5,
                found: ','
            }
        );
    }

    #[test]
    fn non_digit_in_quantifier_is_rejected() {
        assert_eq!(
            error("a{x}"),
            PatternSyntaxError::QuantifierSyntax {
                position: 2,
                found: 'x'
            }
        );
    }

    #[test]
    fn inverted_quantifier_range_is_rejected() {
        assert_eq!(
            error("a{3,2}"),
            PatternSyntaxError::QuantifierRange { min: 3, max: 2 }
        );
    }

    #[test]
    fn quantifier_needs_something_to_repeat() {
        assert_eq!(error("*a"), PatternSyntaxError::DanglingQuantifier(0));
        assert_eq!(error("a|?b"), PatternSyntaxError::DanglingQuantifier(2));
        assert_eq!(error("({2})"), PatternSyntaxError::DanglingQuantifier(1));
    }

    #[test]
    fn class_keeps_characters_as_written() {
        assert_eq!(
            compiled("[cba]"),
            seq(vec![Node::new(NodeKind::Class(vec!['c', 'b', 'a']))])
        );
    }

    #[test]
    fn class_range_expands_ascending() {
        assert_eq!(
            compiled("[a-d]"),
            seq(vec![Node::new(NodeKind::Class(vec!['a', 'b', 'c', 'd']))])
        );
    }

    #[test]
    fn descending_range_contributes_nothing() {
        assert_eq!(
            compiled("[xz-a]"),
            seq(vec![Node::new(NodeKind::Class(vec!['x']))])
        );
    }

    #[test]
    fn dash_at_the_edge_of_a_class_is_literal() {
        assert_eq!(
            compiled("[a-]"),
            seq(vec![Node::new(NodeKind::Class(vec!['a', '-']))])
        );
        assert_eq!(
            compiled("[-a]"),
            seq(vec![Node::new(NodeKind::Class(vec!['-', 'a']))])
        );
    }

    #[test]
    fn inverted_class_excludes_its_characters() {
        let alphabet = reference_alphabet();
        let root = compiled("[^abc]");
        let NodeKind::Sequence(nodes) = &root.kind else {
            panic!("expected sequence");
        };
        let NodeKind::Class(chars) = &nodes[0].kind else {
            panic!("expected class");
        };
        assert_eq!(chars.len(), alphabet.len() - 3);
        for ch in ['a', 'b', 'c'] {
            assert!(!chars.contains(&ch));
        }
        assert!(chars.iter().all(|ch| alphabet.contains(ch)));
    }

    #[test]
    fn inverted_class_duplicates_consume_extra_alphabet_characters() {
        // The merge subtraction pairs each explicit character with the next
        // alphabet character at or above it, so [^aa] also drops 'b'.
        let root = compiled("[^aa]");
        let NodeKind::Sequence(nodes) = &root.kind else {
            panic!("expected sequence");
        };
        let NodeKind::Class(chars) = &nodes[0].kind else {
            panic!("expected class");
        };
        assert!(!chars.contains(&'a'));
        assert!(!chars.contains(&'b'));
        assert!(chars.contains(&'c'));
    }

    #[test]
    fn inverting_an_empty_body_yields_the_whole_alphabet() {
        assert_eq!(
            compiled("[^]"),
            seq(vec![Node::new(NodeKind::Class(reference_alphabet()))])
        );
    }

    #[test]
    fn empty_class_is_rejected() {
        assert_eq!(error("[]"), PatternSyntaxError::EmptyClass(0));
        // a class whose only content is a descending range ends up empty too
        assert_eq!(error("[z-a]"), PatternSyntaxError::EmptyClass(0));
    }

    #[test]
    fn unterminated_class_is_rejected() {
        assert_eq!(error("[abc"), PatternSyntaxError::UnterminatedClass(0));
        assert_eq!(error("a["), PatternSyntaxError::UnterminatedClass(1));
    }

    #[test]
    fn group_nests_a_sequence() {
        assert_eq!(compiled("(ab)"), seq(vec![seq(vec![lit('a'), lit('b')])]));
    }

    #[test]
    fn empty_group_compiles() {
        assert_eq!(compiled("()"), seq(vec![seq(vec![])]));
    }

    #[test]
    fn unmatched_close_group_is_rejected() {
        assert_eq!(error("abc)"), PatternSyntaxError::UnmatchedCloseGroup(3));
    }

    #[test]
    fn unmatched_open_group_is_rejected() {
        assert_eq!(error("(abc"), PatternSyntaxError::UnmatchedOpenGroup);
        assert_eq!(error("((a)"), PatternSyntaxError::UnmatchedOpenGroup);
    }

    #[test]
    fn top_level_alternation_sits_under_the_root_sequence() {
        assert_eq!(
            compiled("a|b"),
            seq(vec![Node::new(NodeKind::Alternation(vec![
                vec![lit('a')],
                vec![lit('b')],
            ]))])
        );
    }

    #[test]
    fn grouped_alternation_collects_every_branch() {
        assert_eq!(
            compiled("(a|b|c)"),
            seq(vec![Node::new(NodeKind::Alternation(vec![
                vec![lit('a')],
                vec![lit('b')],
                vec![lit('c')],
            ]))])
        );
    }

    #[test]
    fn alternation_branch_may_be_empty() {
        assert_eq!(
            compiled("(a|)"),
            seq(vec![Node::new(NodeKind::Alternation(vec![
                vec![lit('a')],
                vec![],
            ]))])
        );
    }

    #[test]
    fn alternation_mixes_with_surrounding_literals() {
        assert_eq!(
            compiled("x(a|b)y"),
            seq(vec![
                lit('x'),
                Node::new(NodeKind::Alternation(vec![vec![lit('a')], vec![lit('b')]])),
                lit('y'),
            ])
        );
    }

    #[test]
    fn compiling_twice_yields_identical_trees() {
        let pattern = r"(cat|dog)[a-f]{2,4}\1.";
        assert_eq!(compiled(pattern), compiled(pattern));
    }
}

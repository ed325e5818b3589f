use thiserror::Error;

/// A syntax error found while compiling a pattern.
///
/// All failures happen at compile time; generation from a compiled pattern
/// never fails. Positions are character indices into the pattern string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternSyntaxError {
    #[error("unmatched ')' at position {0}")]
    UnmatchedCloseGroup(usize),
    #[error("unclosed '(': missing ')'")]
    UnmatchedOpenGroup,
    #[error("character class opened at position {0} is missing its ']'")]
    UnterminatedClass(usize),
    #[error("empty character class at position {0}")]
    EmptyClass(usize),
    #[error("bad quantifier at position {position}: unexpected {found:?}")]
    QuantifierSyntax { position: usize, found: char },
    #[error("quantifier minimum {min} is bigger than maximum {max}")]
    QuantifierRange { min: usize, max: usize },
    #[error("quantifier at position {0} has nothing to repeat")]
    DanglingQuantifier(usize),
}

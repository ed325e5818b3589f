//! Random string generation from a restricted regular expression.
//!
//! A pattern is compiled once into a tree of typed nodes, then walked as many
//! times as desired, producing one random matching string per walk. This is
//! generation only: there is no matching, no anchors, no lookaround.

pub mod alphabet;
pub mod ast;
pub mod error;
pub mod generator;
pub mod parser;

use rand::Rng;

pub use crate::error::PatternSyntaxError;

/// A compiled pattern, ready to generate random matching strings.
///
/// The tree is immutable after compilation and may be shared across threads;
/// all per-call state (the capture table and its index counter) lives inside
/// each `generate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    root: ast::Node,
}

impl Pattern {
    /// Compile a pattern against the reference alphabet.
    pub fn compile(pattern: &str) -> Result<Self, PatternSyntaxError> {
        Self::compile_with_alphabet(pattern, &alphabet::reference_alphabet())
    }

    /// Compile a pattern against a caller-supplied alphabet, which must be
    /// sorted ascending by code point.
    pub fn compile_with_alphabet(
        pattern: &str,
        alphabet: &[char],
    ) -> Result<Self, PatternSyntaxError> {
        let root = parser::compile(pattern, alphabet)?;
        Ok(Self { root })
    }

    /// Generate one random matching string using the thread-local RNG.
    pub fn generate(&self) -> String {
        self.generate_with(&mut rand::thread_rng())
    }

    /// Generate one random matching string from the given RNG. Seed the RNG
    /// for reproducible output.
    pub fn generate_with<R: Rng>(&self, rng: &mut R) -> String {
        generator::generate(&self.root, rng)
    }

    /// The root node of the compiled tree.
    pub fn root(&self) -> &ast::Node {
        &self.root
    }
}

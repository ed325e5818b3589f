/// Inclusive repetition bound attached to every pattern node.
///
/// Quantifier suffixes (`?`, `*`, `+`, `{m,n}`) overwrite the bounds of the
/// node they follow; everything else keeps the default of exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: usize,
    pub max: usize,
}

impl Bounds {
    pub const ONCE: Bounds = Bounds { min: 1, max: 1 };

    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::ONCE
    }
}

/// One unit of a compiled pattern: repetition bounds plus the node shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub bounds: Bounds,
    pub kind: NodeKind,
}

impl Node {
    /// Create a node with the default bounds of exactly one repetition.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            bounds: Bounds::ONCE,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Concatenation of children, repeated as a whole per the node's bounds.
    /// Claims a capture index when generated.
    Sequence(Vec<Node>),
    /// Two or more alternative branches; one branch is chosen at random per
    /// repetition. Branches are plain child lists rather than `Sequence`
    /// nodes: a branch never claims a capture index of its own, never carries
    /// a quantifier, and always runs exactly once per choice.
    /// Claims a capture index when generated.
    Alternation(Vec<Vec<Node>>),
    /// One character chosen at random from the list per repetition. The list
    /// is kept exactly as written in the pattern, neither sorted nor
    /// deduplicated.
    Class(Vec<char>),
    /// Repeats the text captured under the given index, or contributes
    /// nothing if that index was never produced.
    BackRef(usize),
}

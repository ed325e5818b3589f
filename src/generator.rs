use std::collections::HashMap;

use rand::Rng;

use crate::ast::{Bounds, Node, NodeKind};

/// Call-scoped generation state: the capture table and the discovery-order
/// counter behind backreferences. Built fresh for every generated string and
/// dropped when the call returns, so nothing leaks between outputs.
struct GenContext<'r, R: Rng> {
    rng: &'r mut R,
    captures: HashMap<usize, String>,
    next_index: usize,
}

impl<'r, R: Rng> GenContext<'r, R> {
    /// Hand out the next capture index. Indices follow generation order, not
    /// the lexical order of groups in the pattern: a group that is skipped
    /// (an untaken alternation branch) claims nothing, and the root sequence
    /// itself always claims index 0.
    fn claim_index(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    /// Draw a repetition count uniformly from the node's inclusive bounds.
    fn repetitions(&mut self, bounds: Bounds) -> usize {
        self.rng.gen_range(bounds.min..=bounds.max)
    }
}

/// Produce one random string matching the compiled pattern.
///
/// Never fails: every node kind has a defined result for every bound and
/// every capture-table state, including absent backreference indices.
pub fn generate<R: Rng>(root: &Node, rng: &mut R) -> String {
    let mut ctx = GenContext {
        rng,
        captures: HashMap::new(),
        next_index: 0,
    };
    generate_node(root, &mut ctx)
}

fn generate_node<R: Rng>(node: &Node, ctx: &mut GenContext<R>) -> String {
    match &node.kind {
        NodeKind::Sequence(children) => {
            // Claim before recursing so nested groups number after their
            // enclosing group; store only after the text is complete, so a
            // backreference to an enclosing group resolves to nothing.
            let index = ctx.claim_index();
            let repetitions = ctx.repetitions(node.bounds);
            let mut result = String::new();
            for _ in 0..repetitions {
                for child in children {
                    result.push_str(&generate_node(child, ctx));
                }
            }
            ctx.captures.insert(index, result.clone());
            result
        }
        NodeKind::Alternation(branches) => {
            let index = ctx.claim_index();
            let repetitions = ctx.repetitions(node.bounds);
            let mut result = String::new();
            for _ in 0..repetitions {
                let branch = &branches[ctx.rng.gen_range(0..branches.len())];
                for child in branch {
                    result.push_str(&generate_node(child, ctx));
                }
            }
            ctx.captures.insert(index, result.clone());
            result
        }
        NodeKind::Class(chars) => {
            let mut result = String::new();
            if !chars.is_empty() {
                for _ in 0..ctx.repetitions(node.bounds) {
                    result.push(chars[ctx.rng.gen_range(0..chars.len())]);
                }
            }
            result
        }
        NodeKind::BackRef(index) => match ctx.captures.get(index).cloned() {
            Some(text) => text.repeat(ctx.repetitions(node.bounds)),
            None => String::new(),
        },
    }
}

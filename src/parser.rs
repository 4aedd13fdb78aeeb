//! Bracketed tree parser
//!
//! Reads Penn-Treebank-style constituency trees into `Tree`s. The pest
//! grammar only splits the input into brackets and atoms; nesting is tracked
//! with an explicit stack so deep trees cannot exhaust the call stack.

use pest::Parser;
use pest::error::InputLocation;
use pest_derive::Parser;
use thiserror::Error;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::tree::{NodeId, NodeKind, Tree};

#[derive(Parser)]
#[grammar = "bracket.pest"]
struct BracketParser;

/// Error type for tree parsing failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Malformed tree at byte {offset}: {message}")]
    Malformed { offset: usize, message: String },

    #[error("Empty sentence: tree has no words")]
    EmptySentence,

    #[error("Tree nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

impl TreeError {
    fn malformed(offset: usize, message: &str) -> Self {
        TreeError::Malformed {
            offset,
            message: message.to_string(),
        }
    }
}

impl From<pest::error::Error<Rule>> for TreeError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let offset = match err.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };
        TreeError::Malformed {
            offset,
            message: err.variant.message().to_string(),
        }
    }
}

/// Parse a bracketed tree using the default nesting limit
pub fn parse_tree(input: &str) -> Result<Tree, TreeError> {
    parse_tree_with_limit(input, DEFAULT_MAX_DEPTH)
}

/// Parse a bracketed tree, rejecting nesting deeper than `max_depth`
///
/// The root may be unlabeled (`( (S ...))`); every other node needs a label.
/// A tree without words is an `EmptySentence` error.
pub fn parse_tree_with_limit(input: &str, max_depth: usize) -> Result<Tree, TreeError> {
    let mut pairs = BracketParser::parse(Rule::tokens, input)?;
    let Some(tokens) = pairs.next() else {
        return Err(TreeError::EmptySentence);
    };

    let mut tree = Tree::new();
    let mut stack: Vec<NodeId> = Vec::new();
    // The node on top of the stack was just opened and has no label yet
    let mut expect_label = false;

    for token in tokens.into_inner() {
        let offset = token.as_span().start();
        match token.as_rule() {
            Rule::open => {
                if stack.is_empty() && tree.root_id.is_some() {
                    return Err(TreeError::malformed(offset, "more than one top-level tree"));
                }
                if stack.len() >= max_depth {
                    return Err(TreeError::TooDeep { limit: max_depth });
                }
                if expect_label {
                    check_unlabeled(&stack, offset)?;
                }
                let id = tree.add_node("", NodeKind::Phrase, stack.last().copied());
                stack.push(id);
                expect_label = true;
            }
            Rule::atom => {
                let Some(&top) = stack.last() else {
                    return Err(TreeError::malformed(offset, "text outside brackets"));
                };
                if expect_label {
                    if let Some(node) = tree.get_node_mut(top) {
                        node.label = token.as_str().to_string();
                    }
                    expect_label = false;
                } else {
                    if tree.nodes[top].label.is_empty() {
                        return Err(TreeError::malformed(offset, "word lacks a governing tag"));
                    }
                    tree.add_node(token.as_str(), NodeKind::Word, Some(top));
                }
            }
            Rule::close => {
                if stack.is_empty() {
                    return Err(TreeError::malformed(offset, "unbalanced ')'"));
                }
                if expect_label {
                    check_unlabeled(&stack, offset)?;
                }
                stack.pop();
                expect_label = false;
            }
            _ => {} // EOI
        }
    }

    if !stack.is_empty() {
        return Err(TreeError::malformed(input.len(), "unclosed '('"));
    }
    if tree.leaf_ids().is_empty() {
        return Err(TreeError::EmptySentence);
    }

    Ok(tree)
}

// Only the root may go without a label
fn check_unlabeled(stack: &[NodeId], offset: usize) -> Result<(), TreeError> {
    if stack.len() > 1 {
        Err(TreeError::malformed(offset, "missing phrase label"))
    } else {
        Ok(())
    }
}

//! Synfeats: word-level syntactic features from constituency parses
//!
//! Derives, for every word of a parsed sentence, the features used by
//! prosody models: HBCW, HEPW, the lowest common ancestor of adjacent words,
//! and their syntactic distance. Core implementation in Rust with Python
//! bindings.

pub mod config; // Extraction settings
pub mod constituents; // Per-sentence constituent index
pub mod features; // HBCW, HEPW, LCA, syntactic distance
pub mod parser; // Bracketed tree parser
pub mod tree; // Arena constituency trees
pub mod treebank; // Files, globs, parallel extraction

// Python bindings
#[cfg(feature = "pyo3")]
pub mod python;

// Re-exports for convenience
pub use config::FeatureConfig;
pub use constituents::{Constituent, ConstituentIndex};
pub use features::{Extractor, FeatureRecord, SentenceFeatures, extract_features};
pub use parser::{TreeError, parse_tree};
pub use tree::{Node, NodeId, NodeKind, Tree};
pub use treebank::{Treebank, TreebankError};

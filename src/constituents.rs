//! Constituent index for feature lookup
//!
//! One pass over a sentence's tree collects every phrase that directly
//! dominates a pre-terminal, as `(label, phrase, height)` triples. Single-word
//! phrases are dropped and duplicates removed. Discovery (pre-order) order is
//! kept, and feature lookups use it to break ties between equally long
//! phrases.

use memchr::memmem;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::tree::{NodeId, Tree};

/// A multi-word phrase of the sentence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constituent {
    pub label: String,
    /// Space-joined words spanned by the phrase
    pub phrase: String,
    /// Normalized sentence height minus the depth of the phrase node
    pub height: i32,
}

impl Constituent {
    pub fn new(label: &str, phrase: &str, height: i32) -> Self {
        Self {
            label: label.to_string(),
            phrase: phrase.to_string(),
            height,
        }
    }

    /// Number of words in the phrase
    pub fn word_count(&self) -> usize {
        self.phrase.split(' ').count()
    }

    pub fn first_word(&self) -> &str {
        self.phrase.split(' ').next().unwrap_or("")
    }

    pub fn last_word(&self) -> &str {
        self.phrase.rsplit(' ').next().unwrap_or("")
    }

    /// Raw substring test against the joined phrase text
    #[inline]
    pub fn contains(&self, needle: &str) -> bool {
        memmem::find(self.phrase.as_bytes(), needle.as_bytes()).is_some()
    }
}

/// Deduplicated constituents of one sentence
#[derive(Debug, Clone, Default)]
pub struct ConstituentIndex {
    constituents: Vec<Constituent>,
    /// Index by first word of the phrase
    by_first: FxHashMap<String, Vec<usize>>,
    /// Index by last word of the phrase
    by_last: FxHashMap<String, Vec<usize>>,
}

impl ConstituentIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index for `tree`, with `sentence_height` the normalized tree height
    pub fn build(tree: &Tree, sentence_height: i32) -> Self {
        Self::from_constituents(collect_constituents(tree, sentence_height))
    }

    /// Build from raw triples: single-word phrases are dropped, duplicates keep their first position
    pub fn from_constituents<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = Constituent>,
    {
        let mut index = Self::new();
        let mut seen: FxHashSet<Constituent> = FxHashSet::default();

        for constituent in raw {
            if constituent.word_count() > 1 && !seen.contains(&constituent) {
                seen.insert(constituent.clone());
                index.add(constituent);
            }
        }

        index
    }

    fn add(&mut self, constituent: Constituent) {
        let position = self.constituents.len();

        self.by_first
            .entry(constituent.first_word().to_string())
            .or_default()
            .push(position);

        self.by_last
            .entry(constituent.last_word().to_string())
            .or_default()
            .push(position);

        self.constituents.push(constituent);
    }

    pub fn len(&self) -> usize {
        self.constituents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constituents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constituent> {
        self.constituents.iter()
    }

    pub fn get(&self, position: usize) -> Option<&Constituent> {
        self.constituents.get(position)
    }

    /// Constituents whose phrase starts with `word`, in discovery order
    pub fn starting_with(&self, word: &str) -> impl Iterator<Item = &Constituent> {
        self.lookup(&self.by_first, word)
    }

    /// Constituents whose phrase ends with `word`, in discovery order
    pub fn ending_with(&self, word: &str) -> impl Iterator<Item = &Constituent> {
        self.lookup(&self.by_last, word)
    }

    fn lookup<'a>(
        &'a self,
        map: &'a FxHashMap<String, Vec<usize>>,
        word: &str,
    ) -> impl Iterator<Item = &'a Constituent> {
        map.get(word)
            .map(|positions| positions.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&position| &self.constituents[position])
    }
}

/// Walk the tree and record, for every pre-terminal, its parent phrase
///
/// Pre-terminals are not expanded further. The recorded height is measured at
/// the parent: `sentence_height - depth(parent)`. A pre-terminal root records
/// nothing.
pub fn collect_constituents(tree: &Tree, sentence_height: i32) -> Vec<Constituent> {
    let mut result = Vec::new();
    let mut recorded: FxHashSet<NodeId> = FxHashSet::default();
    let mut stack: Vec<NodeId> = tree.root_id.into_iter().collect();

    while let Some(id) = stack.pop() {
        let node = &tree.nodes[id];
        if node.is_word() {
            continue;
        }

        if tree.is_preterminal(id) {
            if let Some(parent) = tree.parent(id) {
                // Sibling pre-terminals yield the same triple
                if recorded.insert(parent.id) {
                    let height = sentence_height - parent.depth as i32;
                    result.push(Constituent::new(&parent.label, &tree.phrase(parent.id), height));
                }
            }
            continue;
        }

        stack.extend(node.children.iter().rev());
    }

    result
}

/// Normalized height of each word's pre-terminal, aligned with `tree.leaves()`
pub fn leaf_heights(tree: &Tree, sentence_height: i32) -> Vec<i32> {
    tree.leaf_ids()
        .iter()
        .map(|&id| sentence_height - (tree.depth(id) as i32 - 1))
        .collect()
}

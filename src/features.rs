//! Word-level syntactic features
//!
//! For every word of a sentence:
//! - HBCW: the highest-level (most words) phrase beginning with the word
//! - HEPW: the highest-level phrase ending with the previous word
//! - LCA: the smallest phrase containing the previous word and the word
//! - syntactic distance between the two words' pre-terminals via their LCA
//!
//! "Previous" wraps around: the previous word of position 0 is the last word.
//! Ties between equally long phrases go to the one found first in the tree.

use tracing::debug;

use crate::config::FeatureConfig;
use crate::constituents::{Constituent, ConstituentIndex, leaf_heights};
use crate::parser::{TreeError, parse_tree_with_limit};
use crate::tree::Tree;

/// Lowest common ancestor of a word and its predecessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lca<'a> {
    pub label: &'a str,
    pub height: i32,
}

/// Features of one emitted word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    /// Index of the word in the full leaf sequence
    pub position: usize,
    pub word: String,
    pub hepw: String,
    pub hbcw: String,
    pub lca: String,
    pub lca_height: i32,
    pub distance: i32,
}

/// Features of one sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceFeatures {
    pub records: Vec<FeatureRecord>,
    /// Number of words in the tree, skipped ones included
    pub word_count: usize,
    /// Normalized sentence height
    pub height: i32,
}

#[inline]
fn previous(i: usize, n: usize) -> usize {
    (i + n - 1) % n
}

// First candidate with the most words
fn longest<'a>(candidates: impl Iterator<Item = &'a Constituent>) -> Option<&'a Constituent> {
    let mut best: Option<(&Constituent, usize)> = None;
    for c in candidates {
        let n = c.word_count();
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((c, n));
        }
    }
    best.map(|(c, _)| c)
}

// First candidate with the fewest words
fn shortest<'a>(candidates: impl Iterator<Item = &'a Constituent>) -> Option<&'a Constituent> {
    let mut best: Option<(&Constituent, usize)> = None;
    for c in candidates {
        let n = c.word_count();
        if best.is_none_or(|(_, m)| n < m) {
            best = Some((c, n));
        }
    }
    best.map(|(c, _)| c)
}

/// Highest-level phrase beginning with the current word
pub fn hbcw<'a>(
    index: &'a ConstituentIndex,
    words: &[&str],
    config: &'a FeatureConfig,
) -> Vec<&'a str> {
    words
        .iter()
        .map(|&word| {
            let candidates = index
                .starting_with(word)
                .filter(|c| c.label != config.sentence_label);
            longest(candidates).map_or(config.none_label.as_str(), |c| c.label.as_str())
        })
        .collect()
}

/// Highest-level phrase ending with the previous word
pub fn hepw<'a>(
    index: &'a ConstituentIndex,
    words: &[&str],
    config: &'a FeatureConfig,
) -> Vec<&'a str> {
    let n = words.len();
    (0..n)
        .map(|i| {
            let prev = words[previous(i, n)];
            let candidates = index
                .ending_with(prev)
                .filter(|c| c.label != config.sentence_label);
            longest(candidates).map_or(config.none_label.as_str(), |c| c.label.as_str())
        })
        .collect()
}

/// Smallest phrase whose text contains "previous current"
///
/// Falls back to the sentence label one level below the sentence height.
pub fn lca<'a>(
    index: &'a ConstituentIndex,
    words: &[&str],
    sentence_height: i32,
    config: &'a FeatureConfig,
) -> Vec<Lca<'a>> {
    let n = words.len();
    let mut pair = String::new();
    (0..n)
        .map(|i| {
            pair.clear();
            pair.push_str(words[previous(i, n)]);
            pair.push(' ');
            pair.push_str(words[i]);

            match shortest(index.iter().filter(|c| c.contains(&pair))) {
                Some(c) => Lca {
                    label: &c.label,
                    height: c.height,
                },
                None => Lca {
                    label: &config.sentence_label,
                    height: sentence_height - 1,
                },
            }
        })
        .collect()
}

/// Syntactic distance between each word and its predecessor
///
/// `D = (H_lca - H_cur) + (H_lca - H_prev)`, where `H_cur` and `H_prev` are
/// the pre-terminal heights of the two words.
pub fn syntactic_distance(lcas: &[Lca<'_>], leaf_heights: &[i32]) -> Vec<i32> {
    let n = lcas.len();
    (0..n)
        .map(|i| {
            let hl = lcas[i].height;
            let d_cl = hl - leaf_heights[i];
            let d_pl = hl - leaf_heights[previous(i, n)];
            d_cl + d_pl
        })
        .collect()
}

/// Feature extractor with a fixed configuration
///
/// Holds no per-sentence state; one extractor can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: FeatureConfig,
}

impl Extractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Parse a bracketed tree and compute its word features
    pub fn extract(&self, text: &str) -> Result<SentenceFeatures, TreeError> {
        let tree = parse_tree_with_limit(text, self.config.max_depth)?;
        self.extract_tree(&tree)
    }

    /// Compute word features for an already parsed tree
    pub fn extract_tree(&self, tree: &Tree) -> Result<SentenceFeatures, TreeError> {
        let words = tree.leaves();
        if words.is_empty() {
            return Err(TreeError::EmptySentence);
        }

        let height = tree.height() as i32 - self.config.height_offset as i32;
        let index = ConstituentIndex::build(tree, height);

        let hepw = hepw(&index, &words, &self.config);
        let hbcw = hbcw(&index, &words, &self.config);
        let lca = lca(&index, &words, height, &self.config);
        let distance = syntactic_distance(&lca, &leaf_heights(tree, height));

        let records: Vec<FeatureRecord> = words
            .iter()
            .enumerate()
            .filter(|(_, word)| !self.config.is_skipped(word))
            .map(|(i, &word)| FeatureRecord {
                position: i,
                word: word.to_string(),
                hepw: hepw[i].to_string(),
                hbcw: hbcw[i].to_string(),
                lca: lca[i].label.to_string(),
                lca_height: lca[i].height,
                distance: distance[i],
            })
            .collect();

        debug!(
            words = words.len(),
            emitted = records.len(),
            constituents = index.len(),
            height,
            "extracted sentence features"
        );

        Ok(SentenceFeatures {
            records,
            word_count: words.len(),
            height,
        })
    }
}

/// Compute word features for a bracketed tree with the default configuration
pub fn extract_features(text: &str) -> Result<Vec<FeatureRecord>, TreeError> {
    Extractor::default()
        .extract(text)
        .map(|sentence| sentence.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_tree;

    const CAT_SAT: &str = "(S (NP (DT The) (NN cat)) (VP (VBD sat)))";
    const BIG_DOG: &str = "(ROOT (S (NP (DT The) (JJ big) (NN dog)) (VP (VBD chased) (NP (DT the) (NN cat))) (. .)))";

    fn setup(text: &str) -> (Tree, ConstituentIndex, i32) {
        let tree = parse_tree(text).unwrap();
        let height = tree.height() as i32 - 2;
        let index = ConstituentIndex::build(&tree, height);
        (tree, index, height)
    }

    #[test]
    fn test_hbcw() {
        let config = FeatureConfig::default();
        let (tree, index, _) = setup(BIG_DOG);
        let words = tree.leaves();

        assert_eq!(
            hbcw(&index, &words, &config),
            vec!["NP", "NONE", "NONE", "VP", "NP", "NONE", "NONE"]
        );
    }

    #[test]
    fn test_hepw() {
        let config = FeatureConfig::default();
        let (tree, index, _) = setup(BIG_DOG);
        let words = tree.leaves();

        // Position 0 looks at "." (wraps around), which only ends the S
        assert_eq!(
            hepw(&index, &words, &config),
            vec!["NONE", "NONE", "NONE", "NP", "NONE", "NONE", "VP"]
        );
    }

    #[test]
    fn test_hepw_wraparound() {
        let config = FeatureConfig::default();
        let (tree, index, _) =
            setup("(S (NP (DT The) (NN cat)) (VP (VBD saw) (NP (DT the) (NN cat))))");
        let words = tree.leaves();

        // The last word "cat" closes "saw the cat", the longest non-S phrase
        assert_eq!(hepw(&index, &words, &config)[0], "VP");
    }

    #[test]
    fn test_lca() {
        let config = FeatureConfig::default();
        let (tree, index, height) = setup(BIG_DOG);
        let words = tree.leaves();
        let result: Vec<_> = lca(&index, &words, height, &config)
            .into_iter()
            .map(|l| (l.label, l.height))
            .collect();

        assert_eq!(
            result,
            vec![
                ("S", 3),
                ("NP", 2),
                ("NP", 2),
                ("S", 3),
                ("VP", 2),
                ("NP", 1),
                ("S", 3),
            ]
        );
    }

    #[test]
    fn test_syntactic_distance() {
        let lcas = [
            Lca { label: "S", height: 3 },
            Lca { label: "NP", height: 2 },
            Lca { label: "VP", height: 2 },
        ];
        // (3-1)+(3-0), (2-1)+(2-1), (2-0)+(2-1)
        assert_eq!(syntactic_distance(&lcas, &[1, 1, 0]), vec![5, 2, 3]);
    }

    #[test]
    fn test_tie_break_is_leftmost() {
        let config = FeatureConfig::default();
        let (tree, index, _) = setup("(S (NP (DT a) (NN b)) (VP (VB a) (NN c)))");
        let words = tree.leaves();

        // "a b" and "a c" both start with "a" and have two words
        assert_eq!(hbcw(&index, &words, &config), vec!["NP", "NONE", "NP", "NONE"]);
    }

    #[test]
    fn test_extract_simple_sentence() {
        let records = extract_features(CAT_SAT).unwrap();
        let rows: Vec<_> = records
            .iter()
            .map(|r| {
                (
                    r.word.as_str(),
                    r.hepw.as_str(),
                    r.hbcw.as_str(),
                    r.lca.as_str(),
                    r.distance,
                )
            })
            .collect();

        assert_eq!(
            rows,
            vec![
                ("The", "NONE", "NP", "S", 2),
                ("cat", "NONE", "NONE", "NP", 2),
                ("sat", "NP", "NONE", "S", 2),
            ]
        );
    }

    #[test]
    fn test_extract_skips_punctuation() {
        let sentence = Extractor::default().extract(BIG_DOG).unwrap();

        assert_eq!(sentence.word_count, 7);
        assert_eq!(sentence.height, 4);
        assert_eq!(sentence.records.len(), 6);

        let distances: Vec<_> = sentence.records.iter().map(|r| r.distance).collect();
        assert_eq!(distances, vec![3, 2, 2, 4, 3, 2]);

        let positions: Vec<_> = sentence.records.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_extract_skips_clitics() {
        let text = "(S (NP (NP (NNP John) (POS 's)) (NN dog)) (VP (VBZ does) (RB n't) (VP (VB bark))) (. .))";
        let sentence = Extractor::default().extract(text).unwrap();
        let words: Vec<_> = sentence.records.iter().map(|r| r.word.as_str()).collect();
        let positions: Vec<_> = sentence.records.iter().map(|r| r.position).collect();

        assert_eq!(sentence.word_count, 7);
        assert_eq!(words, vec!["John", "dog", "does", "bark"]);
        assert_eq!(positions, vec![0, 2, 3, 5]);
    }

    #[test]
    fn test_extract_single_word() {
        let records = extract_features("(S (NN hello))").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hbcw, "NONE");
        assert_eq!(records[0].hepw, "NONE");
        assert_eq!(records[0].lca, "S");
        assert_eq!(records[0].lca_height, 0);
        assert_eq!(records[0].distance, 0);
    }

    #[test]
    fn test_custom_config() {
        let config = FeatureConfig::new()
            .with_none_label("-")
            .with_skip_tokens(Vec::<String>::new());
        let sentence = Extractor::new(config).extract(BIG_DOG).unwrap();

        assert_eq!(sentence.records.len(), 7);
        assert_eq!(sentence.records[1].hbcw, "-");
        assert_eq!(sentence.records[6].word, ".");
        assert_eq!(sentence.records[6].distance, 4);
    }

    #[test]
    fn test_extract_tree_rejects_empty() {
        let tree = Tree::new();
        assert_eq!(
            Extractor::default().extract_tree(&tree).unwrap_err(),
            TreeError::EmptySentence
        );
    }
}

//! Extraction settings
//!
//! Defaults reproduce the published feature definitions: the sentence label
//! is `S`, missing phrases are reported as `NONE`, and sentence heights are
//! normalized by 2 so the top sentence wrapper and its child do not inflate
//! every relative height.

use rustc_hash::FxHashSet;

pub const DEFAULT_SENTENCE_LABEL: &str = "S";
pub const DEFAULT_NONE_LABEL: &str = "NONE";
pub const DEFAULT_HEIGHT_OFFSET: usize = 2;
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Clitic fragments that never get their own output record
pub const CLITICS: [&str; 2] = ["'s", "n't"];

/// ASCII punctuation characters (each one is a skipped token on its own)
pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

#[derive(Debug, Clone)]
pub struct FeatureConfig {
    /// Label of the whole-sentence phrase, excluded from HBCW/HEPW and used as the LCA default
    pub sentence_label: String,
    /// Sentinel for HBCW/HEPW when no phrase qualifies
    pub none_label: String,
    pub height_offset: usize,
    /// Tokens that take part in the computation but are not emitted
    pub skip_tokens: FxHashSet<String>,
    /// Maximum bracket nesting accepted by the parser
    pub max_depth: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sentence_label: DEFAULT_SENTENCE_LABEL.to_string(),
            none_label: DEFAULT_NONE_LABEL.to_string(),
            height_offset: DEFAULT_HEIGHT_OFFSET,
            skip_tokens: default_skip_tokens(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FeatureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentence_label(mut self, label: &str) -> Self {
        self.sentence_label = label.to_string();
        self
    }

    pub fn with_none_label(mut self, label: &str) -> Self {
        self.none_label = label.to_string();
        self
    }

    pub fn with_height_offset(mut self, offset: usize) -> Self {
        self.height_offset = offset;
        self
    }

    pub fn with_skip_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether `word` is excluded from the output records
    #[inline]
    pub fn is_skipped(&self, word: &str) -> bool {
        self.skip_tokens.contains(word)
    }
}

/// Single punctuation characters plus the clitic fragments
pub fn default_skip_tokens() -> FxHashSet<String> {
    PUNCTUATION
        .chars()
        .map(String::from)
        .chain(CLITICS.iter().map(|c| c.to_string()))
        .collect()
}

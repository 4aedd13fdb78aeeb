//! Treebanks of bracketed parse trees
//!
//! Provides collection interfaces for:
//! - Iterating over tree strings from a string, file, or glob pattern
//! - Extracting word features sentence by sentence, sequentially or in parallel
//!
//! Sources hold one bracketed tree per line. Blank lines and lines starting
//! with `#` are ignored. Files ending in `.gz` are decompressed on the fly.

use flate2::read::MultiGzDecoder;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::features::{Extractor, SentenceFeatures};
use crate::parser::TreeError;

/// Error while reading a treebank or extracting one of its sentences
#[derive(Debug, Error)]
pub enum TreebankError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Sentence {sentence}: {source}")]
    Tree { sentence: usize, source: TreeError },

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Source of tree strings for a treebank
#[derive(Debug, Clone)]
enum TreeSource {
    /// In-memory text
    String(String),
    /// Single file path
    File(PathBuf),
    /// Multiple file paths (from glob or explicit paths)
    Files(Vec<PathBuf>),
}

type TreeStrings = Box<dyn Iterator<Item = Result<String, TreebankError>> + Send>;

/// Collection of bracketed trees from a string, file, or glob pattern
///
/// # Examples
///
/// ```no_run
/// use synfeats::{Extractor, Treebank};
///
/// let extractor = Extractor::default();
/// let treebank = Treebank::from_glob("parses/*.mrg.gz").unwrap();
/// for sentence in treebank.par_features(&extractor) {
///     match sentence {
///         Ok(features) => println!("{} records", features.records.len()),
///         Err(e) => eprintln!("{}", e),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Treebank {
    source: TreeSource,
}

impl Treebank {
    /// Create from in-memory text
    pub fn from_string(text: &str) -> Self {
        Self {
            source: TreeSource::String(text.to_string()),
        }
    }

    /// Create from a single file path
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            source: TreeSource::File(path.as_ref().to_path_buf()),
        }
    }

    /// Create from explicit file paths
    pub fn from_paths(file_paths: Vec<PathBuf>) -> Self {
        Self {
            source: TreeSource::Files(file_paths),
        }
    }

    /// Create from a glob pattern
    ///
    /// Files are processed in sorted order for deterministic results.
    pub fn from_glob(pattern: &str) -> Result<Self, TreebankError> {
        let mut file_paths: Vec<PathBuf> = glob::glob(pattern)?.filter_map(Result::ok).collect();
        file_paths.sort();
        debug!(pattern, files = file_paths.len(), "expanded glob");
        Ok(Self::from_paths(file_paths))
    }

    /// Iterate over the tree strings of every source, in order
    pub fn tree_strings(&self) -> TreeStrings {
        match &self.source {
            TreeSource::String(text) => {
                let lines: Vec<String> = text.lines().filter_map(tree_line).collect();
                Box::new(lines.into_iter().map(Ok))
            }
            TreeSource::File(path) => open_file_lines(path.clone()),
            TreeSource::Files(paths) => {
                Box::new(paths.clone().into_iter().flat_map(open_file_lines))
            }
        }
    }

    /// Extract features sentence by sentence
    ///
    /// Sentences are numbered from 0 in source order. A sentence that fails
    /// to parse yields an error item and does not stop the iteration.
    pub fn features<'a>(
        &self,
        extractor: &'a Extractor,
    ) -> impl Iterator<Item = Result<SentenceFeatures, TreebankError>> + 'a {
        numbered(self.tree_strings())
            .map(move |(sentence, line)| extract_line(extractor, sentence, line))
    }

    /// Extract features for all sentences in parallel
    ///
    /// Results come back in source order.
    pub fn par_features(
        &self,
        extractor: &Extractor,
    ) -> Vec<Result<SentenceFeatures, TreebankError>> {
        let lines: Vec<_> = numbered(self.tree_strings()).collect();
        lines
            .into_par_iter()
            .map(|(sentence, line)| extract_line(extractor, sentence, line))
            .collect()
    }
}

// Pair each item with its sentence number. Read errors are not sentences
// and leave the count unchanged.
fn numbered(lines: TreeStrings) -> impl Iterator<Item = (usize, Result<String, TreebankError>)> {
    lines.scan(0, |next, line| {
        let sentence = *next;
        if line.is_ok() {
            *next += 1;
        }
        Some((sentence, line))
    })
}

fn extract_line(
    extractor: &Extractor,
    sentence: usize,
    line: Result<String, TreebankError>,
) -> Result<SentenceFeatures, TreebankError> {
    let text = line?;
    extractor
        .extract(&text)
        .map_err(|source| TreebankError::Tree { sentence, source })
}

// Trimmed tree text, or None for blank and comment lines
fn tree_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        None
    } else {
        Some(line.to_string())
    }
}

/// Open a file (gzip aware) and return an iterator over its tree lines
///
/// A file that cannot be opened yields a single `FileOpen` error. A read
/// error (e.g. a truncated gzip stream) yields one `Io` error and ends the file.
fn open_file_lines(path: PathBuf) -> TreeStrings {
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(source) => {
            warn!("failed to open {}: {}", path.display(), source);
            return Box::new(std::iter::once(Err(TreebankError::FileOpen { path, source })));
        }
    };

    let reader: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let lines = BufReader::new(reader)
        .lines()
        .scan(false, move |failed, line| {
            if *failed {
                return None;
            }
            match line {
                Ok(line) => Some(tree_line(&line).map(Ok)),
                Err(e) => {
                    warn!("failed to read {}: {}", path.display(), e);
                    *failed = true;
                    Some(Some(Err(TreebankError::Io(e))))
                }
            }
        })
        .flatten();
    Box::new(lines)
}

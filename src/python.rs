//! Python bindings for synfeats
//!
//! This module provides PyO3-based Python bindings for the Rust core.

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use rayon::prelude::*;

use crate::features::{Extractor, FeatureRecord};
use crate::parser::TreeError;
use crate::treebank::{Treebank, TreebankError};

/// (position, word, hepw, hbcw, lca, lca_height, distance)
type RecordTuple = (usize, String, String, String, String, i32, i32);

/// Convert TreeError to Python exception
impl From<TreeError> for PyErr {
    fn from(err: TreeError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Convert TreebankError to Python exception
impl From<TreebankError> for PyErr {
    fn from(err: TreebankError) -> PyErr {
        match err {
            TreebankError::Io(e) => PyIOError::new_err(e.to_string()),
            TreebankError::FileOpen { path, source } => PyIOError::new_err(format!(
                "Failed to open file {}: {}",
                path.display(),
                source
            )),
            e @ (TreebankError::Tree { .. } | TreebankError::Glob(_)) => {
                PyValueError::new_err(e.to_string())
            }
        }
    }
}

fn to_tuple(record: FeatureRecord) -> RecordTuple {
    (
        record.position,
        record.word,
        record.hepw,
        record.hbcw,
        record.lca,
        record.lca_height,
        record.distance,
    )
}

/// Compute word features for one bracketed parse tree.
///
/// Args:
///     tree: Bracketed constituency tree, e.g. "(S (NP (DT The) (NN cat)) (VP (VBD sat)))"
///
/// Returns:
///     List of (position, word, hepw, hbcw, lca, lca_height, distance) tuples,
///     punctuation and clitics excluded
///
/// Raises:
///     ValueError: If the tree is malformed or has no words
#[pyfunction]
fn extract_features(tree: &str) -> PyResult<Vec<RecordTuple>> {
    let sentence = Extractor::default().extract(tree)?;
    Ok(sentence.records.into_iter().map(to_tuple).collect())
}

/// Compute word features for many trees in parallel.
///
/// Returns one list of tuples per tree, in input order. Malformed trees
/// raise ValueError naming the first failing sentence.
#[pyfunction]
fn extract_features_many(trees: Vec<String>) -> PyResult<Vec<Vec<RecordTuple>>> {
    let extractor = Extractor::default();
    trees
        .par_iter()
        .enumerate()
        .map(|(sentence, tree)| {
            extractor
                .extract(tree)
                .map(|s| s.records.into_iter().map(to_tuple).collect())
                .map_err(|source| TreebankError::Tree { sentence, source })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(PyErr::from)
}

/// Compute word features for every tree in a file (one tree per line, .gz allowed).
#[pyfunction]
fn extract_file(path: &str) -> PyResult<Vec<Vec<RecordTuple>>> {
    let extractor = Extractor::default();
    Treebank::from_file(path)
        .par_features(&extractor)
        .into_iter()
        .map(|result| {
            result
                .map(|s| s.records.into_iter().map(to_tuple).collect())
                .map_err(PyErr::from)
        })
        .collect()
}

#[pyfunction]
fn __version__() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn synfeats(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(extract_features, m)?)?;
    m.add_function(wrap_pyfunction!(extract_features_many, m)?)?;
    m.add_function(wrap_pyfunction!(extract_file, m)?)?;
    m.add_function(wrap_pyfunction!(__version__, m)?)?;

    Ok(())
}

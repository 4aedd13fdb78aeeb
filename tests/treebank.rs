use std::fs;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

use synfeats::{Extractor, FeatureConfig, TreeError, Treebank, TreebankError};

const CORPUS: &str = "\
# parsed with the default model
(S (NP (DT The) (NN cat)) (VP (VBD sat)))

(S (NP (PRP He)) (VP (VBD left) (NP (DT the) (NN room))) (. .))
(S (NP The cat)
(S (UH Hello))
";

#[test]
fn test_sequential_and_parallel_agree() {
    let extractor = Extractor::default();
    let treebank = Treebank::from_string(CORPUS);

    let sequential: Vec<_> = treebank.features(&extractor).collect();
    let parallel = treebank.par_features(&extractor);

    assert_eq!(sequential.len(), 4);
    assert_eq!(parallel.len(), 4);
    for (s, p) in sequential.iter().zip(&parallel) {
        match (s, p) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
            _ => panic!("sequential and parallel results differ"),
        }
    }
}

#[test]
fn test_malformed_sentence_does_not_stop_corpus() {
    let extractor = Extractor::default();
    let results = Treebank::from_string(CORPUS).par_features(&extractor);

    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(matches!(
        results[2],
        Err(TreebankError::Tree {
            sentence: 2,
            source: TreeError::Malformed { .. }
        })
    ));
    let last = results[3].as_ref().unwrap();
    assert_eq!(last.records.len(), 1);
    assert_eq!(last.records[0].word, "Hello");
}

#[test]
fn test_files_in_glob_order() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("b.mrg"),
        "(S (NP (PRP He)) (VP (VBD left)))\n",
    )
    .unwrap();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(b"(S (NP (DT The) (NN cat)) (VP (VBD sat)))\n")
        .unwrap();
    fs::write(dir.path().join("a.mrg.gz"), encoder.finish().unwrap()).unwrap();

    let pattern = format!("{}/*.mrg*", dir.path().display());
    let treebank = Treebank::from_glob(&pattern).unwrap();
    let first_words: Vec<String> = treebank
        .par_features(&Extractor::default())
        .into_iter()
        .map(|r| r.unwrap().records[0].word.clone())
        .collect();

    assert_eq!(first_words, vec!["The", "He"]);
}

#[test]
fn test_custom_config_through_treebank() {
    let extractor = Extractor::new(FeatureConfig::new().with_skip_tokens(Vec::<String>::new()));
    let results = Treebank::from_string("(S (NP (PRP He)) (VP (VBD left)) (. .))")
        .par_features(&extractor);

    let words: Vec<_> = results[0]
        .as_ref()
        .unwrap()
        .records
        .iter()
        .map(|r| r.word.clone())
        .collect();
    assert_eq!(words, vec!["He", "left", "."]);
}

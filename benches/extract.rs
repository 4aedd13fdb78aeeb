use divan::{Bencher, black_box};
use synfeats::constituents::ConstituentIndex;
use synfeats::{Extractor, Treebank, parse_tree};

const SENTENCE: &str = "(ROOT (S (NP (NP (DT The) (JJ quick) (JJ brown) (NN fox)) (PP (IN from) \
    (NP (DT the) (NN forest)))) (VP (VBD jumped) (PP (IN over) (NP (DT the) (JJ lazy) (NN dog))) \
    (PP (IN in) (NP (DT the) (NN morning)))) (. .)))";

fn main() {
    divan::main();
}

#[divan::bench]
fn parse(bencher: Bencher) {
    bencher.bench_local(|| parse_tree(black_box(SENTENCE)).unwrap());
}

#[divan::bench]
fn build_index(bencher: Bencher) {
    let tree = parse_tree(SENTENCE).unwrap();
    let height = tree.height() as i32 - 2;
    bencher.bench_local(|| ConstituentIndex::build(black_box(&tree), height));
}

#[divan::bench]
fn extract_sentence(bencher: Bencher) {
    let extractor = Extractor::default();
    bencher.bench_local(|| extractor.extract(black_box(SENTENCE)).unwrap());
}

#[divan::bench(sample_count = 10)]
fn extract_treebank_parallel(bencher: Bencher) {
    let text = format!("{}\n", SENTENCE).repeat(2_000);
    let treebank = Treebank::from_string(&text);
    let extractor = Extractor::default();
    bencher.bench_local(|| black_box(treebank.par_features(&extractor).len()));
}

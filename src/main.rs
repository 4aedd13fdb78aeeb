use std::io::{self, BufWriter, Read, Write};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use synfeats::config::{DEFAULT_MAX_DEPTH, DEFAULT_NONE_LABEL, DEFAULT_SENTENCE_LABEL};
use synfeats::{Extractor, FeatureConfig, Treebank, TreebankError};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const HEADER: &str = "sentence\tposition\tword\thepw\thbcw\tlca\tlca_height\tdistance";

#[derive(Parser)]
#[command(name = "synfeats")]
#[command(about = "Extract word-level syntactic features from bracketed parse trees")]
struct Cli {
    /// Tree files or glob patterns (one tree per line, .gz allowed); "-" reads stdin
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Worker threads (0 = all cores)
    #[arg(long, short = 'j', default_value_t = 0)]
    jobs: usize,

    #[arg(long, default_value = DEFAULT_SENTENCE_LABEL)]
    sentence_label: String,

    #[arg(long, default_value = DEFAULT_NONE_LABEL)]
    none_label: String,

    /// Emit records for punctuation and clitics too
    #[arg(long, default_value_t = false)]
    keep_punct: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.jobs)
        .build_global()
        .context("failed to start worker pool")?;

    let mut config = FeatureConfig::new()
        .with_sentence_label(&cli.sentence_label)
        .with_none_label(&cli.none_label)
        .with_max_depth(cli.max_depth);
    if cli.keep_punct {
        config = config.with_skip_tokens(Vec::<String>::new());
    }
    let extractor = Extractor::new(config);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "{}", HEADER)?;

    let start = Instant::now();
    let mut sentence = 0;
    let mut read_failures = 0;
    let mut malformed = 0;

    for input in &cli.inputs {
        let treebank = open_input(input)?;
        for result in treebank.par_features(&extractor) {
            match result {
                Ok(features) => {
                    for r in &features.records {
                        writeln!(
                            out,
                            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                            sentence,
                            r.position,
                            r.word,
                            r.hepw,
                            r.hbcw,
                            r.lca,
                            r.lca_height,
                            r.distance
                        )?;
                    }
                }
                Err(TreebankError::Tree { source, .. }) => {
                    warn!("{}: skipping sentence {}: {}", input, sentence, source);
                    malformed += 1;
                }
                Err(e) => {
                    warn!("{}: {}", input, e);
                    read_failures += 1;
                    continue;
                }
            }
            sentence += 1;
        }
    }
    out.flush()?;

    info!(
        "processed {} sentences ({} skipped) in {} ms",
        sentence,
        malformed,
        start.elapsed().as_millis()
    );

    if read_failures > 0 {
        bail!("{} input(s) could not be read", read_failures);
    }
    Ok(())
}

fn open_input(input: &str) -> Result<Treebank> {
    if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(Treebank::from_string(&text));
    }
    if input.contains(['*', '?', '[']) {
        return Treebank::from_glob(input).with_context(|| format!("bad glob pattern {}", input));
    }
    Ok(Treebank::from_file(input))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}

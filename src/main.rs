use anyhow::{bail, Context, Result};
use clap::Parser;
use coded_merkle_tree::{CmtParams, CodedMerkleTree, HashKind, HidePattern};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cmt-sim")]
#[command(about = "Builds a coded Merkle tree, withholds symbols and runs light-client sampling against it")]
struct Cli {
    /// File to commit to; random bytes are used when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Size of the random block in bytes
    #[arg(long, default_value = "65536")]
    size: usize,
    /// Level 0 symbol size in bytes
    #[arg(long, default_value = "256")]
    symbol_size: usize,
    /// Digests aggregated per symbol (C)
    #[arg(long, default_value = "8")]
    hash_count: usize,
    /// Coding rate K / N
    #[arg(long, default_value = "0.25")]
    rate: f64,
    /// Target number of roots
    #[arg(long, default_value = "4")]
    header_size: usize,
    /// Hash function: sha3 or sha256
    #[arg(long, default_value = "sha3")]
    hash: HashKind,
    /// Fraction of symbols the block producer withholds
    #[arg(long, default_value = "0.0")]
    hide_fraction: f64,
    /// Samples drawn by the light client per level
    #[arg(short, long, default_value = "16")]
    samples: usize,
    /// Seed for data, hide pattern and sample selection
    #[arg(long, default_value = "7")]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut rng = StdRng::seed_from_u64(cli.seed);

    let data = match &cli.input {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut data = vec![0u8; cli.size];
            rng.fill_bytes(&mut data);
            data
        }
    };

    let params = CmtParams::new(cli.header_size, cli.rate, cli.hash_count)
        .with_symbol_size(cli.symbol_size)
        .with_hash(cli.hash);
    println!("{params}");

    let mut tree = CodedMerkleTree::new(&data, &params)?;
    let lens: Vec<usize> = tree.levels().iter().map(Vec::len).collect();
    info!(levels = ?lens, roots = tree.roots().len(), "tree constructed");

    tree.set_hide_pattern(HidePattern::random(&lens, cli.hide_fraction, &mut rng));
    let withheld = tree.hide_pattern().withheld_count();
    info!(withheld, total = lens.iter().sum::<usize>(), "hide pattern applied");
    for (level, row) in tree.hide_pattern().as_table().iter().enumerate() {
        let hidden = row.iter().filter(|&&hidden| hidden).count();
        debug!(level, withheld = hidden, symbols = row.len(), "withheld per level");
    }

    let commitment = tree.commitment();
    info!(bytes = commitment.to_bytes()?.len(), "light client commitment");

    let mut missing = 0usize;
    for (level, &len) in lens.iter().enumerate() {
        let requested: Vec<usize> = (0..cli.samples).map(|_| rng.gen_range(0..len)).collect();
        let samples = tree.sample(level, &requested)?;
        for sample in &samples {
            if let Err(mismatch) = commitment.check(sample) {
                bail!("sample failed verification: {mismatch}");
            }
        }
        missing += requested.len() - samples.len();
        println!(
            "level {level}: requested {}, received {}, all received samples verified",
            requested.len(),
            samples.len()
        );
    }

    if missing > 0 {
        warn!(missing, "block judged unavailable: withheld symbols were requested");
    } else {
        info!("every requested symbol was released");
    }
    Ok(())
}

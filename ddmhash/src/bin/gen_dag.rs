//! Build (or memo-load) the DAG for a block number and print a sample hash.

use anyhow::{bail, Context, Result};
use ddmhash::{epoch, seedhash, Full, Light, H256};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let block_number: u64 = match args.next() {
        Some(arg) => arg
            .parse()
            .context("block number must be an unsigned integer")?,
        None => 0,
    };
    if args.next().is_some() {
        bail!("usage: gen_dag [block-number]");
    }

    println!(
        "block {} -> epoch {} (seed {})",
        block_number,
        epoch(block_number),
        seedhash(block_number)
    );

    let light = Light::new(block_number)?;

    let mut last_percent = u32::MAX;
    let mut progress = |percent: u32| {
        if percent != last_percent {
            println!("generating DAG: {percent}%");
            last_percent = percent;
        }
        true
    };
    let full = Full::new(&light, Some(&mut progress))?;
    println!("DAG ready: {} bytes", full.size());

    let sample = full.compute(&H256::default(), 0)?;
    println!(
        "sample hash: result={} mix={}",
        sample.result, sample.mix_hash
    );
    Ok(())
}

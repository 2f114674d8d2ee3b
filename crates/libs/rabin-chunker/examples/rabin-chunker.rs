use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use clap::Parser;
use sha2::{Digest, Sha256};
use tracing::info;

use rabin_chunker::table::DEFAULT_WINDOW_SIZE;
use rabin_chunker::{Polynomial, RabinChunker, RabinChunkerOptions, RabinTable, POLY64};

/// Command line arguments.
#[derive(Debug, Parser)]
pub struct Args {
    /// Average chunk size (rounded down to a power of two).
    #[clap(long, default_value_t = 8 * 1024)]
    avg: usize,
    /// Minimal chunk size (defaults to a quarter of the average).
    #[clap(long)]
    min: Option<usize>,
    /// Maximal chunk size (defaults to four times the average).
    #[clap(long)]
    max: Option<usize>,
    /// Window size of the rolling hash.
    #[clap(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window: usize,
    /// Generator polynomial.
    #[clap(long, value_parser = parse_polynomial, default_value = "0xbfe6b8a5bf378d83")]
    polynomial: u64,
    /// File to chunk.
    file: PathBuf,
}

fn parse_polynomial(value: &str) -> Result<u64, std::num::ParseIntError> {
    u64::from_str_radix(value.trim_start_matches("0x"), 16)
}

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::format()
        .without_time()
        .with_target(false)
        .compact();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .event_format(format)
        .init();

    let args = Args::parse();
    let mut options = RabinChunkerOptions::avg(args.avg);
    if let Some(min) = args.min {
        options = options.with_min(min);
    }
    if let Some(max) = args.max {
        options = options.with_max(max);
    }
    let polynomial = Polynomial::new(args.polynomial);
    if polynomial != POLY64 {
        info!("using custom polynomial {polynomial}");
    }
    let table = RabinTable::new(polynomial, args.window)?;
    let reader = BufReader::new(std::fs::File::open(&args.file)?);
    let mut stream = RabinChunker::from_reader(&table, reader, options)?;

    // The stream only reports lengths, chunk contents are hashed from a second handle.
    let mut contents = BufReader::new(std::fs::File::open(&args.file)?);
    let mut chunk_offset = 0;
    let mut chunk_count = 0;
    while let Some(chunk_size) = stream.next_chunk()? {
        let mut hasher = Sha256::new();
        io::copy(&mut (&mut contents).take(chunk_size as u64), &mut hasher)?;
        println!(
            "Offset: {chunk_offset}, Size: {chunk_size}, Hash: sha256:{}",
            hex::encode(hasher.finalize())
        );
        chunk_offset += chunk_size;
        chunk_count += 1;
    }
    info!("{chunk_count} chunks, {chunk_offset} bytes");
    Ok(())
}

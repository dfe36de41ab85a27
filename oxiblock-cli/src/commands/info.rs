//! Info command implementation.

use crate::utils::format_size;
use oxiblock_codec::BlockDecompressor;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Block counts by kind.
#[derive(Debug, Default)]
struct BlockStats {
    stored: u64,
    transformed: u64,
    zlt_skipped: u64,
    run_length: u64,
    decoded_bytes: u64,
}

pub fn cmd_info(input: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(input)?);
    let mut decompressor = BlockDecompressor::new(reader)?;

    println!("File:        {}", input.display());
    println!("Entropy:     {}", decompressor.entropy());
    println!("Block size:  {}", format_size(decompressor.block_size() as u64));

    if verbose {
        println!();
        println!("{:>6} {:>6} {:>10} {:>10}", "Block", "Mode", "Payload", "Decoded");
        println!("{}", "-".repeat(36));
    }

    let mut stats = BlockStats::default();
    let mut index = 0u64;

    while let Some(block) = decompressor.read_block()? {
        let decoded = block.len();
        let Some(header) = decompressor.last_header().copied() else {
            break;
        };

        if header.is_stored() {
            stats.stored += 1;
        } else {
            stats.transformed += 1;
            if header.zlt_skipped() {
                stats.zlt_skipped += 1;
            }
            if !header.run_length_skipped() {
                stats.run_length += 1;
            }
        }
        stats.decoded_bytes += decoded as u64;

        if verbose {
            println!(
                "{:>6} {:>#6x} {:>10} {:>10}",
                index,
                header.mode(),
                header.payload_len(),
                decoded
            );
        }
        index += 1;
    }

    if verbose {
        println!();
    }

    println!("Blocks:      {}", stats.stored + stats.transformed);
    println!("  Stored:      {}", stats.stored);
    println!("  Transformed: {}", stats.transformed);
    println!("  No ZLT:      {}", stats.zlt_skipped);
    println!("  With RLT:    {}", stats.run_length);
    println!("Decoded:     {}", format_size(stats.decoded_bytes));

    Ok(())
}

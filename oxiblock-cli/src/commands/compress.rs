//! Compress command implementation.

use crate::utils::{compressed_path, create_progress_bar, format_size, ratio};
use log::info;
use oxiblock_codec::{BlockCompressor, CodecConfig};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn cmd_compress(
    input: &Path,
    output: Option<&Path>,
    config: CodecConfig,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let data = fs::read(input)?;
    let output = output.map_or_else(|| compressed_path(input), Path::to_path_buf);

    info!(
        "Compressing {} with {} byte blocks, {} coder, run length {}",
        input.display(),
        config.block_size,
        config.entropy,
        if config.run_length { "on" } else { "off" }
    );

    let writer = BufWriter::new(File::create(&output)?);
    let mut compressor = BlockCompressor::new(writer, config)?;
    let pb = create_progress_bar(data.len() as u64, progress);

    for block in data.chunks(config.block_size) {
        compressor.write_block(block)?;
        pb.inc(block.len() as u64);
    }

    let blocks = compressor.blocks();
    let mut writer = compressor.finish()?;
    writer.flush()?;
    pb.finish_and_clear();

    let compressed = fs::metadata(&output)?.len();
    println!(
        "{} -> {}: {} -> {} ({:.1}%, {} blocks)",
        input.display(),
        output.display(),
        format_size(data.len() as u64),
        format_size(compressed),
        ratio(data.len() as u64, compressed),
        blocks
    );

    Ok(())
}

//! Decompress command implementation.

use crate::utils::{create_progress_bar, decompressed_path, format_size};
use oxiblock_codec::BlockDecompressor;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub fn cmd_decompress(
    input: &Path,
    output: Option<&Path>,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let input_len = fs::metadata(input)?.len();
    let output = output.map_or_else(|| decompressed_path(input), Path::to_path_buf);

    let reader = BufReader::new(File::open(input)?);
    let mut decompressor = BlockDecompressor::new(reader)?;
    let mut writer = BufWriter::new(File::create(&output)?);
    let pb = create_progress_bar(input_len, progress);
    let mut total = 0u64;

    while let Some(block) = decompressor.read_block()? {
        writer.write_all(block)?;
        total += block.len() as u64;
        pb.set_position((decompressor.bits_read() / 8).min(input_len));
    }

    writer.flush()?;
    pb.finish_and_clear();

    println!(
        "{} -> {}: {} -> {}",
        input.display(),
        output.display(),
        format_size(input_len),
        format_size(total)
    );

    Ok(())
}

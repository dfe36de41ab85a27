//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Extension of compressed files.
pub const EXTENSION: &str = "obk";

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");

    let pb = ProgressBar::new(len);
    pb.set_style(style);
    pb
}

/// `input` with `.obk` appended.
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".");
    name.push(EXTENSION);
    PathBuf::from(name)
}

/// `input` with `.obk` removed, or `.out` appended when it has no `.obk`.
pub fn decompressed_path(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|ext| ext == EXTENSION) {
        input.with_extension("")
    } else {
        let mut name = input.as_os_str().to_os_string();
        name.push(".out");
        PathBuf::from(name)
    }
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Compressed size as a percentage of the original.
pub fn ratio(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        0.0
    } else {
        compressed as f64 * 100.0 / original as f64
    }
}

//! OxiBlock CLI - block-sorting compression from the command line.
//!
//! Compresses files with the OxiBlock block codec (BWT + MTFT + zero length
//! coding) and restores them.

mod commands;
mod utils;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use commands::{cmd_compress, cmd_decompress, cmd_info, cmd_test};
use log::LevelFilter;
use oxiblock_codec::{CodecConfig, DEFAULT_BLOCK_SIZE, EntropyKind, MAX_BLOCK_SIZE};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxiblock")]
#[command(author, version, about = "Pure Rust block-sorting compressor")]
#[command(long_about = "
OxiBlock compresses files block by block: each block goes through a
Burrows-Wheeler transform, a move-to-front transform and a zero length
transform before entropy coding.

Examples:
  oxiblock compress notes.txt
  oxiblock compress -b 1000000 -e exp-golomb --rlt image.raw -o image.obk
  oxiblock decompress notes.txt.obk
  oxiblock test notes.txt
  oxiblock info -v notes.txt.obk
")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (default: input with .obk appended)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        codec: CodecArgs,

        /// Hide the progress bar
        #[arg(short = 'q', long)]
        quiet: bool,
    },

    /// Decompress a file
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output file (default: input without .obk)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(short = 'q', long)]
        quiet: bool,
    },

    /// Compress and decompress a file in memory and compare
    #[command(alias = "t")]
    Test {
        /// File to test
        input: PathBuf,

        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Show information about a compressed file
    #[command(alias = "i")]
    Info {
        /// Compressed file
        input: PathBuf,
    },
}

#[derive(Args)]
struct CodecArgs {
    /// Block size in bytes
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE, value_parser = parse_block_size)]
    block_size: usize,

    /// Entropy coder for block payloads
    #[arg(short, long, value_enum, default_value = "null")]
    entropy: EntropyArg,

    /// Apply the run length transform before the BWT
    #[arg(long)]
    rlt: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum EntropyArg {
    /// Raw payload bytes
    Null,
    /// Exp-Golomb codes
    ExpGolomb,
}

impl From<EntropyArg> for EntropyKind {
    fn from(arg: EntropyArg) -> Self {
        match arg {
            EntropyArg::Null => EntropyKind::Null,
            EntropyArg::ExpGolomb => EntropyKind::ExpGolomb,
        }
    }
}

fn parse_block_size(s: &str) -> Result<usize, String> {
    let size: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a block size", s))?;

    if size == 0 || size > MAX_BLOCK_SIZE {
        return Err(format!("block size must be 1..={}", MAX_BLOCK_SIZE));
    }
    Ok(size)
}

impl CodecArgs {
    fn config(&self) -> CodecConfig {
        CodecConfig::new()
            .with_block_size(self.block_size)
            .with_entropy(self.entropy.into())
            .with_run_length(self.rlt)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let verbose = cli.verbose > 0;
    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            codec,
            quiet,
        } => cmd_compress(&input, output.as_deref(), codec.config(), !quiet),
        Commands::Decompress {
            input,
            output,
            quiet,
        } => cmd_decompress(&input, output.as_deref(), !quiet),
        Commands::Test { input, codec } => cmd_test(&input, codec.config(), verbose),
        Commands::Info { input } => cmd_info(&input, verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

//! Command-line interface for parscan-pl0.
//!
//! `pl0 tokens --input FILE` prints one token per line;
//! `pl0 parse --input FILE` prints the syntax tree. Set `RUST_LOG=trace` to
//! watch the tokenizer, scanner and expression parser at work.

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use parscan::Scanner;
use parscan_pl0::{parse, tokenize};
use std::path::PathBuf;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prints the token stream
    Tokens {
        /// PL/0 source file
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Parses a program and prints its syntax tree
    Parse {
        /// PL/0 source file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn read(path: &PathBuf) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("can't read {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Tokens { input } => {
            let src = read(&input)?;
            let mut scanner = Scanner::new(tokenize(&src));
            loop {
                let token = scanner
                    .current()
                    .with_context(|| format!("in {}", input.display()))?
                    .clone();
                println!("{}\t{:?}\t{:?}", token.position, token.kind, token.text);
                if token.is_eof() {
                    break;
                }
                scanner.consume()?;
            }
            log::info!("{:?}", scanner.stats());
        }
        Commands::Parse { input } => {
            let src = read(&input)?;
            let program = parse(&src).with_context(|| format!("in {}", input.display()))?;
            println!("{program:#?}");
        }
    }
    Ok(())
}

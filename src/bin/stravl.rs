//! Builds an AVL tree from the words of a file and answers lookups.
//!
//! # Usage
//!
//! ```bash
//! # Load words, then type keys to look up (end with Ctrl-D)
//! stravl words.txt
//!
//! # Show the tree after every insertion
//! stravl --show-steps words.txt
//!
//! # Batch lookups without prompts
//! stravl -q words.txt < queries.txt
//! ```
//!
//! Exit status is 200 when the input file cannot be read and 100 when memory
//! for a key runs out. Running without a file is a usage error: clap prints
//! the usage and exits with status 2.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stravl::driver;
use stravl::{AvlTree, InsertObserver, LoadError};

/// AVL tree word lookup
#[derive(Parser, Debug)]
#[command(
    name = "stravl",
    version,
    about = "Loads words from a file into an AVL tree and answers lookups from stdin"
)]
struct Args {
    /// File with whitespace-separated keys to insert
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print the tree after every insertion and both traversals after loading
    #[arg(long, env = "STRAVL_SHOW_STEPS")]
    show_steps: bool,

    /// Do not print query prompts (for scripting)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut tree = AvlTree::new();

    let mut show_step = |tree: &AvlTree, key: &str| {
        println!("Insert {key}>");
        println!("Tree representation:");
        print!("{}", tree.sideways());
    };
    let observer: Option<&mut dyn InsertObserver> = if args.show_steps {
        Some(&mut show_step)
    } else {
        None
    };
    driver::load_file(&mut tree, &args.file, observer)
        .with_context(|| format!("cannot load keys from {}", args.file.display()))?;

    let mut out = io::stdout().lock();
    if args.show_steps {
        writeln!(out)?;
        writeln!(out, "Inorder traversal: {}", tree.inorder_display())?;
        writeln!(out, "Tree representation:")?;
        write!(out, "{}", tree.sideways())?;
    }
    driver::write_summary(&tree, &mut out)?;

    let answered = driver::answer_queries(&tree, io::stdin().lock(), &mut out, !args.quiet)?;
    debug!(answered, "query input exhausted");
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("stravl=debug")
        } else {
            EnvFilter::new("stravl=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn exit_code(error: &anyhow::Error) -> u8 {
    error.downcast_ref::<LoadError>().map_or(1, driver::exit_code)
}

//! Loading keys from text and answering lookups against a tree.
//!
//! Input is split on ASCII whitespace; every token is one key.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::LoadError;
use crate::{AvlTree, InsertObserver};

/// Exit status when memory for a key runs out.
pub const EXIT_ALLOCATION: u8 = 100;

/// Exit status when the input cannot be opened or read.
pub const EXIT_INPUT: u8 = 200;

/// Inserts every whitespace-separated token read from `reader`.
///
/// The observer, if any, is called after each insertion.
/// Returns the number of keys inserted. On error, keys read before the
/// failing one stay in the tree.
pub fn load<R: BufRead>(
    tree: &mut AvlTree,
    reader: R,
    mut observer: Option<&mut dyn InsertObserver>,
) -> Result<usize, LoadError> {
    let mut inserted = 0;
    for line in reader.lines() {
        let line = line?;
        for key in line.split_ascii_whitespace() {
            match observer.as_deref_mut() {
                Some(observer) => tree.insert_observed(key, observer)?,
                None => tree.insert(key)?,
            }
            inserted += 1;
        }
    }
    debug!(inserted, height = tree.height(), "loaded keys");
    Ok(inserted)
}

/// Opens the file at `path` and [`load`]s its tokens.
pub fn load_file<P: AsRef<Path>>(
    tree: &mut AvlTree,
    path: P,
    observer: Option<&mut dyn InsertObserver>,
) -> Result<usize, LoadError> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading keys");
    let file = File::open(path)?;
    load(tree, BufReader::new(file), observer)
}

/// Maps a load failure to the process exit status.
pub fn exit_code(error: &LoadError) -> u8 {
    match error {
        LoadError::Io(_) => EXIT_INPUT,
        LoadError::Allocation(_) => EXIT_ALLOCATION,
    }
}

/// Writes the height and the number of nodes of the tree.
pub fn write_summary<W: Write>(tree: &AvlTree, mut out: W) -> io::Result<()> {
    writeln!(out, "Height of tree: {}", tree.height())?;
    writeln!(out, "# of nodes: {}", tree.len())
}

/// Looks up every whitespace-separated token read from `input` and reports
/// `<key> found!` or `<key> NOT found!` on `output`, one line per key.
///
/// With `prompt` set, `Query: ` is written before reading and after every answer.
/// Returns the number of keys looked up.
pub fn answer_queries<R: BufRead, W: Write>(
    tree: &AvlTree,
    input: R,
    mut output: W,
    prompt: bool,
) -> io::Result<usize> {
    let mut answered = 0;
    if prompt {
        write_prompt(&mut output)?;
    }
    for line in input.lines() {
        let line = line?;
        for key in line.split_ascii_whitespace() {
            match tree.retrieve(key) {
                Some(found) => writeln!(output, "{found} found!")?,
                None => writeln!(output, "{key} NOT found!")?,
            }
            answered += 1;
            if prompt {
                write_prompt(&mut output)?;
            }
        }
    }
    output.flush()?;
    Ok(answered)
}

fn write_prompt<W: Write>(output: &mut W) -> io::Result<()> {
    write!(output, "Query: ")?;
    output.flush()
}

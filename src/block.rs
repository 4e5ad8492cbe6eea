//! Infernal alignment block parser.
//!
//! This module reads the six-line block written by Infernal's `cmalign` in
//! aligned FASTA form and splits it into the target and template views.
//!
//! ## Block Format
//!
//! ```text
//! >target_name
//! GAA-uAC
//! >SS_cons_full
//! (<.>..)
//! >SS_cons
//! (<....)
//! ```
//!
//! Upper case letters are aligned residues, lower case letters are residues
//! inserted in the target and `-` marks a template residue deleted in the
//! target. The first structure line keeps the template pairing at deleted
//! columns, the second one shows the collapsed target annotation.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::model::{is_deleted_column, is_inserted_column, SequenceStructureMapping};

/// Number of lines of one alignment block.
pub const BLOCK_LINES: usize = 6;

/// Errors that can occur while reading an alignment block.
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Failed to read alignment: {0}")]
    Io(#[from] std::io::Error),

    #[error("Truncated alignment block: expected 6 lines, found {lines}")]
    TruncatedBlock { lines: usize },

    #[error(
        "Malformed alignment block: sequence has {sequence} columns, \
         full structure {full}, collapsed structure {collapsed}"
    )]
    MalformedBlock {
        sequence: usize,
        full: usize,
        collapsed: usize,
    },
}

/// Result type for block parsing.
pub type BlockResult<T> = Result<T, BlockError>;

/// One co-aligned sequence with its two structure annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentBlock {
    /// Label of the sequence line (without '>')
    pub name: String,
    /// Aligned sequence: upper case, lower case insertions and '-' deletions
    pub sequence: String,
    /// Structure keeping the template pairs at deleted columns
    pub full_structure: String,
    /// Structure with half pairs where a partner was deleted
    pub structure: String,
}

impl AlignmentBlock {
    /// Creates a block, checking that all data lines have the same width.
    pub fn new(
        name: impl Into<String>,
        sequence: impl Into<String>,
        full_structure: impl Into<String>,
        structure: impl Into<String>,
    ) -> BlockResult<Self> {
        let block = Self {
            name: name.into(),
            sequence: sequence.into(),
            full_structure: full_structure.into(),
            structure: structure.into(),
        };

        let width = block.sequence.len();
        if block.full_structure.len() != width || block.structure.len() != width {
            return Err(BlockError::MalformedBlock {
                sequence: width,
                full: block.full_structure.len(),
                collapsed: block.structure.len(),
            });
        }

        Ok(block)
    }

    /// Returns the alignment width.
    pub fn width(&self) -> usize {
        self.sequence.len()
    }

    /// Number of columns deleted in the target.
    pub fn deleted_columns(&self) -> usize {
        self.sequence.bytes().filter(|&c| is_deleted_column(c)).count()
    }

    /// Number of columns inserted relative to the template.
    pub fn inserted_columns(&self) -> usize {
        self.sequence.bytes().filter(|&c| is_inserted_column(c)).count()
    }

    /// Target view: every column not deleted in the target, annotated with the
    /// collapsed structure.
    pub fn target(&self) -> SequenceStructureMapping {
        self.collect_columns(&self.structure, |c| !is_deleted_column(c))
    }

    /// Template view: every column not inserted in the target, annotated with
    /// the collapsed structure. Deleted residues stay as '-'.
    pub fn template(&self) -> SequenceStructureMapping {
        self.collect_columns(&self.structure, |c| !is_inserted_column(c))
    }

    /// Template view annotated with the full structure, so pairs whose partner
    /// was deleted are still visible.
    pub fn template_full(&self) -> SequenceStructureMapping {
        self.collect_columns(&self.full_structure, |c| !is_inserted_column(c))
    }

    fn collect_columns<F>(&self, structure: &str, keep: F) -> SequenceStructureMapping
    where
        F: Fn(u8) -> bool,
    {
        let mut mapping = SequenceStructureMapping::with_capacity(self.width());
        for (column, (seq_char, str_char)) in self
            .sequence
            .bytes()
            .zip(structure.bytes())
            .enumerate()
        {
            if keep(seq_char) {
                mapping.push(seq_char, str_char, column);
            }
        }
        mapping
    }
}

/// Parses one alignment block from a reader.
///
/// Exactly six lines are consumed; anything after them is left unread.
pub fn parse_block<R: BufRead>(reader: R) -> BlockResult<AlignmentBlock> {
    let mut lines = Vec::with_capacity(BLOCK_LINES);
    for line_result in reader.lines().take(BLOCK_LINES) {
        let line = line_result?;
        // Drop '\r' of CRLF files and stray trailing blanks
        lines.push(line.trim_end().to_string());
    }

    if lines.len() < BLOCK_LINES {
        return Err(BlockError::TruncatedBlock { lines: lines.len() });
    }

    let name = lines[0].strip_prefix('>').unwrap_or(&lines[0]).trim().to_string();
    let block = AlignmentBlock::new(
        name,
        std::mem::take(&mut lines[1]),
        std::mem::take(&mut lines[3]),
        std::mem::take(&mut lines[5]),
    )?;

    debug!(
        "Read alignment block '{}' of width {} ({} deleted, {} inserted columns)",
        block.name,
        block.width(),
        block.deleted_columns(),
        block.inserted_columns()
    );

    Ok(block)
}

/// Parses an alignment block from a string.
///
/// Useful for testing or processing in-memory data.
pub fn parse_block_str(content: &str) -> BlockResult<AlignmentBlock> {
    parse_block(content.as_bytes())
}

/// Parses the alignment block at the start of a file.
pub fn parse_block_file<P: AsRef<Path>>(path: P) -> BlockResult<AlignmentBlock> {
    let file = File::open(path)?;
    parse_block(BufReader::new(file))
}

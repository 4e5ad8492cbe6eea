//! # cmmap - Structural alignment to tree mapping
//!
//! Converts an Infernal sequence-structure alignment of a target molecule
//! against a template into the node-to-node correspondence between the
//! template's and the target's secondary structure trees, as consumed by
//! Traveler.
//!
//! ## Architecture
//!
//! The conversion is a single pass over one alignment block:
//! - `block`: reading the alignment and deriving target and template views
//! - `structure`: dot-bracket indexing and broken pair detection
//! - `matcher`: node matching in alignment coordinates
//! - `output`: the text form of the mapping
//! - `model`: data structures shared by all stages
//!
//! ## Example
//!
//! ```
//! use cmmap::{block::parse_block_str, map_block};
//!
//! let block = parse_block_str(">t\nAAGGcc\n>f\n(())..\n>s\n(())..\n").unwrap();
//! let mapping = map_block(&block).unwrap();
//! assert_eq!(mapping.distance(), 2);
//! assert_eq!(mapping.to_string(), "DISTANCE: 2\n1 1\n2 2\n0 3\n0 4\n");
//! ```

pub mod block;
pub mod matcher;
pub mod model;
pub mod output;
pub mod structure;

use std::collections::BTreeSet;
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::block::{parse_block_file, AlignmentBlock, BlockError};
use crate::matcher::{match_nodes, to_alignment_coordinates, MatchError};
use crate::model::TreeMapping;
use crate::structure::{broken_pair_positions, index_structure, StructureError};

/// Errors that can occur while computing a mapping.
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("{0}")]
    Block(#[from] BlockError),

    #[error("{0}")]
    Structure(#[from] StructureError),

    #[error("Internal error: {0}")]
    Match(#[from] MatchError),
}

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Computes the template to target tree mapping of one alignment block.
pub fn map_block(block: &AlignmentBlock) -> MappingResult<TreeMapping> {
    let target = block.target();
    let template_full = block.template_full();

    let template_nodes = index_structure(&template_full, &BTreeSet::new())?;
    let affected = broken_pair_positions(&block.sequence, &template_full, &template_nodes);
    let target_nodes = index_structure(&target, &affected)?;
    info!(
        "Template tree has {} nodes, target tree has {} nodes",
        template_nodes.len(),
        target_nodes.len()
    );

    // The template view shares the positions of the full template view
    let template_aligned = to_alignment_coordinates(&template_nodes, &template_full);
    let target_aligned = to_alignment_coordinates(&target_nodes, &target);

    let mapping = match_nodes(&template_aligned, &target_aligned)?;
    info!("Tree mapping distance: {}", mapping.distance());
    Ok(mapping)
}

/// Reads the alignment block at the start of a file and maps it.
pub fn map_file<P: AsRef<Path>>(path: P) -> MappingResult<TreeMapping> {
    let path = path.as_ref();
    info!("Loading alignment {:?}", path);
    let block = parse_block_file(path)?;
    map_block(&block)
}

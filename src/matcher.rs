//! Template to target node matching.
//!
//! Both node lists are first translated into alignment coordinates. A column
//! of the alignment denotes the same residue in the template and in the
//! target, so two nodes correspond exactly when their aligned positions are
//! equal.

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::model::{
    AlignedNode, NodeCorrespondence, SequenceStructureMapping, StructureNode, TreeMapping,
};

/// Errors that can occur while matching nodes.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatchError {
    #[error(
        "Template node {template} ({template_arity} positions) matched target node \
         {target} ({target_arity} positions)"
    )]
    MatchCardinality {
        template: usize,
        target: usize,
        template_arity: usize,
        target_arity: usize,
    },
}

/// Result type for node matching.
pub type MatchResult<T> = Result<T, MatchError>;

/// Translates structural nodes into alignment coordinates.
pub fn to_alignment_coordinates(
    nodes: &[StructureNode],
    mapping: &SequenceStructureMapping,
) -> Vec<AlignedNode> {
    nodes.iter().map(|node| node.to_aligned(mapping)).collect()
}

/// Matches template nodes to target nodes.
///
/// The result lists one entry per template node, in template order, followed
/// by one insertion per unmatched target node, in target order.
pub fn match_nodes(
    template_nodes: &[AlignedNode],
    target_nodes: &[AlignedNode],
) -> MatchResult<TreeMapping> {
    let target_index: HashMap<AlignedNode, usize> = target_nodes
        .iter()
        .enumerate()
        .map(|(index, &node)| (node, index))
        .collect();

    let mut matched = vec![false; target_nodes.len()];
    let mut entries = Vec::with_capacity(template_nodes.len() + target_nodes.len());

    for (template, node) in template_nodes.iter().enumerate() {
        match target_index.get(node) {
            Some(&target) => {
                let target_node = &target_nodes[target];
                if target_node.arity() != node.arity() {
                    return Err(MatchError::MatchCardinality {
                        template: template + 1,
                        target: target + 1,
                        template_arity: node.arity(),
                        target_arity: target_node.arity(),
                    });
                }
                matched[target] = true;
                entries.push(NodeCorrespondence::Matched { template, target });
            }
            None => entries.push(NodeCorrespondence::Deleted { template }),
        }
    }

    entries.extend(
        (0..target_nodes.len())
            .filter(|&target| !matched[target])
            .map(|target| NodeCorrespondence::Inserted { target }),
    );

    let mapping = TreeMapping::new(entries);
    debug!(
        "Matched {} template nodes against {} target nodes, distance {}",
        template_nodes.len(),
        target_nodes.len(),
        mapping.distance()
    );

    Ok(mapping)
}

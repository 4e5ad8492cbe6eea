//! Data model for structure tree mapping.
//!
//! This module contains the data structures shared by every stage:
//! - Per-molecule sequence/structure strings with their alignment positions
//! - Structural nodes (unpaired residues and base pairs)
//! - The node correspondence produced by matching two node lists
//!
//! Two coordinate spaces are involved. A *structural* coordinate indexes one
//! molecule's own sequence and structure strings, an *alignment* coordinate
//! indexes a column of the co-aligned input. A [`SequenceStructureMapping`]
//! translates the former into the latter.

use std::fmt;

/// Sequence character marking a column deleted in the target.
pub const GAP: u8 = b'-';

/// Returns true if the alignment column is deleted in the target.
pub fn is_deleted_column(sequence_char: u8) -> bool {
    sequence_char == GAP
}

/// Returns true if the alignment column is inserted relative to the template.
pub fn is_inserted_column(sequence_char: u8) -> bool {
    sequence_char.is_ascii_lowercase()
}

/// Sequence and structure of one molecule together with the alignment column
/// of each of its positions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceStructureMapping {
    /// The sequence characters kept for this molecule
    pub sequence: String,
    /// The dot-bracket structure characters kept for this molecule
    pub structure: String,
    /// Alignment column of every structural position, strictly increasing
    pub positions: Vec<usize>,
}

impl SequenceStructureMapping {
    /// Creates an empty mapping with room for `capacity` positions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sequence: String::with_capacity(capacity),
            structure: String::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
        }
    }

    /// Appends the characters of alignment column `column`.
    pub fn push(&mut self, sequence_char: u8, structure_char: u8, column: usize) {
        debug_assert!(self.positions.last().map_or(true, |&last| last < column));
        self.sequence.push(char::from(sequence_char));
        self.structure.push(char::from(structure_char));
        self.positions.push(column);
    }

    /// Returns the number of structural positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the molecule has no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Translates a structural position into its alignment column.
    pub fn alignment_position(&self, position: usize) -> usize {
        self.positions[position]
    }
}

/// One node of a secondary structure tree, in structural coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureNode {
    /// A residue without a pairing partner
    Unpaired(usize),
    /// A base pair given by its opening and closing position
    Paired(usize, usize),
}

impl StructureNode {
    /// Number of positions covered by the node.
    pub fn arity(&self) -> usize {
        match self {
            StructureNode::Unpaired(_) => 1,
            StructureNode::Paired(_, _) => 2,
        }
    }

    /// Returns the positions covered by the node, in ascending order.
    pub fn positions(&self) -> Vec<usize> {
        match *self {
            StructureNode::Unpaired(i) => vec![i],
            StructureNode::Paired(i, j) => vec![i, j],
        }
    }

    /// Translates the node into alignment coordinates.
    pub fn to_aligned(&self, mapping: &SequenceStructureMapping) -> AlignedNode {
        AlignedNode(match *self {
            StructureNode::Unpaired(i) => StructureNode::Unpaired(mapping.alignment_position(i)),
            StructureNode::Paired(i, j) => StructureNode::Paired(
                mapping.alignment_position(i),
                mapping.alignment_position(j),
            ),
        })
    }
}

impl fmt::Display for StructureNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureNode::Unpaired(i) => write!(f, "[{}]", i),
            StructureNode::Paired(i, j) => write!(f, "[{}, {}]", i, j),
        }
    }
}

/// A structure node whose positions are alignment columns.
///
/// Aligned nodes of the template and of the target live in the same
/// coordinate space, so equal aligned nodes denote the same structural element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlignedNode(StructureNode);

impl AlignedNode {
    /// Returns the underlying node in alignment coordinates.
    pub fn node(&self) -> StructureNode {
        self.0
    }

    /// Number of alignment columns covered by the node.
    pub fn arity(&self) -> usize {
        self.0.arity()
    }
}

/// How one node relates to the other tree.
///
/// Node numbers are 0-based; rendering adds one and writes `0` for the
/// missing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCorrespondence {
    /// Template node mapped onto a target node
    Matched { template: usize, target: usize },
    /// Template node without a target counterpart
    Deleted { template: usize },
    /// Target node without a template counterpart
    Inserted { target: usize },
}

impl NodeCorrespondence {
    /// Returns the template node number, if any.
    pub fn template(&self) -> Option<usize> {
        match *self {
            NodeCorrespondence::Matched { template, .. }
            | NodeCorrespondence::Deleted { template } => Some(template),
            NodeCorrespondence::Inserted { .. } => None,
        }
    }

    /// Returns the target node number, if any.
    pub fn target(&self) -> Option<usize> {
        match *self {
            NodeCorrespondence::Matched { target, .. }
            | NodeCorrespondence::Inserted { target } => Some(target),
            NodeCorrespondence::Deleted { .. } => None,
        }
    }

    /// Returns true if the entry is an insertion or a deletion.
    pub fn is_edit(&self) -> bool {
        !matches!(self, NodeCorrespondence::Matched { .. })
    }
}

impl fmt::Display for NodeCorrespondence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let one_based = |node: Option<usize>| node.map_or(0, |n| n + 1);
        write!(f, "{} {}", one_based(self.template()), one_based(self.target()))
    }
}

/// The correspondence between the template tree and the target tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeMapping {
    /// Template-originated entries in template node order, then insertions
    /// in target node order
    pub entries: Vec<NodeCorrespondence>,
}

impl TreeMapping {
    /// Creates a mapping from its entries.
    pub fn new(entries: Vec<NodeCorrespondence>) -> Self {
        Self { entries }
    }

    /// Number of insertions and deletions.
    pub fn distance(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_edit()).count()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in output order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeCorrespondence> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(positions: &[usize]) -> SequenceStructureMapping {
        let mut mapping = SequenceStructureMapping::default();
        for &column in positions {
            mapping.push(b'A', b'.', column);
        }
        mapping
    }

    #[test]
    fn test_column_kinds() {
        assert!(is_deleted_column(b'-'));
        assert!(!is_deleted_column(b'A'));
        assert!(is_inserted_column(b'c'));
        assert!(!is_inserted_column(b'C'));
        assert!(!is_inserted_column(b'-'));
    }

    #[test]
    fn test_mapping_push() {
        let mut m = SequenceStructureMapping::with_capacity(4);
        m.push(b'G', b'(', 0);
        m.push(b'c', b'.', 2);
        assert_eq!(m.sequence, "Gc");
        assert_eq!(m.structure, "(.");
        assert_eq!(m.positions, vec![0, 2]);
        assert_eq!(m.len(), 2);
        assert_eq!(m.alignment_position(1), 2);
    }

    #[test]
    fn test_node_translation() {
        let m = mapping(&[0, 3, 4, 7]);
        let pair = StructureNode::Paired(1, 3).to_aligned(&m);
        assert_eq!(pair.node(), StructureNode::Paired(3, 7));
        assert_eq!(pair.arity(), 2);

        let single = StructureNode::Unpaired(2).to_aligned(&m);
        assert_eq!(single.node(), StructureNode::Unpaired(4));
        assert_eq!(single.arity(), 1);
    }

    #[test]
    fn test_node_display() {
        assert_eq!(StructureNode::Unpaired(4).to_string(), "[4]");
        assert_eq!(StructureNode::Paired(0, 3).to_string(), "[0, 3]");
        assert_eq!(StructureNode::Paired(0, 3).positions(), vec![0, 3]);
    }

    #[test]
    fn test_correspondence_display() {
        let matched = NodeCorrespondence::Matched { template: 0, target: 1 };
        let deleted = NodeCorrespondence::Deleted { template: 2 };
        let inserted = NodeCorrespondence::Inserted { target: 5 };
        assert_eq!(matched.to_string(), "1 2");
        assert_eq!(deleted.to_string(), "3 0");
        assert_eq!(inserted.to_string(), "0 6");
        assert!(!matched.is_edit());
        assert!(deleted.is_edit());
        assert!(inserted.is_edit());
    }

    #[test]
    fn test_distance() {
        let mapping = TreeMapping::new(vec![
            NodeCorrespondence::Matched { template: 0, target: 0 },
            NodeCorrespondence::Deleted { template: 1 },
            NodeCorrespondence::Inserted { target: 1 },
            NodeCorrespondence::Inserted { target: 2 },
        ]);
        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping.distance(), 3);
        assert_eq!(TreeMapping::default().distance(), 0);
    }
}

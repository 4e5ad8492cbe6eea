//! Dot-bracket structure indexing.
//!
//! Turns a structure string into the ordered list of tree nodes: one node per
//! unpaired residue and one node per base pair. Four bracket alphabets are
//! recognised and paired independently of each other, which is how
//! pseudoknots are written:
//!
//! ```text
//! ()  {}  <>  []
//! ```
//!
//! Any other character is an unpaired residue.

use std::collections::BTreeSet;

use log::debug;
use thiserror::Error;

use crate::model::{is_deleted_column, SequenceStructureMapping, StructureNode};

/// Errors that can occur while indexing a structure.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StructureError {
    #[error("Unbalanced structure: '{bracket}' at position {position} closes no open bracket")]
    UnbalancedStructure { position: usize, bracket: char },

    #[error("Unbalanced structure: '{bracket}' at position {position} is never closed")]
    UnclosedBracket { position: usize, bracket: char },
}

/// Result type for structure indexing.
pub type StructureResult<T> = Result<T, StructureError>;

/// One of the bracket alphabets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Round,
    Curly,
    Angle,
    Square,
}

impl BracketKind {
    /// All alphabets, in stack order.
    pub const ALL: [BracketKind; 4] = [
        BracketKind::Round,
        BracketKind::Curly,
        BracketKind::Angle,
        BracketKind::Square,
    ];

    /// Index of the alphabet's stack.
    fn index(self) -> usize {
        self as usize
    }

    /// Opening symbol of the alphabet.
    pub fn open(self) -> char {
        match self {
            BracketKind::Round => '(',
            BracketKind::Curly => '{',
            BracketKind::Angle => '<',
            BracketKind::Square => '[',
        }
    }

    /// Closing symbol of the alphabet.
    pub fn close(self) -> char {
        match self {
            BracketKind::Round => ')',
            BracketKind::Curly => '}',
            BracketKind::Angle => '>',
            BracketKind::Square => ']',
        }
    }
}

/// A structure character classified by its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Open(BracketKind),
    Close(BracketKind),
    Unpaired,
}

impl Symbol {
    /// Classifies a structure character.
    pub fn classify(c: char) -> Self {
        BracketKind::ALL
            .iter()
            .find_map(|&kind| {
                if c == kind.open() {
                    Some(Symbol::Open(kind))
                } else if c == kind.close() {
                    Some(Symbol::Close(kind))
                } else {
                    None
                }
            })
            .unwrap_or(Symbol::Unpaired)
    }
}

/// Indexes the structure of `mapping` into tree nodes.
///
/// Positions whose alignment column is in `forced_singletons` are emitted as
/// unpaired whatever their character. Nodes are emitted when they complete: an
/// unpaired residue when it is scanned, a pair when its closing bracket is
/// scanned. Node positions are structural coordinates of `mapping`.
pub fn index_structure(
    mapping: &SequenceStructureMapping,
    forced_singletons: &BTreeSet<usize>,
) -> StructureResult<Vec<StructureNode>> {
    let mut nodes = Vec::with_capacity(mapping.len());
    let mut stacks: [Vec<usize>; 4] = Default::default();

    for (position, c) in mapping.structure.chars().enumerate() {
        let symbol = if forced_singletons.contains(&mapping.alignment_position(position)) {
            Symbol::Unpaired
        } else {
            Symbol::classify(c)
        };

        match symbol {
            Symbol::Unpaired => nodes.push(StructureNode::Unpaired(position)),
            Symbol::Open(kind) => stacks[kind.index()].push(position),
            Symbol::Close(kind) => {
                let open = stacks[kind.index()]
                    .pop()
                    .ok_or(StructureError::UnbalancedStructure {
                        position,
                        bracket: c,
                    })?;
                nodes.push(StructureNode::Paired(open, position));
            }
        }
    }

    // Report the leftmost bracket still waiting for its partner
    if let Some((kind, &position)) = BracketKind::ALL
        .iter()
        .filter_map(|&kind| stacks[kind.index()].first().map(|p| (kind, p)))
        .min_by_key(|&(_, &p)| p)
    {
        return Err(StructureError::UnclosedBracket {
            position,
            bracket: kind.open(),
        });
    }

    debug!(
        "Indexed {} positions into {} nodes ({} forced singletons)",
        mapping.len(),
        nodes.len(),
        forced_singletons.len()
    );

    Ok(nodes)
}

/// Finds the alignment columns of template pairs broken by a deletion.
///
/// `nodes` must be the nodes of `template_full`. For every pair with at least
/// one partner deleted in the target, both alignment columns are returned.
pub fn broken_pair_positions(
    alignment_sequence: &str,
    template_full: &SequenceStructureMapping,
    nodes: &[StructureNode],
) -> BTreeSet<usize> {
    let sequence = alignment_sequence.as_bytes();
    let mut affected = BTreeSet::new();

    for node in nodes {
        if let StructureNode::Paired(i, j) = *node {
            let first = template_full.alignment_position(i);
            let second = template_full.alignment_position(j);
            if is_deleted_column(sequence[first]) || is_deleted_column(sequence[second]) {
                affected.insert(first);
                affected.insert(second);
            }
        }
    }

    debug!("Found {} columns of broken pairs", affected.len());
    affected
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mapping whose alignment columns equal its structural positions.
    fn identity(structure: &str) -> SequenceStructureMapping {
        let mut mapping = SequenceStructureMapping::default();
        for (column, c) in structure.bytes().enumerate() {
            mapping.push(b'A', c, column);
        }
        mapping
    }

    fn covered_positions(nodes: &[StructureNode]) -> Vec<usize> {
        let mut positions: Vec<usize> = nodes.iter().flat_map(|n| n.positions()).collect();
        positions.sort_unstable();
        positions
    }

    #[test]
    fn test_classify() {
        assert_eq!(Symbol::classify('('), Symbol::Open(BracketKind::Round));
        assert_eq!(Symbol::classify('}'), Symbol::Close(BracketKind::Curly));
        assert_eq!(Symbol::classify('<'), Symbol::Open(BracketKind::Angle));
        assert_eq!(Symbol::classify(']'), Symbol::Close(BracketKind::Square));
        assert_eq!(Symbol::classify('.'), Symbol::Unpaired);
        assert_eq!(Symbol::classify('~'), Symbol::Unpaired);
        assert_eq!(Symbol::classify('-'), Symbol::Unpaired);
    }

    #[test]
    fn test_hairpin_order() {
        let nodes = index_structure(&identity("(())"), &BTreeSet::new()).unwrap();
        assert_eq!(
            nodes,
            vec![StructureNode::Paired(1, 2), StructureNode::Paired(0, 3)]
        );
    }

    #[test]
    fn test_singletons_interleaved() {
        let nodes = index_structure(&identity(".(.).."), &BTreeSet::new()).unwrap();
        assert_eq!(
            nodes,
            vec![
                StructureNode::Unpaired(0),
                StructureNode::Unpaired(2),
                StructureNode::Paired(1, 3),
                StructureNode::Unpaired(4),
                StructureNode::Unpaired(5),
            ]
        );
    }

    #[test]
    fn test_independent_alphabets() {
        // Crossing pairs from two alphabets form a pseudoknot
        let nodes = index_structure(&identity("(<)>[{}]"), &BTreeSet::new()).unwrap();
        assert_eq!(
            nodes,
            vec![
                StructureNode::Paired(0, 2),
                StructureNode::Paired(1, 3),
                StructureNode::Paired(5, 6),
                StructureNode::Paired(4, 7),
            ]
        );
    }

    #[test]
    fn test_forced_singletons() {
        let mapping = identity("((.))");
        let forced: BTreeSet<usize> = [0, 4].into_iter().collect();
        let nodes = index_structure(&mapping, &forced).unwrap();
        assert_eq!(
            nodes,
            vec![
                StructureNode::Unpaired(0),
                StructureNode::Unpaired(2),
                StructureNode::Paired(1, 3),
                StructureNode::Unpaired(4),
            ]
        );
    }

    #[test]
    fn test_forced_singletons_use_alignment_columns() {
        // Structural position 1 sits on alignment column 5
        let mut mapping = SequenceStructureMapping::default();
        mapping.push(b'G', b'(', 2);
        mapping.push(b'C', b')', 5);
        let forced: BTreeSet<usize> = [1].into_iter().collect();
        assert_eq!(
            index_structure(&mapping, &forced).unwrap(),
            vec![StructureNode::Paired(0, 1)]
        );

        let forced: BTreeSet<usize> = [2, 5].into_iter().collect();
        assert_eq!(
            index_structure(&mapping, &forced).unwrap(),
            vec![StructureNode::Unpaired(0), StructureNode::Unpaired(1)]
        );
    }

    #[test]
    fn test_node_coverage() {
        let structure = "..((<..[[..))..>]]~~{.}.";
        let mapping = identity(structure);
        let all: Vec<usize> = (0..structure.len()).collect();

        let nodes = index_structure(&mapping, &BTreeSet::new()).unwrap();
        assert_eq!(covered_positions(&nodes), all);

        let forced: BTreeSet<usize> = [2, 11, 20, 22].into_iter().collect();
        let nodes = index_structure(&mapping, &forced).unwrap();
        assert_eq!(covered_positions(&nodes), all);
    }

    #[test]
    fn test_empty_structure() {
        let nodes = index_structure(&identity(""), &BTreeSet::new()).unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_unbalanced_close() {
        let result = index_structure(&identity("(.))"), &BTreeSet::new());
        assert_eq!(
            result,
            Err(StructureError::UnbalancedStructure {
                position: 3,
                bracket: ')'
            })
        );
    }

    #[test]
    fn test_mismatched_alphabet() {
        let result = index_structure(&identity("(.]"), &BTreeSet::new());
        assert_eq!(
            result,
            Err(StructureError::UnbalancedStructure {
                position: 2,
                bracket: ']'
            })
        );
    }

    #[test]
    fn test_unclosed_bracket() {
        let result = index_structure(&identity("<(.)[."), &BTreeSet::new());
        assert_eq!(
            result,
            Err(StructureError::UnclosedBracket {
                position: 0,
                bracket: '<'
            })
        );
    }

    #[test]
    fn test_broken_pairs() {
        // Column 3 is deleted, breaking the '<' '>' pair on columns 1 and 3
        let mut template_full = SequenceStructureMapping::default();
        for (column, (s, c)) in "GAA-AC".bytes().zip("(<.>.)".bytes()).enumerate() {
            let column = if column >= 4 { column + 1 } else { column };
            template_full.push(s, c, column);
        }
        let nodes = index_structure(&template_full, &BTreeSet::new()).unwrap();

        let affected = broken_pair_positions("GAA-uAC", &template_full, &nodes);
        assert_eq!(affected.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_no_broken_pairs() {
        let mapping = identity("(())");
        let nodes = index_structure(&mapping, &BTreeSet::new()).unwrap();
        assert!(broken_pair_positions("AAGG", &mapping, &nodes).is_empty());
    }
}

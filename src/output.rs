//! Mapping output.
//!
//! The mapping is written in the plain text form read by Traveler:
//!
//! ```text
//! DISTANCE: 2
//! 1 1
//! 2 2
//! 0 3
//! 0 4
//! ```
//!
//! Node numbers are 1-based and `0` stands for a missing counterpart.

use std::fmt;
use std::io::{self, Write};

use crate::model::TreeMapping;

/// Writes the distance line followed by one line per correspondence.
pub fn write_mapping<W: Write>(writer: &mut W, mapping: &TreeMapping) -> io::Result<()> {
    writeln!(writer, "DISTANCE: {}", mapping.distance())?;
    for entry in mapping.iter() {
        writeln!(writer, "{}", entry)?;
    }
    writer.flush()
}

impl fmt::Display for TreeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DISTANCE: {}", self.distance())?;
        for entry in self.iter() {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeCorrespondence;

    fn sample() -> TreeMapping {
        TreeMapping::new(vec![
            NodeCorrespondence::Matched { template: 0, target: 0 },
            NodeCorrespondence::Deleted { template: 1 },
            NodeCorrespondence::Inserted { target: 1 },
        ])
    }

    #[test]
    fn test_write_mapping() {
        let mut buffer = Vec::new();
        write_mapping(&mut buffer, &sample()).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "DISTANCE: 2\n1 1\n2 0\n0 2\n"
        );
    }

    #[test]
    fn test_display_matches_writer() {
        let mut buffer = Vec::new();
        write_mapping(&mut buffer, &sample()).unwrap();
        assert_eq!(sample().to_string().into_bytes(), buffer);
    }

    #[test]
    fn test_empty_mapping() {
        assert_eq!(TreeMapping::default().to_string(), "DISTANCE: 0\n");
    }
}

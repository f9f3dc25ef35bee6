use serde::{Deserialize, Serialize};

/// a single read: stable unique identifier plus raw sequence bytes
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(id: &str, seq: &[u8]) -> Self {
        Self {
            id: id.to_string(),
            seq: seq.to_vec(),
        }
    }

    /// reverse complement of the sequence; the identifier is preserved
    pub fn reverse_complement(&self) -> SequenceRecord {
        let seq = self
            .seq
            .iter()
            .rev()
            .map(|b| complement(*b))
            .collect::<Vec<u8>>();

        SequenceRecord {
            id: self.id.clone(),
            seq,
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

#[inline(always)]
fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'a' => b't',
        b't' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        b'U' => b'A',
        b'u' => b'a',
        // ambiguity codes collapse to N on the complementary strand
        _ => b'N',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_complement() {
        let record = SequenceRecord::new("read1", b"AACGT");
        let rc = record.reverse_complement();

        assert_eq!(rc.id, "read1");
        assert_eq!(rc.seq, b"ACGTT");
    }

    #[test]
    fn test_reverse_complement_is_involutive() {
        let record = SequenceRecord::new("read1", b"ACGTACGTTTGGCC");
        assert_eq!(record.reverse_complement().reverse_complement(), record);
    }

    #[test]
    fn test_ambiguous_bases_become_n() {
        let record = SequenceRecord::new("read1", b"ARYN");
        assert_eq!(record.reverse_complement().seq, b"NNNT");
    }
}

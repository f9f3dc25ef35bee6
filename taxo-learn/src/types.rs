use serde::{Deserialize, Serialize};

/// sparse per-read feature rows [column -> weight]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub rows: Vec<Vec<(u32, f32)>>,
    pub width: usize,
}

impl FeatureMatrix {
    pub fn new(rows: Vec<Vec<(u32, f32)>>, width: usize) -> Self {
        Self { rows, width }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// data flowing between pipeline steps
#[derive(Debug, Clone)]
pub enum Dataset {
    /// raw read sequences, one per row
    Reads(Vec<Vec<u8>>),
    /// vectorized reads
    Features(FeatureMatrix),
}

impl Dataset {
    pub fn len(&self) -> usize {
        match self {
            Dataset::Reads(reads) => reads.len(),
            Dataset::Features(matrix) => matrix.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Stateless read vectorization
//!
//! Hashing avoids carrying a vocabulary in the fitted artifact: two
//! processes that agree on `n_features` and `kmer_range` produce the
//! same columns, which is what makes a saved classifier reusable.

use anyhow::{bail, Result};
use hashbrown::HashMap;
use rayon::prelude::*;
use serde_json::{json, Value};

use crate::traits::{
    param_bool, param_i64, param_i64_pair, param_string, Estimator, Param, ParamMap,
};
use crate::types::{Dataset, FeatureMatrix};

pub const HASHING_VECTORIZER: &str = "feature_extraction.HashingVectorizer";

/// k-mer hashing vectorizer over raw read sequences
#[derive(Debug, Clone)]
pub struct HashingVectorizer {
    pub n_features: i64,
    pub kmer_range: (i64, i64),
    pub binary: bool,
    pub analyzer: String,
}

impl Default for HashingVectorizer {
    fn default() -> Self {
        Self {
            n_features: 8192,
            kmer_range: (7, 7),
            binary: false,
            analyzer: "kmer".to_string(),
        }
    }
}

impl HashingVectorizer {
    fn vectorize(&self, seq: &[u8], width: u64) -> Vec<(u32, f32)> {
        let seq = seq.to_ascii_uppercase();
        let mut counts: HashMap<u32, f32> = HashMap::new();

        for k in self.kmer_range.0..=self.kmer_range.1 {
            let k = k as usize;
            if k == 0 || seq.len() < k {
                continue;
            }
            for window in seq.windows(k) {
                let column = (fnv1a(window) % width) as u32;
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut row = counts
            .into_iter()
            .map(|(column, count)| {
                if self.binary {
                    (column, 1.0)
                } else {
                    (column, count)
                }
            })
            .collect::<Vec<(u32, f32)>>();
        row.sort_unstable_by_key(|(column, _)| *column);

        row
    }
}

impl Estimator for HashingVectorizer {
    fn tag(&self) -> &'static str {
        HASHING_VECTORIZER
    }

    fn get_params(&self) -> ParamMap {
        let mut params = ParamMap::new();

        params.insert(
            "n_features".to_string(),
            Param::Value(json!(self.n_features)),
        );
        params.insert(
            "kmer_range".to_string(),
            Param::Value(json!([self.kmer_range.0, self.kmer_range.1])),
        );
        params.insert("binary".to_string(), Param::Value(json!(self.binary)));
        params.insert(
            "analyzer".to_string(),
            Param::Value(Value::String(self.analyzer.clone())),
        );

        params
    }

    fn set_param(&mut self, name: &str, value: Param) -> Result<()> {
        match name {
            "n_features" => self.n_features = param_i64(&value, name)?,
            "kmer_range" => self.kmer_range = param_i64_pair(&value, name)?,
            "binary" => self.binary = param_bool(&value, name)?,
            "analyzer" => self.analyzer = param_string(&value, name)?,
            _ => bail!("ERROR: unknown parameter '{}' for {}", name, self.tag()),
        }

        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }

    fn fit(&mut self, _data: &Dataset, _labels: &[String]) -> Result<()> {
        // hashing is stateless
        Ok(())
    }

    fn transform(&self, data: &Dataset) -> Result<Dataset> {
        let reads = match data {
            Dataset::Reads(reads) => reads,
            Dataset::Features(_) => {
                bail!("ERROR: {} expects raw reads, got features", self.tag())
            }
        };

        if self.n_features <= 0 {
            bail!("ERROR: n_features must be positive, got {}", self.n_features);
        }
        if self.kmer_range.0 <= 0 || self.kmer_range.1 < self.kmer_range.0 {
            bail!("ERROR: invalid kmer_range {:?}", self.kmer_range);
        }
        if self.analyzer != "kmer" {
            bail!("ERROR: unsupported analyzer '{}'", self.analyzer);
        }

        let width = self.n_features as u64;
        let rows = reads
            .par_iter()
            .map(|seq| self.vectorize(seq, width))
            .collect::<Vec<_>>();

        Ok(Dataset::Features(FeatureMatrix::new(
            rows,
            self.n_features as usize,
        )))
    }
}

/// stable across processes, unlike the std hasher
#[inline(always)]
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

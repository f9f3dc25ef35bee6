//! Orientation detection and confidence-limited assignment

use anyhow::{bail, Result};
use clap::ValueEnum;

use config::{ORIENTATION_SAMPLE_SIZE, RANK_SEPARATOR, UNASSIGNED};
use taxo_learn::Pipeline;
use taxo_pack::record::SequenceRecord;

/// orientation of the reads relative to the reference the classifier was
/// fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReadOrientation {
    /// reads are on the same strand as the reference
    Same,
    /// reads are reverse complements of the reference strand
    ReverseComplement,
}

/// orient a read stream before classification
///
/// With an explicit orientation the stream is passed through (flipped
/// read-by-read for `ReverseComplement`). Without one, up to the first
/// 100 reads are classified both as-is and reverse-complemented; the
/// orientation with the higher median confidence wins. The sampled
/// prefix is re-emitted ahead of the rest of the stream, so every read
/// is classified exactly once.
pub fn autodetect_orientation<'a, I>(
    reads: &'a mut I,
    classifier: &Pipeline,
    orientation: Option<ReadOrientation>,
) -> Result<Box<dyn Iterator<Item = SequenceRecord> + 'a>>
where
    I: Iterator<Item = SequenceRecord>,
{
    let first = match reads.next() {
        Some(read) => read,
        None => bail!("ERROR: empty reads input"),
    };

    match orientation {
        Some(ReadOrientation::Same) => Ok(Box::new(std::iter::once(first).chain(reads))),
        Some(ReadOrientation::ReverseComplement) => Ok(Box::new(
            std::iter::once(first)
                .chain(reads)
                .map(|read| read.reverse_complement()),
        )),
        None => {
            let mut sample = Vec::with_capacity(ORIENTATION_SAMPLE_SIZE);
            sample.push(first);
            while sample.len() < ORIENTATION_SAMPLE_SIZE {
                match reads.next() {
                    Some(read) => sample.push(read),
                    None => break,
                }
            }

            let flipped = sample
                .iter()
                .map(|read| read.reverse_complement())
                .collect::<Vec<SequenceRecord>>();

            let same = trial_confidences(classifier, &sample)?;
            let reverse = trial_confidences(classifier, &flipped)?;
            let diffs = same
                .iter()
                .zip(reverse.iter())
                .map(|(s, r)| s - r)
                .collect::<Vec<f64>>();

            if median(&diffs) > 0.0 {
                log::info!("Detected read orientation: same as reference");
                Ok(Box::new(sample.into_iter().chain(reads)))
            } else {
                log::info!("Detected read orientation: reverse complement");
                Ok(Box::new(
                    flipped
                        .into_iter()
                        .chain(reads.map(|read| read.reverse_complement())),
                ))
            }
        }
    }
}

/// full-depth confidences for a trial sample, with truncation disabled
fn trial_confidences(classifier: &Pipeline, sample: &[SequenceRecord]) -> Result<Vec<f64>> {
    let assignments = crate::core::predict_chunk(classifier, sample, 0.0)?;

    Ok(assignments
        .into_iter()
        .map(|assignment| assignment.confidence)
        .collect())
}

/// median of a non-empty slice
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("no NaN confidences"));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// split every class label into its ranks
pub fn rank_classes(classes: &[String]) -> Vec<Vec<String>> {
    classes
        .iter()
        .map(|class| {
            class
                .split(RANK_SEPARATOR)
                .map(|rank| rank.to_string())
                .collect()
        })
        .collect()
}

/// collapse one probability row into a confidence-limited call
///
/// The running confidence at a depth is the total probability of every
/// class sharing the winning class's rank prefix at that depth; it never
/// decreases as the prefix shortens. With `confidence == 0.0` the full
/// label is reported with its full-depth running confidence. Otherwise
/// the label is truncated to the deepest prefix whose running confidence
/// meets the threshold, or 'Unassigned' when even the first rank fails.
pub fn assign(
    ranked: &[Vec<String>],
    classes: &[String],
    proba: &[f64],
    confidence: f64,
) -> (String, f64) {
    let best = argmax(proba);
    let depth = ranked[best].len();

    let cumulative = |depth: usize| -> f64 {
        proba
            .iter()
            .zip(ranked.iter())
            .filter(|(_, ranks)| ranks.len() >= depth && ranks[..depth] == ranked[best][..depth])
            .map(|(p, _)| p)
            .sum()
    };

    if confidence == 0.0 {
        return (classes[best].clone(), cumulative(depth));
    }

    for d in (1..=depth).rev() {
        let running = cumulative(d);
        if running >= confidence {
            let label = ranked[best][..d].join(&RANK_SEPARATOR.to_string());
            return (label, running);
        }
    }

    (UNASSIGNED.to_string(), cumulative(1))
}

/// index of the largest probability
pub fn argmax(proba: &[f64]) -> usize {
    proba
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).expect("no NaN probabilities"))
        .map(|(idx, _)| idx)
        .expect("non-empty probability row")
}

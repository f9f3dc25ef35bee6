//! Fitting classifiers from specifications and catalog entries

use anyhow::{anyhow, bail, Result};
use hashbrown::HashMap;

use std::path::PathBuf;

use taxo_learn::types::Dataset;
use taxo_learn::Param;
use taxo_pack::{read_fasta, read_taxonomy, SequenceRecord};
use taxo_spec::{
    pipeline_from_spec, CompatibilityNotice, FittedClassifier, PipelineSpec,
};

use crate::cli::Args;
use crate::registration::{catalog_registrations, find_registration};
use crate::signature::decode_override;

/// a fitted classifier together with its version diagnostic
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub classifier: FittedClassifier,
    pub notice: CompatibilityNotice,
}

/// CLI entry: fit a classifier and write the artifact
pub fn fit(args: Args) -> Result<PathBuf> {
    if args.list {
        list_registrations()?;
        return Ok(args.output);
    }

    let reads = read_fasta(args.reads.as_ref().expect("checked by the CLI"))?;
    let taxonomy = read_taxonomy(args.taxonomy.as_ref().expect("checked by the CLI"))?;

    let outcome = match (&args.spec, &args.catalog) {
        (Some(path), None) => {
            let spec = read_spec(path)?;
            fit_classifier_from_spec(&spec, &reads, &taxonomy)?
        }
        (None, Some(name)) => {
            let overrides = parse_overrides(&args.set)?;
            fit_catalog_classifier(name, &overrides, &reads, &taxonomy)?
        }
        _ => bail!("ERROR: exactly one of --spec or --catalog is required"),
    };

    log::warn!("{}", outcome.notice);
    outcome.classifier.save(&args.output)?;

    Ok(args.output)
}

/// read a pipeline specification from a JSON file
pub fn read_spec(path: &PathBuf) -> Result<PipelineSpec> {
    let raw = std::fs::read_to_string(path)?;
    Ok(PipelineSpec::from_str(&raw)?)
}

/// fit a pipeline described by an explicit specification
pub fn fit_classifier_from_spec(
    spec: &PipelineSpec,
    reads: &[SequenceRecord],
    taxonomy: &HashMap<String, String>,
) -> Result<FitOutcome> {
    let pipeline = pipeline_from_spec(spec)?;
    fit_pipeline(pipeline, reads, taxonomy)
}

/// fit a catalog classifier with typed parameter overrides
///
/// Override keys must belong to the entry's derived signature; values are
/// parsed according to the signature's kinds.
pub fn fit_catalog_classifier(
    name: &str,
    overrides: &[(String, String)],
    reads: &[SequenceRecord],
    taxonomy: &HashMap<String, String>,
) -> Result<FitOutcome> {
    let registration = find_registration(name)?;
    let mut pipeline = pipeline_from_spec(&registration.spec)?;

    for (key, raw) in overrides {
        let derived = registration
            .params
            .iter()
            .find(|param| &param.name == key)
            .ok_or_else(|| {
                anyhow!(
                    "ERROR: unknown parameter '{}' for classifier '{}'",
                    key,
                    name
                )
            })?;

        let value = decode_override(derived.kind, raw)?;
        pipeline.set_param(key, Param::Value(value))?;
    }

    fit_pipeline(pipeline, reads, taxonomy)
}

/// fit a live pipeline on reads labeled through the taxonomy map
pub fn fit_pipeline(
    mut pipeline: taxo_learn::Pipeline,
    reads: &[SequenceRecord],
    taxonomy: &HashMap<String, String>,
) -> Result<FitOutcome> {
    if reads.is_empty() {
        bail!("ERROR: empty reads input");
    }

    let mut labels = Vec::with_capacity(reads.len());
    for read in reads {
        let taxon = taxonomy
            .get(&read.id)
            .ok_or_else(|| anyhow!("ERROR: no taxonomy for read '{}'", read.id))?;
        labels.push(taxon.clone());
    }

    let data = Dataset::Reads(reads.iter().map(|read| read.seq.clone()).collect());
    pipeline.fit(&data, &labels)?;

    let classifier = FittedClassifier::new(pipeline);
    let notice = classifier.notice();

    Ok(FitOutcome { classifier, notice })
}

/// split `key=value` override arguments
fn parse_overrides(set: &[String]) -> Result<Vec<(String, String)>> {
    set.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| anyhow!("ERROR: malformed override '{}', expected KEY=VALUE", entry))
        })
        .collect()
}

/// print every registration with its typed signature
fn list_registrations() -> Result<()> {
    for registration in catalog_registrations()? {
        println!("{} [{}]", registration.name, registration.operation);
        for param in &registration.params {
            println!(
                "  --set {}=<{}> [default: {}]",
                param.name, param.kind, param.default
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taxo_spec::spec_from_pipeline;

    const MOTIF_A: &str = "AAACCC";
    const MOTIF_B: &str = "AGAGAG";

    fn training_set() -> (Vec<SequenceRecord>, HashMap<String, String>) {
        let mut reads = Vec::new();
        let mut taxonomy = HashMap::new();

        for idx in 0..4 {
            let id = format!("a{}", idx);
            reads.push(SequenceRecord::new(&id, MOTIF_A.repeat(6).as_bytes()));
            taxonomy.insert(id, "k__Bacteria;p__Firmicutes".to_string());

            let id = format!("b{}", idx);
            reads.push(SequenceRecord::new(&id, MOTIF_B.repeat(6).as_bytes()));
            taxonomy.insert(id, "k__Bacteria;p__Proteobacteria".to_string());
        }

        (reads, taxonomy)
    }

    fn small_spec() -> PipelineSpec {
        PipelineSpec::from_value(&json!([
            ["vectorizer", {
                "__type__": "feature_extraction.HashingVectorizer",
                "n_features": 512,
                "kmer_range": [4, 4]
            }],
            ["classifier", {
                "__type__": "naive_bayes.MultinomialNB",
                "alpha": 0.001,
                "fit_prior": false
            }]
        ]))
        .unwrap()
    }

    #[test]
    fn test_fit_from_spec_and_predict() {
        let (reads, taxonomy) = training_set();
        let outcome = fit_classifier_from_spec(&small_spec(), &reads, &taxonomy).unwrap();

        let data = Dataset::Reads(vec![MOTIF_A.repeat(6).into_bytes()]);
        let predictions = outcome.classifier.pipeline.predict(&data).unwrap();

        assert_eq!(predictions, vec!["k__Bacteria;p__Firmicutes".to_string()]);
        assert_eq!(outcome.notice.library_version, taxo_learn::VERSION);
    }

    #[test]
    fn test_catalog_fit_equals_generic_fit() {
        let (reads, taxonomy) = training_set();

        let catalog = fit_catalog_classifier("naive_bayes", &[], &reads, &taxonomy).unwrap();

        let registration = find_registration("naive_bayes").unwrap();
        let generic =
            fit_classifier_from_spec(&registration.spec, &reads, &taxonomy).unwrap();

        let data = Dataset::Reads(vec![
            MOTIF_A.repeat(6).into_bytes(),
            MOTIF_B.repeat(6).into_bytes(),
        ]);
        assert_eq!(
            catalog.classifier.pipeline.predict(&data).unwrap(),
            generic.classifier.pipeline.predict(&data).unwrap()
        );
        assert_eq!(
            spec_from_pipeline(&catalog.classifier.pipeline),
            spec_from_pipeline(&generic.classifier.pipeline)
        );
    }

    #[test]
    fn test_catalog_overrides_apply() {
        let (reads, taxonomy) = training_set();
        let overrides = vec![
            ("classifier__alpha".to_string(), "0.5".to_string()),
            ("vectorizer__n_features".to_string(), "256".to_string()),
            ("vectorizer__kmer_range".to_string(), "[4,4]".to_string()),
        ];

        let outcome =
            fit_catalog_classifier("naive_bayes", &overrides, &reads, &taxonomy).unwrap();
        let params = outcome.classifier.pipeline.get_params();

        assert_eq!(
            params["classifier__alpha"].as_value().unwrap(),
            &json!(0.5)
        );
        assert_eq!(
            params["vectorizer__n_features"].as_value().unwrap(),
            &json!(256)
        );
        assert_eq!(
            params["vectorizer__kmer_range"].as_value().unwrap(),
            &json!([4, 4])
        );
    }

    #[test]
    fn test_string_override_without_json_stays_string() {
        let (reads, taxonomy) = training_set();
        let overrides = vec![("vectorizer__analyzer".to_string(), "kmer".to_string())];

        let outcome =
            fit_catalog_classifier("naive_bayes", &overrides, &reads, &taxonomy).unwrap();
        let params = outcome.classifier.pipeline.get_params();

        assert_eq!(
            params["vectorizer__analyzer"].as_value().unwrap(),
            &json!("kmer")
        );
    }

    #[test]
    fn test_unknown_override_fails() {
        let (reads, taxonomy) = training_set();
        let overrides = vec![("vectorizer__vocabulary".to_string(), "1".to_string())];

        let err = fit_catalog_classifier("naive_bayes", &overrides, &reads, &taxonomy)
            .unwrap_err();
        assert!(err.to_string().contains("unknown parameter"));
    }

    #[test]
    fn test_unknown_catalog_name_fails() {
        let (reads, taxonomy) = training_set();
        let err = fit_catalog_classifier("mystery_nb", &[], &reads, &taxonomy).unwrap_err();

        assert!(err.to_string().contains("unknown catalog classifier"));
    }

    #[test]
    fn test_empty_reads_fail() {
        let err = fit_classifier_from_spec(&small_spec(), &[], &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("empty reads input"));
    }

    #[test]
    fn test_missing_taxonomy_fails() {
        let reads = vec![SequenceRecord::new("orphan", b"ACGTACGTACGT")];
        let err =
            fit_classifier_from_spec(&small_spec(), &reads, &HashMap::new()).unwrap_err();

        assert!(err.to_string().contains("no taxonomy for read 'orphan'"));
    }

    #[test]
    fn test_parse_overrides() {
        let parsed = parse_overrides(&["a=1".to_string(), "b=[2,3]".to_string()]).unwrap();
        assert_eq!(parsed[0], ("a".to_string(), "1".to_string()));
        assert_eq!(parsed[1], ("b".to_string(), "[2,3]".to_string()));

        assert!(parse_overrides(&["no-equals".to_string()]).is_err());
    }
}

//! Built-in classifier specifications
//!
//! Each entry is a complete, fixed pipeline exposed downstream as its
//! own pre-configured fit operation with typed, overridable parameters.

use serde_json::json;

use crate::spec::PipelineSpec;

/// the catalog of fixed pipeline specifications
pub fn builtin_specs() -> Vec<(&'static str, PipelineSpec)> {
    vec![
        ("naive_bayes", naive_bayes()),
        ("temperature_scaled_nb", temperature_scaled_nb()),
    ]
}

fn naive_bayes() -> PipelineSpec {
    let spec = json!([
        ["vectorizer", {
            "__type__": "feature_extraction.HashingVectorizer",
            "n_features": 8192,
            "kmer_range": [7, 7],
            "binary": false,
            "analyzer": "kmer"
        }],
        ["classifier", {
            "__type__": "naive_bayes.MultinomialNB",
            "alpha": 0.001,
            "fit_prior": false
        }]
    ]);

    PipelineSpec::from_value(&spec).expect("catalog specs are well formed")
}

fn temperature_scaled_nb() -> PipelineSpec {
    let spec = json!([
        ["vectorizer", {
            "__type__": "feature_extraction.HashingVectorizer",
            "n_features": 8192,
            "kmer_range": [7, 7],
            "binary": false,
            "analyzer": "kmer"
        }],
        ["classifier", {
            "__type__": "custom.TemperatureScaledClassifier",
            "temperature": 2.0,
            "estimator": {
                "__type__": "naive_bayes.MultinomialNB",
                "alpha": 0.001,
                "fit_prior": false
            }
        }]
    ]);

    PipelineSpec::from_value(&spec).expect("catalog specs are well formed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::pipeline_from_spec;

    #[test]
    fn test_catalog_specs_decode() {
        for (name, spec) in builtin_specs() {
            assert!(pipeline_from_spec(&spec).is_ok(), "catalog entry '{}'", name);
        }
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names = builtin_specs()
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), builtin_specs().len());
    }
}

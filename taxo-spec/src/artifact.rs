//! The fitted classifier artifact
//!
//! A fitted pipeline is frozen into a read-only artifact: the structural
//! spec (through the codec), the per-step fitted state, and the exact
//! estimator-library version that produced it. Cross-version loading is
//! not supported; it is warned about, never enforced (the original
//! behavior, kept deliberately).

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use taxo_learn::Pipeline;

use crate::codec::{pipeline_from_spec, spec_from_pipeline};
use crate::spec::PipelineSpec;

#[derive(Debug, Clone)]
pub struct FittedClassifier {
    pub version: String,
    pub pipeline: Pipeline,
}

/// structured version diagnostic attached to every fit result, so that
/// callers (and tests) can inspect it instead of scraping a log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityNotice {
    pub library_version: String,
}

impl std::fmt::Display for CompatibilityNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "this classifier was fitted with taxo-learn version {}; it cannot be used \
             with other versions of the library (classification may complete, but the \
             results will be unreliable)",
            self.library_version
        )
    }
}

impl FittedClassifier {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            version: taxo_learn::VERSION.to_string(),
            pipeline,
        }
    }

    pub fn notice(&self) -> CompatibilityNotice {
        CompatibilityNotice {
            library_version: self.version.clone(),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::json!({
            "version": self.version,
            "spec": spec_from_pipeline(&self.pipeline).to_value(),
            "state": self.pipeline.state()?,
        }))
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let version = value
            .get("version")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("ERROR: artifact has no version tag"))?
            .to_string();
        let spec = value
            .get("spec")
            .ok_or_else(|| anyhow!("ERROR: artifact has no pipeline spec"))?;
        let state = value
            .get("state")
            .ok_or_else(|| anyhow!("ERROR: artifact has no fitted state"))?;

        if version != taxo_learn::VERSION {
            log::warn!(
                "classifier was fitted with taxo-learn version {}, current version \
                 is {}; results may be unreliable",
                version,
                taxo_learn::VERSION
            );
        }

        let mut pipeline = pipeline_from_spec(&PipelineSpec::from_value(spec)?)?;
        pipeline.restore(state)?;

        Ok(Self { version, pipeline })
    }

    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.to_value()?)?;

        log::info!("Classifier written to {:?}", path);

        Ok(())
    }

    pub fn load(path: &PathBuf) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let value: Value = serde_json::from_reader(reader)?;

        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_specs;
    use taxo_learn::types::Dataset;

    fn fitted_classifier() -> FittedClassifier {
        let (_, spec) = builtin_specs().remove(0);
        let mut pipeline = pipeline_from_spec(&spec).unwrap();

        let data = Dataset::Reads(vec![
            b"AAACCCAAACCCAAACCC".to_vec(),
            b"AGAGAGAGAGAGAGAGAG".to_vec(),
        ]);
        let labels = vec!["k__A;p__B".to_string(), "k__C;p__D".to_string()];
        pipeline.fit(&data, &labels).unwrap();

        FittedClassifier::new(pipeline)
    }

    #[test]
    fn test_value_roundtrip_preserves_predictions() {
        let classifier = fitted_classifier();
        let restored = FittedClassifier::from_value(&classifier.to_value().unwrap()).unwrap();

        let data = Dataset::Reads(vec![b"AAACCCAAACCC".to_vec()]);
        assert_eq!(
            classifier.pipeline.predict(&data).unwrap(),
            restored.pipeline.predict(&data).unwrap()
        );
        assert_eq!(restored.version, taxo_learn::VERSION);
    }

    #[test]
    fn test_save_and_load() {
        let classifier = fitted_classifier();
        let path = std::env::temp_dir().join(format!(
            "taxotools-artifact-{}.json",
            std::process::id()
        ));

        classifier.save(&path).unwrap();
        let restored = FittedClassifier::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let data = Dataset::Reads(vec![b"AGAGAGAGAGAG".to_vec()]);
        assert_eq!(
            classifier.pipeline.predict(&data).unwrap(),
            restored.pipeline.predict(&data).unwrap()
        );
    }

    #[test]
    fn test_notice_names_the_version() {
        let notice = fitted_classifier().notice();

        assert_eq!(notice.library_version, taxo_learn::VERSION);
        assert!(notice.to_string().contains(taxo_learn::VERSION));
    }

    #[test]
    fn test_artifact_without_version_fails() {
        let value = serde_json::json!({"spec": [], "state": {}});
        assert!(FittedClassifier::from_value(&value).is_err());
    }
}

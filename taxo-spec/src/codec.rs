//! Encode/decode between live pipelines and specification trees

use anyhow::{Context, Result};

use taxo_learn::{Estimator, Param, Pipeline};

use crate::registry::resolve;
use crate::spec::{NodeSpec, ParamSpec, PipelineSpec};

/// serialize a live pipeline into its JSON-safe specification
///
/// Never fails for a pipeline of recognized estimators: parameters that
/// cannot be represented as JSON are dropped silently.
pub fn spec_from_pipeline(pipeline: &Pipeline) -> PipelineSpec {
    let steps = pipeline
        .steps
        .iter()
        .map(|(name, step)| {
            let encoded = match step {
                Param::Estimator(estimator) => {
                    ParamSpec::Node(encode_estimator(estimator.as_ref()))
                }
                Param::Value(value) => ParamSpec::Value(value.clone()),
                Param::Opaque => {
                    log::debug!("dropping opaque step '{}' during encoding", name);
                    ParamSpec::Value(serde_json::Value::Null)
                }
            };
            (name.clone(), encoded)
        })
        .collect();

    PipelineSpec { steps }
}

/// encode a single estimator into a tagged node
///
/// Parameters reachable through a nested estimator's own block (names
/// under a `<subparam>__` prefix) are dropped to keep the tree
/// non-redundant; the decoder reconstructs them from the nested node.
/// The prefix match is a heuristic over sibling names and is not proven
/// exhaustive for pathological name collisions.
pub fn encode_estimator(estimator: &dyn Estimator) -> NodeSpec {
    let params = estimator.get_params();

    let prefixes = params
        .iter()
        .filter(|(_, value)| matches!(value, Param::Estimator(_)))
        .map(|(name, _)| format!("{}__", name))
        .collect::<Vec<String>>();

    let mut encoded = std::collections::BTreeMap::new();
    'params: for (name, value) in params {
        for prefix in &prefixes {
            if name.starts_with(prefix.as_str()) {
                continue 'params;
            }
        }

        match value {
            Param::Estimator(sub) => {
                encoded.insert(name, ParamSpec::Node(encode_estimator(sub.as_ref())));
            }
            Param::Value(value) => {
                encoded.insert(name, ParamSpec::Value(value));
            }
            // non-serializable runtime values are omitted, not an error
            Param::Opaque => {}
        }
    }

    NodeSpec {
        tag: estimator.tag().to_string(),
        params: encoded,
    }
}

/// reconstruct a live pipeline from a specification tree
pub fn pipeline_from_spec(spec: &PipelineSpec) -> Result<Pipeline> {
    let mut steps = Vec::with_capacity(spec.steps.len());

    for (name, param) in &spec.steps {
        steps.push((name.clone(), decode_param(param)?));
    }

    Ok(Pipeline::new(steps))
}

fn decode_param(param: &ParamSpec) -> Result<Param> {
    match param {
        ParamSpec::Value(value) => Ok(Param::Value(value.clone())),
        ParamSpec::Node(node) => Ok(Param::Estimator(decode_node(node)?)),
    }
}

/// depth-first reconstruction: resolve the tag, default-construct, then
/// apply the node's parameters bottom-up
fn decode_node(node: &NodeSpec) -> Result<Box<dyn Estimator>> {
    let mut estimator = resolve(&node.tag)?;

    for (name, param) in &node.params {
        let value = decode_param(param)?;
        estimator
            .set_param(name, value)
            .with_context(|| format!("while constructing {}", node.tag))?;
    }

    Ok(estimator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_specs;
    use anyhow::bail;
    use serde_json::{json, Value};
    use taxo_learn::types::Dataset;
    use taxo_learn::ParamMap;

    #[test]
    fn test_catalog_roundtrip_fixed_point() {
        // deflation and inflation must be inverse after one round trip
        for (name, spec) in builtin_specs() {
            let pipeline = pipeline_from_spec(&spec).unwrap();
            let spec_one = spec_from_pipeline(&pipeline);
            let pipeline = pipeline_from_spec(&spec_one).unwrap();
            let spec_two = spec_from_pipeline(&pipeline);

            assert_eq!(spec_one, spec_two, "catalog entry '{}'", name);
        }
    }

    #[test]
    fn test_decode_applies_parameters() {
        let spec = PipelineSpec::from_value(&json!([
            ["vectorizer", {
                "__type__": "feature_extraction.HashingVectorizer",
                "n_features": 256,
                "kmer_range": [5, 5]
            }]
        ]))
        .unwrap();

        let pipeline = pipeline_from_spec(&spec).unwrap();
        let params = pipeline.get_params();

        assert_eq!(
            params["vectorizer__n_features"].as_value().unwrap(),
            &json!(256)
        );
        assert_eq!(
            params["vectorizer__kmer_range"].as_value().unwrap(),
            &json!([5, 5])
        );
    }

    #[test]
    fn test_decode_unknown_class_fails() {
        let spec = PipelineSpec::from_value(&json!([
            ["classifier", {"__type__": "naive_bayes.NoSuchClass"}]
        ]))
        .unwrap();

        let err = pipeline_from_spec(&spec).unwrap_err();
        assert!(err
            .to_string()
            .contains("is not a recognised class"));
    }

    #[test]
    fn test_nested_estimator_roundtrip() {
        let spec = PipelineSpec::from_value(&json!([
            ["classifier", {
                "__type__": "custom.TemperatureScaledClassifier",
                "temperature": 0.5,
                "estimator": {
                    "__type__": "naive_bayes.MultinomialNB",
                    "alpha": 0.25,
                    "fit_prior": true
                }
            }]
        ]))
        .unwrap();

        let pipeline = pipeline_from_spec(&spec).unwrap();
        let encoded = spec_from_pipeline(&pipeline);

        let node = match &encoded.steps[0].1 {
            ParamSpec::Node(node) => node,
            _ => panic!("expected a node"),
        };

        // flattened duplicates of the nested estimator's parameters are
        // dropped; the nested node itself survives
        assert!(!node.params.contains_key("estimator__alpha"));
        assert!(!node.params.contains_key("estimator__fit_prior"));
        let nested = match &node.params["estimator"] {
            ParamSpec::Node(nested) => nested,
            _ => panic!("expected a nested node"),
        };
        assert_eq!(nested.tag, "naive_bayes.MultinomialNB");
        assert_eq!(nested.params["alpha"], ParamSpec::Value(json!(0.25)));
    }

    #[derive(Clone)]
    struct OpaqueHolder;

    impl Estimator for OpaqueHolder {
        fn tag(&self) -> &'static str {
            "custom.OpaqueHolder"
        }

        fn get_params(&self) -> ParamMap {
            let mut params = ParamMap::new();
            params.insert("alpha".to_string(), Param::Value(json!(1.0)));
            params.insert("handle".to_string(), Param::Opaque);
            params
        }

        fn set_param(&mut self, name: &str, _value: Param) -> anyhow::Result<()> {
            bail!("ERROR: unknown parameter '{}'", name)
        }

        fn clone_box(&self) -> Box<dyn Estimator> {
            Box::new(self.clone())
        }

        fn fit(&mut self, _data: &Dataset, _labels: &[String]) -> anyhow::Result<()> {
            Ok(())
        }

        fn state(&self) -> anyhow::Result<Value> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn test_opaque_params_are_dropped() {
        let node = encode_estimator(&OpaqueHolder);

        assert_eq!(node.tag, "custom.OpaqueHolder");
        assert!(node.params.contains_key("alpha"));
        assert!(!node.params.contains_key("handle"));
    }
}

//! Ordered estimator chains
//!
//! A pipeline is a list of named steps. A step is usually an estimator
//! but may be a plain JSON value acting as a passthrough placeholder;
//! only estimator steps participate in fitting and prediction. The last
//! estimator step is the classifier, everything before it transforms.

use anyhow::{anyhow, bail, Result};
use serde_json::{Map, Value};

use crate::traits::{Estimator, Param, ParamMap};
use crate::types::Dataset;

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub steps: Vec<(String, Param)>,
}

impl Pipeline {
    pub fn new(steps: Vec<(String, Param)>) -> Self {
        Self { steps }
    }

    fn last_estimator_index(&self) -> Option<usize> {
        self.steps
            .iter()
            .rposition(|(_, step)| matches!(step, Param::Estimator(_)))
    }

    /// fit every estimator step in order, feeding each the output of the
    /// transforms before it
    pub fn fit(&mut self, data: &Dataset, labels: &[String]) -> Result<()> {
        let last = self
            .last_estimator_index()
            .ok_or_else(|| anyhow!("ERROR: pipeline has no estimator steps"))?;

        let mut data = data.clone();
        for (idx, (_, step)) in self.steps.iter_mut().enumerate() {
            if let Param::Estimator(estimator) = step {
                estimator.fit(&data, labels)?;
                if idx < last {
                    data = estimator.transform(&data)?;
                }
            }
        }

        Ok(())
    }

    /// run the transform steps and hand back the classifier's input
    fn apply_transforms(&self, data: &Dataset) -> Result<(Dataset, &dyn Estimator)> {
        let last = self
            .last_estimator_index()
            .ok_or_else(|| anyhow!("ERROR: pipeline has no estimator steps"))?;

        let mut data = data.clone();
        for (idx, (_, step)) in self.steps.iter().enumerate() {
            if let Param::Estimator(estimator) = step {
                if idx < last {
                    data = estimator.transform(&data)?;
                } else {
                    return Ok((data, estimator.as_ref()));
                }
            }
        }

        unreachable!("last estimator index is always reachable")
    }

    pub fn predict_proba(&self, data: &Dataset) -> Result<Vec<Vec<f64>>> {
        let (data, classifier) = self.apply_transforms(data)?;
        classifier.predict_proba(&data)
    }

    /// plain class labels, no confidence computation
    pub fn predict(&self, data: &Dataset) -> Result<Vec<String>> {
        let proba = self.predict_proba(data)?;
        let classes = self
            .classes()
            .ok_or_else(|| anyhow!("ERROR: pipeline classifier has not been fitted"))?;

        proba
            .iter()
            .map(|row| {
                let best = argmax(row)
                    .ok_or_else(|| anyhow!("ERROR: empty probability row"))?;
                Ok(classes[best].clone())
            })
            .collect()
    }

    pub fn classes(&self) -> Option<&[String]> {
        let last = self.last_estimator_index()?;
        match &self.steps[last].1 {
            Param::Estimator(estimator) => estimator.classes(),
            _ => None,
        }
    }

    /// flat parameter mapping: each step by name, plus every estimator
    /// step's own parameters under `<step>__<param>`
    pub fn get_params(&self) -> ParamMap {
        let mut params = ParamMap::new();

        for (name, step) in &self.steps {
            params.insert(name.clone(), step.clone());
            if let Param::Estimator(estimator) = step {
                for (key, value) in estimator.get_params() {
                    params.insert(format!("{}__{}", name, key), value);
                }
            }
        }

        params
    }

    /// route `step__param` names into the addressed step; a bare step
    /// name replaces the step wholesale
    pub fn set_param(&mut self, name: &str, value: Param) -> Result<()> {
        if let Some((head, tail)) = name.split_once("__") {
            let step = self
                .steps
                .iter_mut()
                .find(|(step_name, _)| step_name == head)
                .ok_or_else(|| anyhow!("ERROR: unknown pipeline step '{}'", head))?;

            return match &mut step.1 {
                Param::Estimator(estimator) => estimator.set_param(tail, value),
                _ => bail!("ERROR: step '{}' is not an estimator", head),
            };
        }

        let step = self
            .steps
            .iter_mut()
            .find(|(step_name, _)| step_name == name)
            .ok_or_else(|| anyhow!("ERROR: unknown pipeline step '{}'", name))?;
        step.1 = value;

        Ok(())
    }

    /// fitted state of every estimator step, keyed by step name
    pub fn state(&self) -> Result<Value> {
        let mut state = Map::new();

        for (name, step) in &self.steps {
            if let Param::Estimator(estimator) = step {
                state.insert(name.clone(), estimator.state()?);
            }
        }

        Ok(Value::Object(state))
    }

    pub fn restore(&mut self, state: &Value) -> Result<()> {
        let state = state
            .as_object()
            .ok_or_else(|| anyhow!("ERROR: pipeline state must be a mapping"))?;

        for (name, step) in &mut self.steps {
            if let Param::Estimator(estimator) = step {
                if let Some(value) = state.get(name) {
                    estimator.restore(value)?;
                }
            }
        }

        Ok(())
    }
}

#[inline(always)]
fn argmax(row: &[f64]) -> Option<usize> {
    row.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).expect("no NaN probabilities"))
        .map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extraction::HashingVectorizer;
    use crate::naive_bayes::MultinomialNB;
    use serde_json::json;

    fn toy_pipeline() -> Pipeline {
        let vectorizer = HashingVectorizer {
            n_features: 512,
            kmer_range: (4, 4),
            ..Default::default()
        };

        Pipeline::new(vec![
            (
                "vectorizer".to_string(),
                Param::Estimator(Box::new(vectorizer)),
            ),
            (
                "classifier".to_string(),
                Param::Estimator(Box::new(MultinomialNB::new(0.1, false))),
            ),
        ])
    }

    fn toy_training() -> (Dataset, Vec<String>) {
        let reads = vec![
            b"AAACCCAAACCCAAACCC".to_vec(),
            b"CCCAAACCCAAACCCAAA".to_vec(),
            b"AGAGAGAGAGAGAGAGAG".to_vec(),
            b"GAGAGAGAGAGAGAGAGA".to_vec(),
        ];
        let labels = vec![
            "bug_a".to_string(),
            "bug_a".to_string(),
            "bug_b".to_string(),
            "bug_b".to_string(),
        ];

        (Dataset::Reads(reads), labels)
    }

    #[test]
    fn test_fit_then_predict() {
        let mut pipeline = toy_pipeline();
        let (data, labels) = toy_training();
        pipeline.fit(&data, &labels).unwrap();

        let predictions = pipeline.predict(&data).unwrap();
        assert_eq!(predictions, labels);
    }

    #[test]
    fn test_get_params_flattens_steps() {
        let params = toy_pipeline().get_params();

        assert!(matches!(params["vectorizer"], Param::Estimator(_)));
        assert!(params.contains_key("vectorizer__n_features"));
        assert!(params.contains_key("classifier__alpha"));
    }

    #[test]
    fn test_set_param_routing() {
        let mut pipeline = toy_pipeline();
        pipeline
            .set_param("classifier__alpha", Param::Value(json!(0.7)))
            .unwrap();

        let params = pipeline.get_params();
        assert_eq!(
            params["classifier__alpha"].as_value().unwrap().as_f64(),
            Some(0.7)
        );

        assert!(pipeline
            .set_param("missing__alpha", Param::Value(json!(1)))
            .is_err());
    }

    #[test]
    fn test_state_roundtrip_preserves_predictions() {
        let mut pipeline = toy_pipeline();
        let (data, labels) = toy_training();
        pipeline.fit(&data, &labels).unwrap();

        let mut restored = toy_pipeline();
        restored.restore(&pipeline.state().unwrap()).unwrap();

        assert_eq!(
            pipeline.predict(&data).unwrap(),
            restored.predict(&data).unwrap()
        );
    }

    #[test]
    fn test_value_steps_are_passthrough() {
        let mut pipeline = toy_pipeline();
        pipeline
            .steps
            .insert(0, ("placeholder".to_string(), Param::Value(Value::Null)));

        let (data, labels) = toy_training();
        pipeline.fit(&data, &labels).unwrap();
        assert_eq!(pipeline.predict(&data).unwrap(), labels);
    }

    #[test]
    fn test_pipeline_without_estimators_fails() {
        let mut pipeline = Pipeline::new(vec![(
            "placeholder".to_string(),
            Param::Value(Value::Null),
        )]);
        let (data, labels) = toy_training();

        assert!(pipeline.fit(&data, &labels).is_err());
    }
}

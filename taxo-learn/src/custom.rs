//! Local extension namespace
//!
//! Estimators here resolve under the `custom` type-tag namespace. They
//! are the only place user-defined classes enter the trusted registry.

use anyhow::{bail, Result};
use serde_json::{json, Value};

use crate::naive_bayes::MultinomialNB;
use crate::traits::{param_estimator, param_f64, Estimator, Param, ParamMap};
use crate::types::Dataset;

pub const TEMPERATURE_SCALED_CLASSIFIER: &str = "custom.TemperatureScaledClassifier";

/// temperature calibration wrapper around a nested classifier
///
/// Rescales the wrapped classifier's probabilities as `p^(1/T)` and
/// renormalizes: `T > 1` flattens overconfident estimates, `T < 1`
/// sharpens them. The nested estimator parameter is what exercises the
/// codec's recursive node encoding and `estimator__*` routing.
#[derive(Clone)]
pub struct TemperatureScaledClassifier {
    pub estimator: Box<dyn Estimator>,
    pub temperature: f64,
}

impl Default for TemperatureScaledClassifier {
    fn default() -> Self {
        Self {
            estimator: Box::new(MultinomialNB::default()),
            temperature: 1.0,
        }
    }
}

impl Estimator for TemperatureScaledClassifier {
    fn tag(&self) -> &'static str {
        TEMPERATURE_SCALED_CLASSIFIER
    }

    fn get_params(&self) -> ParamMap {
        let mut params = ParamMap::new();

        params.insert(
            "estimator".to_string(),
            Param::Estimator(self.estimator.clone_box()),
        );
        for (name, value) in self.estimator.get_params() {
            params.insert(format!("estimator__{}", name), value);
        }
        params.insert(
            "temperature".to_string(),
            Param::Value(json!(self.temperature)),
        );

        params
    }

    fn set_param(&mut self, name: &str, value: Param) -> Result<()> {
        if let Some((head, tail)) = name.split_once("__") {
            if head == "estimator" {
                return self.estimator.set_param(tail, value);
            }
            bail!("ERROR: unknown parameter '{}' for {}", name, self.tag());
        }

        match name {
            "estimator" => self.estimator = param_estimator(value, name)?,
            "temperature" => self.temperature = param_f64(&value, name)?,
            _ => bail!("ERROR: unknown parameter '{}' for {}", name, self.tag()),
        }

        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }

    fn fit(&mut self, data: &Dataset, labels: &[String]) -> Result<()> {
        if self.temperature <= 0.0 {
            bail!("ERROR: temperature must be positive, got {}", self.temperature);
        }

        self.estimator.fit(data, labels)
    }

    fn predict_proba(&self, data: &Dataset) -> Result<Vec<Vec<f64>>> {
        let proba = self.estimator.predict_proba(data)?;
        let inverse = 1.0 / self.temperature;

        Ok(proba
            .into_iter()
            .map(|row| {
                let scaled = row.iter().map(|p| p.powf(inverse)).collect::<Vec<f64>>();
                let total: f64 = scaled.iter().sum();
                scaled.iter().map(|p| p / total).collect()
            })
            .collect())
    }

    fn classes(&self) -> Option<&[String]> {
        self.estimator.classes()
    }

    fn state(&self) -> Result<Value> {
        self.estimator.state()
    }

    fn restore(&mut self, state: &Value) -> Result<()> {
        self.estimator.restore(state)
    }
}

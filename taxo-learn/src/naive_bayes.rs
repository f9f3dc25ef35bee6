//! Multinomial naive Bayes over sparse k-mer counts

use anyhow::{bail, Result};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::traits::{param_bool, param_f64, Estimator, Param, ParamMap};
use crate::types::{Dataset, FeatureMatrix};

pub const MULTINOMIAL_NB: &str = "naive_bayes.MultinomialNB";

#[derive(Debug, Clone)]
pub struct MultinomialNB {
    pub alpha: f64,
    pub fit_prior: bool,
    model: Option<NbModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NbModel {
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl Default for MultinomialNB {
    fn default() -> Self {
        Self::new(0.001, false)
    }
}

impl MultinomialNB {
    pub fn new(alpha: f64, fit_prior: bool) -> Self {
        Self {
            alpha,
            fit_prior,
            model: None,
        }
    }

    fn fitted(&self) -> Result<&NbModel> {
        match &self.model {
            Some(model) => Ok(model),
            None => bail!("ERROR: {} has not been fitted", MULTINOMIAL_NB),
        }
    }
}

impl Estimator for MultinomialNB {
    fn tag(&self) -> &'static str {
        MULTINOMIAL_NB
    }

    fn get_params(&self) -> ParamMap {
        let mut params = ParamMap::new();

        params.insert("alpha".to_string(), Param::Value(json!(self.alpha)));
        params.insert("fit_prior".to_string(), Param::Value(json!(self.fit_prior)));

        params
    }

    fn set_param(&mut self, name: &str, value: Param) -> Result<()> {
        match name {
            "alpha" => self.alpha = param_f64(&value, name)?,
            "fit_prior" => self.fit_prior = param_bool(&value, name)?,
            _ => bail!("ERROR: unknown parameter '{}' for {}", name, self.tag()),
        }

        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }

    fn fit(&mut self, data: &Dataset, labels: &[String]) -> Result<()> {
        let matrix = match data {
            Dataset::Features(matrix) => matrix,
            Dataset::Reads(_) => {
                bail!("ERROR: {} expects a feature matrix, got raw reads", self.tag())
            }
        };

        if matrix.len() != labels.len() {
            bail!(
                "ERROR: {} rows but {} labels",
                matrix.len(),
                labels.len()
            );
        }
        if matrix.is_empty() {
            bail!("ERROR: cannot fit {} on an empty matrix", self.tag());
        }

        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let class_index = classes
            .iter()
            .enumerate()
            .map(|(idx, class)| (class.as_str(), idx))
            .collect::<HashMap<&str, usize>>();

        let n_classes = classes.len();
        let width = matrix.width;

        let mut feature_counts = vec![vec![0.0f64; width]; n_classes];
        let mut class_counts = vec![0.0f64; n_classes];

        for (row, label) in matrix.rows.iter().zip(labels.iter()) {
            let class = class_index[label.as_str()];
            class_counts[class] += 1.0;
            for (column, weight) in row {
                feature_counts[class][*column as usize] += *weight as f64;
            }
        }

        let feature_log_prob = feature_counts
            .iter()
            .map(|counts| {
                let total: f64 = counts.iter().sum::<f64>() + self.alpha * width as f64;
                counts
                    .iter()
                    .map(|count| ((count + self.alpha) / total).ln())
                    .collect::<Vec<f64>>()
            })
            .collect::<Vec<Vec<f64>>>();

        let n = labels.len() as f64;
        let class_log_prior = if self.fit_prior {
            class_counts.iter().map(|count| (count / n).ln()).collect()
        } else {
            vec![-(n_classes as f64).ln(); n_classes]
        };

        drop(class_index);

        self.model = Some(NbModel {
            classes,
            class_log_prior,
            feature_log_prob,
        });

        Ok(())
    }

    fn predict_proba(&self, data: &Dataset) -> Result<Vec<Vec<f64>>> {
        let matrix = match data {
            Dataset::Features(matrix) => matrix,
            Dataset::Reads(_) => {
                bail!("ERROR: {} expects a feature matrix, got raw reads", self.tag())
            }
        };
        let model = self.fitted()?;

        Ok(matrix
            .rows
            .iter()
            .map(|row| joint_log_likelihood(model, row))
            .map(|jll| softmax(&jll))
            .collect())
    }

    fn classes(&self) -> Option<&[String]> {
        self.model.as_ref().map(|model| model.classes.as_slice())
    }

    fn state(&self) -> Result<Value> {
        match &self.model {
            Some(model) => Ok(serde_json::to_value(model)?),
            None => Ok(Value::Null),
        }
    }

    fn restore(&mut self, state: &Value) -> Result<()> {
        if !state.is_null() {
            self.model = Some(serde_json::from_value(state.clone())?);
        }

        Ok(())
    }
}

fn joint_log_likelihood(model: &NbModel, row: &[(u32, f32)]) -> Vec<f64> {
    model
        .class_log_prior
        .iter()
        .zip(model.feature_log_prob.iter())
        .map(|(prior, log_prob)| {
            let likelihood: f64 = row
                .iter()
                .map(|(column, weight)| *weight as f64 * log_prob[*column as usize])
                .sum();
            prior + likelihood
        })
        .collect()
}

fn softmax(jll: &[f64]) -> Vec<f64> {
    let max = jll.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp = jll.iter().map(|v| (v - max).exp()).collect::<Vec<f64>>();
    let total: f64 = exp.iter().sum();

    exp.iter().map(|v| v / total).collect()
}

use anyhow::{anyhow, bail, Result};
use serde_json::Value;

use std::collections::BTreeMap;

use crate::types::Dataset;

/// a single introspected parameter value
///
/// `Opaque` covers runtime-only values that cannot be represented as
/// JSON; the spec codec drops them silently during encoding.
pub enum Param {
    Value(Value),
    Estimator(Box<dyn Estimator>),
    Opaque,
}

/// flat parameter mapping, `__`-separated names for nested estimators
pub type ParamMap = BTreeMap<String, Param>;

impl Param {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Param::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl Clone for Param {
    fn clone(&self) -> Self {
        match self {
            Param::Value(value) => Param::Value(value.clone()),
            Param::Estimator(estimator) => Param::Estimator(estimator.clone_box()),
            Param::Opaque => Param::Opaque,
        }
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Param::Value(value) => write!(f, "{}", value),
            Param::Estimator(estimator) => write!(f, "<{}>", estimator.tag()),
            Param::Opaque => write!(f, "<opaque>"),
        }
    }
}

/// the estimator contract the whole system orchestrates
pub trait Estimator: Send + Sync {
    /// type tag of the form `<namespace>.<ClassName>`
    fn tag(&self) -> &'static str;

    /// current parameters as a flat name -> value mapping
    fn get_params(&self) -> ParamMap;

    /// keyword construction and override application; names containing
    /// `__` are routed into the nested estimator they address
    fn set_param(&mut self, name: &str, value: Param) -> Result<()>;

    fn clone_box(&self) -> Box<dyn Estimator>;

    fn fit(&mut self, data: &Dataset, labels: &[String]) -> Result<()>;

    fn transform(&self, _data: &Dataset) -> Result<Dataset> {
        bail!("ERROR: {} does not support transform", self.tag())
    }

    fn predict_proba(&self, _data: &Dataset) -> Result<Vec<Vec<f64>>> {
        bail!("ERROR: {} does not support predict_proba", self.tag())
    }

    /// class labels in the column order of `predict_proba`
    fn classes(&self) -> Option<&[String]> {
        None
    }

    /// JSON snapshot of the fitted state; `Null` for stateless estimators
    fn state(&self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn restore(&mut self, _state: &Value) -> Result<()> {
        Ok(())
    }
}

impl Clone for Box<dyn Estimator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl std::fmt::Debug for dyn Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:?}", self.tag(), self.get_params())
    }
}

// typed extraction helpers for set_param implementations

pub fn param_i64(value: &Param, name: &str) -> Result<i64> {
    value
        .as_value()
        .and_then(|v| v.as_i64())
        .ok_or_else(|| anyhow!("ERROR: invalid value for parameter '{}'", name))
}

pub fn param_f64(value: &Param, name: &str) -> Result<f64> {
    value
        .as_value()
        .and_then(|v| v.as_f64())
        .ok_or_else(|| anyhow!("ERROR: invalid value for parameter '{}'", name))
}

pub fn param_bool(value: &Param, name: &str) -> Result<bool> {
    value
        .as_value()
        .and_then(|v| v.as_bool())
        .ok_or_else(|| anyhow!("ERROR: invalid value for parameter '{}'", name))
}

pub fn param_string(value: &Param, name: &str) -> Result<String> {
    value
        .as_value()
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("ERROR: invalid value for parameter '{}'", name))
}

/// two-element integer array, e.g. a k-mer size range
pub fn param_i64_pair(value: &Param, name: &str) -> Result<(i64, i64)> {
    let err = || anyhow!("ERROR: invalid value for parameter '{}'", name);

    let array = value.as_value().and_then(|v| v.as_array()).ok_or_else(err)?;
    if array.len() != 2 {
        return Err(err());
    }

    let lo = array[0].as_i64().ok_or_else(err)?;
    let hi = array[1].as_i64().ok_or_else(err)?;

    Ok((lo, hi))
}

pub fn param_estimator(value: Param, name: &str) -> Result<Box<dyn Estimator>> {
    match value {
        Param::Estimator(estimator) => Ok(estimator),
        _ => bail!("ERROR: parameter '{}' expects an estimator", name),
    }
}

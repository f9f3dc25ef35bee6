//! The JSON-safe specification tree

use serde_json::{Map, Value};

use crate::SpecError;

/// reserved key identifying which class a node reconstructs into
pub const TYPE_TAG_KEY: &str = "__type__";

/// a step or parameter value: either a plain JSON value or a tagged
/// estimator node
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSpec {
    Value(Value),
    Node(NodeSpec),
}

/// a serialized estimator: its type tag plus its encoded parameters
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub tag: String,
    pub params: std::collections::BTreeMap<String, ParamSpec>,
}

/// an ordered list of named steps; the serialized form of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSpec {
    pub steps: Vec<(String, ParamSpec)>,
}

impl ParamSpec {
    pub fn to_value(&self) -> Value {
        match self {
            ParamSpec::Value(value) => value.clone(),
            ParamSpec::Node(node) => node.to_value(),
        }
    }

    /// mappings holding the reserved tag key become nodes; everything
    /// else is kept verbatim as a plain value
    pub fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::Object(map) if map.contains_key(TYPE_TAG_KEY) => {
                Ok(ParamSpec::Node(NodeSpec::from_map(map)?))
            }
            other => Ok(ParamSpec::Value(other.clone())),
        }
    }
}

impl NodeSpec {
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();

        for (name, param) in &self.params {
            map.insert(name.clone(), param.to_value());
        }
        map.insert(TYPE_TAG_KEY.to_string(), Value::String(self.tag.clone()));

        Value::Object(map)
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, SpecError> {
        let tag = map
            .get(TYPE_TAG_KEY)
            .and_then(|tag| tag.as_str())
            .ok_or_else(|| SpecError::Malformed("type tag must be a string".to_string()))?
            .to_string();

        let mut params = std::collections::BTreeMap::new();
        for (name, value) in map {
            if name == TYPE_TAG_KEY {
                continue;
            }
            params.insert(name.clone(), ParamSpec::from_value(value)?);
        }

        Ok(NodeSpec { tag, params })
    }
}

impl PipelineSpec {
    /// JSON form: an array of `[name, value]` pairs
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.steps
                .iter()
                .map(|(name, param)| {
                    Value::Array(vec![Value::String(name.clone()), param.to_value()])
                })
                .collect(),
        )
    }

    pub fn from_value(value: &Value) -> Result<Self, SpecError> {
        let steps = value
            .as_array()
            .ok_or_else(|| SpecError::Malformed("expected an array of steps".to_string()))?;

        let mut parsed = Vec::with_capacity(steps.len());
        for step in steps {
            let pair = step.as_array().filter(|pair| pair.len() == 2).ok_or_else(|| {
                SpecError::Malformed("each step must be a [name, value] pair".to_string())
            })?;
            let name = pair[0]
                .as_str()
                .ok_or_else(|| SpecError::Malformed("step name must be a string".to_string()))?;

            parsed.push((name.to_string(), ParamSpec::from_value(&pair[1])?));
        }

        Ok(PipelineSpec { steps: parsed })
    }

    /// parse a specification from untrusted JSON text
    pub fn from_str(text: &str) -> Result<Self, SpecError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| SpecError::Malformed(e.to_string()))?;

        Self::from_value(&value)
    }

    pub fn to_string_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.to_value()).expect("spec trees are valid JSON")
    }
}

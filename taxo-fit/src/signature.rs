//! Typed parameter signatures derived from pipeline specifications
//!
//! Every built-in specification exposes its tunable surface as a flat
//! list of `step__param` names with a kind and a default, so the CLI can
//! parse overrides with the right type instead of guessing. Integer,
//! float, boolean and string defaults keep their native form; other
//! values (arrays, mappings) are carried as a string holding the JSON
//! encoding of the default.

use anyhow::Result;
use serde_json::Value;

use taxo_learn::Param;
use taxo_spec::{pipeline_from_spec, PipelineSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
    Bool,
    Str,
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            ParamKind::Int => "int",
            ParamKind::Float => "float",
            ParamKind::Bool => "bool",
            ParamKind::Str => "str",
        };
        write!(f, "{}", kind)
    }
}

/// one overridable parameter of a built-in classifier
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedParam {
    pub name: String,
    pub kind: ParamKind,
    pub default: Value,
}

/// derive the flat, typed parameter list of a specification
///
/// The specification is instantiated once and its parameter map walked;
/// estimator-valued entries are structural (they are overridden through
/// their own `__`-prefixed leaves) and do not appear in the signature.
pub fn pipeline_signature(spec: &PipelineSpec) -> Result<Vec<DerivedParam>> {
    let pipeline = pipeline_from_spec(spec)?;

    let mut params = Vec::new();
    for (name, param) in pipeline.get_params() {
        let value = match param {
            Param::Value(value) => value,
            _ => continue,
        };

        let (kind, default) = match &value {
            Value::Bool(_) => (ParamKind::Bool, value),
            Value::Number(n) if n.is_i64() => (ParamKind::Int, value),
            Value::Number(_) => (ParamKind::Float, value),
            Value::String(_) => (ParamKind::Str, value),
            other => (
                ParamKind::Str,
                Value::String(serde_json::to_string(other)?),
            ),
        };

        params.push(DerivedParam {
            name,
            kind,
            default,
        });
    }

    Ok(params)
}

/// parse one override value according to its derived kind
///
/// String-kind values are decoded as JSON on a best-effort basis; input
/// that is not valid JSON is kept as a plain string.
pub fn decode_override(kind: ParamKind, raw: &str) -> Result<Value> {
    let value = match kind {
        ParamKind::Int => Value::from(raw.parse::<i64>()?),
        ParamKind::Float => Value::from(raw.parse::<f64>()?),
        ParamKind::Bool => Value::from(raw.parse::<bool>()?),
        ParamKind::Str => serde_json::from_str(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taxo_spec::builtin_specs;

    fn naive_bayes_signature() -> Vec<DerivedParam> {
        let (_, spec) = builtin_specs().remove(0);
        pipeline_signature(&spec).unwrap()
    }

    fn find<'a>(params: &'a [DerivedParam], name: &str) -> &'a DerivedParam {
        params
            .iter()
            .find(|param| param.name == name)
            .unwrap_or_else(|| panic!("no parameter '{}'", name))
    }

    #[test]
    fn test_signature_kinds_and_defaults() {
        let params = naive_bayes_signature();

        let alpha = find(&params, "classifier__alpha");
        assert_eq!(alpha.kind, ParamKind::Float);
        assert_eq!(alpha.default, json!(0.001));

        let n_features = find(&params, "vectorizer__n_features");
        assert_eq!(n_features.kind, ParamKind::Int);
        assert_eq!(n_features.default, json!(8192));

        let binary = find(&params, "vectorizer__binary");
        assert_eq!(binary.kind, ParamKind::Bool);
        assert_eq!(binary.default, json!(false));

        // plain string defaults stay native, they are never re-encoded
        let analyzer = find(&params, "vectorizer__analyzer");
        assert_eq!(analyzer.kind, ParamKind::Str);
        assert_eq!(analyzer.default, json!("kmer"));

        // non-primitive defaults are carried as their JSON encoding
        let kmer_range = find(&params, "vectorizer__kmer_range");
        assert_eq!(kmer_range.kind, ParamKind::Str);
        assert_eq!(kmer_range.default, json!("[7,7]"));
    }

    #[test]
    fn test_signature_skips_estimator_entries() {
        let (_, spec) = builtin_specs()
            .into_iter()
            .find(|(name, _)| *name == "temperature_scaled_nb")
            .unwrap();
        let params = pipeline_signature(&spec).unwrap();

        assert!(params.iter().all(|param| param.name != "classifier"));
        assert!(params
            .iter()
            .all(|param| param.name != "classifier__estimator"));
        assert!(params
            .iter()
            .any(|param| param.name == "classifier__estimator__alpha"));
        assert!(params
            .iter()
            .any(|param| param.name == "classifier__temperature"));
    }

    #[test]
    fn test_decode_override_typed() {
        assert_eq!(decode_override(ParamKind::Int, "42").unwrap(), json!(42));
        assert_eq!(
            decode_override(ParamKind::Float, "0.5").unwrap(),
            json!(0.5)
        );
        assert_eq!(
            decode_override(ParamKind::Bool, "true").unwrap(),
            json!(true)
        );
        assert!(decode_override(ParamKind::Int, "not-a-number").is_err());
    }

    #[test]
    fn test_decode_override_string_falls_back() {
        assert_eq!(
            decode_override(ParamKind::Str, "[6,8]").unwrap(),
            json!([6, 8])
        );
        assert_eq!(
            decode_override(ParamKind::Str, "kmer").unwrap(),
            json!("kmer")
        );
    }
}

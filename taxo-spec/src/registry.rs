//! The class resolver: a closed registry of trusted constructors
//!
//! Resolution is a table lookup, never an import by name. The table is
//! built once and enumerates exactly the trusted namespaces: the
//! estimator library's public modules plus the local `custom` extension
//! module. Every failure mode returns the same error so that probing a
//! tag reveals nothing about which check rejected it.

use hashbrown::HashMap;
use lazy_static::lazy_static;

use taxo_learn::custom::{TemperatureScaledClassifier, TEMPERATURE_SCALED_CLASSIFIER};
use taxo_learn::feature_extraction::{HashingVectorizer, HASHING_VECTORIZER};
use taxo_learn::naive_bayes::{MultinomialNB, MULTINOMIAL_NB};
use taxo_learn::Estimator;

use crate::SpecError;

type Factory = fn() -> Box<dyn Estimator>;

fn hashing_vectorizer() -> Box<dyn Estimator> {
    Box::new(HashingVectorizer::default())
}

fn multinomial_nb() -> Box<dyn Estimator> {
    Box::new(MultinomialNB::default())
}

fn temperature_scaled_classifier() -> Box<dyn Estimator> {
    Box::new(TemperatureScaledClassifier::default())
}

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, Factory> = {
        let mut registry: HashMap<&'static str, Factory> = HashMap::new();

        // feature_extraction
        registry.insert(HASHING_VECTORIZER, hashing_vectorizer);
        // naive_bayes
        registry.insert(MULTINOMIAL_NB, multinomial_nb);
        // custom
        registry.insert(TEMPERATURE_SCALED_CLASSIFIER, temperature_scaled_classifier);

        registry
    };
}

/// resolve a type tag to a default-constructed estimator
pub fn resolve(tag: &str) -> Result<Box<dyn Estimator>, SpecError> {
    if !tag.contains('.') {
        return Err(SpecError::UnrecognisedClass(tag.to_string()));
    }

    match REGISTRY.get(tag) {
        Some(factory) => Ok(factory()),
        None => Err(SpecError::UnrecognisedClass(tag.to_string())),
    }
}

/// every tag the registry accepts, sorted
pub fn recognised_tags() -> Vec<&'static str> {
    let mut tags = REGISTRY.keys().copied().collect::<Vec<_>>();
    tags.sort_unstable();

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_trusted_tags() {
        for tag in recognised_tags() {
            let estimator = resolve(tag).unwrap();
            assert_eq!(estimator.tag(), tag);
        }
    }

    #[test]
    fn test_rejections_are_uniform() {
        let bad_tags = [
            "Pipeline",                       // no namespace separator
            "os.System",                      // untrusted namespace
            "naive_bayes.NoSuchClass",        // unknown class
            "feature_extraction.MultinomialNB", // class in the wrong namespace
            "custom.NotReal",
            "",
        ];

        for tag in bad_tags {
            let err = resolve(tag).unwrap_err();
            assert_eq!(err.to_string(), format!("{} is not a recognised class", tag));
        }
    }
}

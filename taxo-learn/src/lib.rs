//! Estimator library for taxotools
//!
//! Every estimator exposes the same small contract: flat parameter
//! introspection (double-underscore-separated names for nested
//! estimators), keyword construction through `set_param`, fit/transform/
//! predict-proba over a `Dataset`, and a JSON snapshot of its fitted
//! state. The spec codec and the orchestrators only ever talk to this
//! contract, never to concrete types.
//!
//! The trusted namespaces are the public modules of this crate
//! (`feature_extraction`, `naive_bayes`) plus `custom` for local
//! extensions; an estimator's type tag is `<module>.<ClassName>`.

pub mod custom;
pub mod feature_extraction;
pub mod naive_bayes;
pub mod pipeline;
pub mod traits;
pub mod types;

pub use pipeline::Pipeline;
pub use traits::{Estimator, Param, ParamMap};
pub use types::{Dataset, FeatureMatrix};

/// version tag stamped on every fitted artifact
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

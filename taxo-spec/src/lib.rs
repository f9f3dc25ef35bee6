//! Pipeline specifications for taxotools
//!
//! A classifier pipeline round-trips between its live object graph and a
//! restricted, human-inspectable JSON tree: an ordered list of named
//! steps where every estimator node carries a `__type__` tag naming the
//! class it reconstructs into. Reconstruction never imports anything by
//! name; tags resolve through a closed registry of trusted factories,
//! which is the system's only code-construction surface.

use thiserror::Error;

pub mod artifact;
pub mod catalog;
pub mod codec;
pub mod registry;
pub mod spec;

pub use artifact::{CompatibilityNotice, FittedClassifier};
pub use catalog::builtin_specs;
pub use codec::{pipeline_from_spec, spec_from_pipeline};
pub use registry::{recognised_tags, resolve};
pub use spec::{NodeSpec, ParamSpec, PipelineSpec, TYPE_TAG_KEY};

#[derive(Debug, Error)]
pub enum SpecError {
    /// deliberately uniform: resolution failures never reveal which
    /// check rejected the tag
    #[error("{0} is not a recognised class")]
    UnrecognisedClass(String),
    #[error("malformed pipeline specification: {0}")]
    Malformed(String),
}

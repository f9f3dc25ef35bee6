//! Core module for fitting taxonomic classifiers
//!
//! Two ways to fit: a generic path that takes any pipeline specification,
//! and a catalog path that fits one of the built-in specifications with
//! typed parameter overrides. Both produce the same artifact: the fitted
//! pipeline frozen together with the estimator-library version that
//! produced it. A classifier fitted through a catalog entry with default
//! parameters is indistinguishable from one fitted generically from the
//! same specification.

use anyhow::Result;
use std::path::PathBuf;

pub mod cli;
pub mod core;
pub mod registration;
pub mod signature;

pub fn lib_taxo_fit(args: Vec<String>) -> Result<PathBuf> {
    let args = cli::Args::from(args);
    let artifact = core::fit(args);

    return artifact;
}

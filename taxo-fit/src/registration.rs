//! Declarative fit-operation registrations
//!
//! One registration per catalog entry, built as plain data: the entry
//! name, the operation it registers, the derived parameter signature and
//! the underlying specification. The CLI walks this table; nothing is
//! synthesized at run time beyond what is written here.

use anyhow::Result;

use taxo_spec::{builtin_specs, PipelineSpec};

use crate::signature::{pipeline_signature, DerivedParam};

/// a pre-configured fit operation for one built-in specification
#[derive(Debug, Clone)]
pub struct FitterRegistration {
    pub name: &'static str,
    pub operation: String,
    pub params: Vec<DerivedParam>,
    pub spec: PipelineSpec,
}

/// registrations for every catalog entry
pub fn catalog_registrations() -> Result<Vec<FitterRegistration>> {
    builtin_specs()
        .into_iter()
        .map(|(name, spec)| {
            let params = pipeline_signature(&spec)?;
            Ok(FitterRegistration {
                name,
                operation: format!("fit-classifier-{}", name.replace('_', "-")),
                params,
                spec,
            })
        })
        .collect()
}

/// look a registration up by its catalog name
pub fn find_registration(name: &str) -> Result<FitterRegistration> {
    let registrations = catalog_registrations()?;
    let known = registrations
        .iter()
        .map(|registration| registration.name)
        .collect::<Vec<&str>>()
        .join(", ");

    registrations
        .into_iter()
        .find(|registration| registration.name == name)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "ERROR: unknown catalog classifier '{}', expected one of: {}",
                name,
                known
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_catalog_entry_registers() {
        let registrations = catalog_registrations().unwrap();

        assert!(!registrations.is_empty());
        for registration in &registrations {
            assert!(registration.operation.starts_with("fit-classifier-"));
            assert!(!registration.params.is_empty());
        }
    }

    #[test]
    fn test_operation_names_are_unique() {
        let registrations = catalog_registrations().unwrap();
        let mut operations = registrations
            .iter()
            .map(|registration| registration.operation.clone())
            .collect::<Vec<String>>();
        operations.sort_unstable();
        operations.dedup();

        assert_eq!(operations.len(), registrations.len());
    }

    #[test]
    fn test_find_unknown_registration_fails() {
        let err = find_registration("no_such_classifier").unwrap_err();
        assert!(err.to_string().contains("unknown catalog classifier"));
        assert!(err.to_string().contains("naive_bayes"));
    }
}

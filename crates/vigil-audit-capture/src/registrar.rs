//! Declares the audit activity taxonomy with the external registry.

use crate::collaborators::TaxonomyRegistry;
use crate::error::RegistrationError;
use tracing::debug;
use vigil_audit_types::{ActionType, ActivityTaxonomy, SaveType};

/// Build the taxonomy from every save type except the no-op one.
pub fn build_taxonomy(name: &str) -> Result<ActivityTaxonomy, RegistrationError> {
    let actions = SaveType::auditable().map(ActionType::from);
    Ok(ActivityTaxonomy::new(name, actions)?)
}

/// Upsert `taxonomy` into `registry`.
///
/// The no-op code is stripped even if the caller's taxonomy carries it, so it
/// never reaches the registry. Safe to call on every startup.
pub fn register(
    registry: Option<&dyn TaxonomyRegistry>,
    taxonomy: &ActivityTaxonomy,
) -> Result<(), RegistrationError> {
    let registry = registry.ok_or(RegistrationError::RegistryMissing)?;

    let none_code = SaveType::None.code();
    let actions: Vec<ActionType> = taxonomy
        .actions()
        .iter()
        .filter(|action| action.code != none_code)
        .cloned()
        .collect();

    registry.register(taxonomy.name(), &actions)?;
    debug!(
        taxonomy = %taxonomy.name(),
        actions = actions.len(),
        "audit taxonomy registered"
    );
    Ok(())
}

/// Holds the taxonomy built once at startup.
#[derive(Debug, Clone)]
pub struct TaxonomyRegistrar {
    taxonomy: ActivityTaxonomy,
}

impl TaxonomyRegistrar {
    /// Registrar for the save-type taxonomy named `activity_type`.
    pub fn new(activity_type: &str) -> Result<Self, RegistrationError> {
        Ok(Self {
            taxonomy: build_taxonomy(activity_type)?,
        })
    }

    pub fn taxonomy(&self) -> &ActivityTaxonomy {
        &self.taxonomy
    }

    pub fn register(&self, registry: &dyn TaxonomyRegistry) -> Result<(), RegistrationError> {
        register(Some(registry), &self.taxonomy)
    }
}

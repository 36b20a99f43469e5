use crate::app_error::AppError;
use crate::environments::{Environment, Environments};
use crate::store::ParameterStore;

/// Maps an environment to its registered prompt identifier through one
/// indirection record in the parameter store.
pub struct ParameterResolver<'a> {
    store: &'a dyn ParameterStore,
    environments: &'a Environments,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(store: &'a dyn ParameterStore, environments: &'a Environments) -> Self {
        Self {
            store,
            environments,
        }
    }

    // Missing record, access denied, and transient faults are all reported
    // identically; the failure is fatal to the calling operation only.
    pub async fn resolve(&self, environment: Environment) -> Result<String, AppError> {
        let path = &self.environments.get(environment).parameter_path;
        self.store.get_parameter(path).await.map_err(|e| {
            AppError::Resolution(format!(
                "could not resolve prompt id for {} via {path}: {e}",
                environment.name()
            ))
        })
    }
}

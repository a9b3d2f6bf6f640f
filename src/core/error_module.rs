use crate::core::contracts::BoxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("ModuleError: Cant construct module '{module}' error '{cause}'")]
    Construction {
        module: String,
        #[source]
        cause: BoxError,
    },

    #[error("ModuleError: Migration failed for module '{module}' error '{cause}'")]
    Migration {
        module: String,
        #[source]
        cause: BoxError,
    },

    #[error("ModuleError: Cant mount routes of module '{module}' error '{cause}'")]
    RouteMount {
        module: String,
        #[source]
        cause: BoxError,
    },
}

impl ModuleError {
    pub fn module(&self) -> &str {
        match self {
            ModuleError::Construction { module, .. }
            | ModuleError::Migration { module, .. }
            | ModuleError::RouteMount { module, .. } => module,
        }
    }

    /// Lifecycle stage the module failed in.
    pub fn stage(&self) -> &'static str {
        match self {
            ModuleError::Construction { .. } => "construct",
            ModuleError::Migration { .. } => "migrate",
            ModuleError::RouteMount { .. } => "routes",
        }
    }

    pub fn cause(&self) -> &BoxError {
        match self {
            ModuleError::Construction { cause, .. }
            | ModuleError::Migration { cause, .. }
            | ModuleError::RouteMount { cause, .. } => cause,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("StartupError: Step '{step}' failed: {cause}")]
    Step {
        step: String,
        #[source]
        cause: BoxError,
    },

    #[error("StartupError: Core modules failed to initialize: '{0}'")]
    CoreModulesFailed(String),
}

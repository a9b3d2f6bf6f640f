pub mod core;

#[cfg(all(feature = "sea-orm-postgres", feature = "sea-orm-mysql"))]
compile_error!(
    "Cannot enable both 'sea-orm-postgres' and 'sea-orm-mysql' features simultaneously. Please choose one."
);

pub use crate::core::config::{Config, ConfigDto};
pub use crate::core::container::{Container, ContainerDto};
pub use crate::core::contracts::{
    BoxError, Database, Dialect, EmailMessage, EntityDescriptor, Handler, Mailer, Method, Module,
    Request, Response, Route, Router, Storage,
};
pub use crate::core::error_capability::{
    ConfigError, DatabaseError, MailError, RelationError, RouteError, StorageError,
};
pub use crate::core::error_module::{ModuleError, StartupError};
pub use crate::core::event_bus::{EmitReport, Event, EventBus, SubscriptionId};
pub use crate::core::factory::ModuleProvidesFactory;
pub use crate::core::initialization::{InitReport, Initializer, ModuleSet};
pub use crate::core::logging::{LogFacade, Logger, MemoryLogger};
pub use crate::core::orchestrator::{AUTH_PREFIX, CoreOrchestrator};
pub use crate::core::registry::{ModuleProvider, Mount, Registry};
pub use crate::core::startup::{
    ApplicationModulesStep, CoreModulesStep, Startup, StartupContext, StartupStep,
};

/// Constructs, migrates and mounts every module of `registry` on the
/// container router.
pub async fn initialize(registry: &Registry, container: &Container) -> InitReport {
    Initializer::new(container.clone())
        .initialize(registry)
        .await
}

/// Same as [`initialize`] for framework modules: authentication entry points
/// are mounted under [`AUTH_PREFIX`]. Fails only when the container router
/// cannot derive that group.
pub async fn initialize_core(
    registry: &Registry,
    container: &Container,
) -> Result<InitReport, RouteError> {
    let orchestrator = CoreOrchestrator::with_auth_prefix(container.clone(), AUTH_PREFIX)?;
    Ok(orchestrator.initialize(registry).await)
}

use crate::core::container::Container;
use crate::core::contracts::Router;
use crate::core::error_capability::RouteError;
use crate::core::initialization::{InitReport, Initializer};
use crate::core::registry::{ModuleProvider, Mount, Registry};
use std::sync::Arc;

pub const AUTH_PREFIX: &str = "/auth";

/// Initializer for framework-owned modules.
///
/// Modules registered with [`Mount::Authentication`] get their routes on the
/// authentication surface, everything else on the protected one. Both groups
/// go through a single initializer pass.
pub struct CoreOrchestrator {
    initializer: Initializer,
    protected: Arc<dyn Router>,
    authentication: Arc<dyn Router>,
}

impl CoreOrchestrator {
    pub fn new(
        container: Container,
        protected: Arc<dyn Router>,
        authentication: Arc<dyn Router>,
    ) -> Self {
        Self {
            initializer: Initializer::new(container),
            protected,
            authentication,
        }
    }

    /// Protected surface is the container router, authentication surface is
    /// derived from it under `prefix`. A prefix the router rejects is an
    /// error rather than a silent fallback to the protected surface.
    pub fn with_auth_prefix(container: Container, prefix: &str) -> Result<Self, RouteError> {
        let protected = Arc::clone(container.router());
        let authentication = protected.group(prefix)?;
        Ok(Self::new(container, protected, authentication))
    }

    pub fn protected(&self) -> &Arc<dyn Router> {
        &self.protected
    }

    pub fn authentication(&self) -> &Arc<dyn Router> {
        &self.authentication
    }

    pub async fn initialize(&self, registry: &Registry) -> InitReport {
        self.initializer
            .initialize_with(registry, |entry| match entry.mount() {
                Mount::Authentication => Arc::clone(&self.authentication),
                Mount::Protected => Arc::clone(&self.protected),
            })
            .await
    }

    pub async fn initialize_from(&self, provider: &dyn ModuleProvider) -> InitReport {
        let registry = provider.modules(self.initializer.container());
        self.initialize(&registry).await
    }
}

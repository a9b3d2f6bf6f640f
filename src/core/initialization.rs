use crate::core::container::Container;
use crate::core::contracts::{Module, Router};
use crate::core::error_module::ModuleError;
use crate::core::registry::{ModuleProvider, Registry, RegistryEntry};
use crate::core::routing::StagedRouter;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Modules that were constructed, migrated and routed, by name.
#[derive(Clone, Default)]
pub struct ModuleSet {
    modules: BTreeMap<String, Arc<dyn Module>>,
}

impl ModuleSet {
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Module>)> {
        self.modules.iter().map(|(name, module)| (name.as_str(), module))
    }

    /// Adds every module of `other`; returns names that were already present
    /// and got replaced.
    pub fn merge(&mut self, other: ModuleSet) -> Vec<String> {
        let mut replaced = Vec::new();
        for (name, module) in other.modules {
            if self.modules.insert(name.clone(), module).is_some() {
                replaced.push(name);
            }
        }
        replaced
    }

    fn insert(&mut self, name: &str, module: Arc<dyn Module>) {
        self.modules.insert(name.to_string(), module);
    }
}

impl fmt::Debug for ModuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.modules.keys()).finish()
    }
}

#[derive(Debug, Default)]
pub struct InitReport {
    pub modules: ModuleSet,
    pub errors: Vec<ModuleError>,
}

impl InitReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn failed_modules(&self) -> Vec<&str> {
        self.errors.iter().map(ModuleError::module).collect()
    }
}

/// Turns a registry into live modules.
///
/// Entries are processed one at a time in name order. A module that fails to
/// construct, migrate or mount is reported and left out; the remaining
/// entries still run. Routes are staged and committed as one batch, so a
/// skipped module leaves nothing on the surface.
pub struct Initializer {
    container: Container,
}

impl Initializer {
    pub fn new(container: Container) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub async fn initialize(&self, registry: &Registry) -> InitReport {
        let router = Arc::clone(self.container.router());
        self.initialize_with(registry, |_| Arc::clone(&router)).await
    }

    pub async fn initialize_from(&self, provider: &dyn ModuleProvider) -> InitReport {
        let registry = provider.modules(&self.container);
        self.initialize(&registry).await
    }

    pub(crate) async fn initialize_with<S>(&self, registry: &Registry, surface_for: S) -> InitReport
    where
        S: Fn(&RegistryEntry) -> Arc<dyn Router> + Sync,
    {
        let logger = self.container.logger();
        let mut report = InitReport::default();

        for (name, entry) in registry.iter() {
            let surface = surface_for(entry);
            match self.bring_up(name, entry, surface.as_ref()).await {
                Ok(module) => {
                    logger.info(
                        "module initialized",
                        &[
                            ("module", name.to_string()),
                            ("surface", surface.prefix().to_string()),
                        ],
                    );
                    report.modules.insert(name, module);
                }
                Err(err) => {
                    logger.error(
                        "module skipped",
                        &[
                            ("module", name.to_string()),
                            ("stage", err.stage().to_string()),
                            ("error", err.cause().to_string()),
                        ],
                    );
                    report.errors.push(err);
                }
            }
        }

        logger.info(
            "modules initialized",
            &[
                ("live", report.modules.len().to_string()),
                ("failed", report.errors.len().to_string()),
            ],
        );
        report
    }

    async fn bring_up(
        &self,
        name: &str,
        entry: &RegistryEntry,
        surface: &dyn Router,
    ) -> Result<Arc<dyn Module>, ModuleError> {
        let module = entry
            .construct(&self.container)
            .map_err(|cause| ModuleError::Construction {
                module: name.to_string(),
                cause,
            })?;

        module
            .migrate()
            .await
            .map_err(|cause| ModuleError::Migration {
                module: name.to_string(),
                cause,
            })?;

        let staged = StagedRouter::for_surface(surface);
        module
            .routes(&staged)
            .map_err(|cause| ModuleError::RouteMount {
                module: name.to_string(),
                cause,
            })?;
        staged
            .commit(surface)
            .map_err(|cause| ModuleError::RouteMount {
                module: name.to_string(),
                cause: Box::new(cause),
            })?;

        module.subscribe(self.container.events());
        Ok(module)
    }
}

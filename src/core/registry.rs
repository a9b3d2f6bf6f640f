use crate::core::container::Container;
use crate::core::contracts::{BoxError, Module};
use crate::core::factory::ModuleProvidesFactory;
use crate::core::logging::{LogFacade, Logger};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub type ModuleConstructor =
    Arc<dyn Fn(&Container) -> Result<Arc<dyn Module>, BoxError> + Send + Sync>;

/// Which routing surface a module is mounted on. Fixed at registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mount {
    #[default]
    Protected,
    Authentication,
}

#[derive(Clone)]
pub struct RegistryEntry {
    constructor: ModuleConstructor,
    mount: Mount,
}

impl RegistryEntry {
    pub fn mount(&self) -> Mount {
        self.mount
    }

    pub fn construct(&self, container: &Container) -> Result<Arc<dyn Module>, BoxError> {
        (self.constructor)(container)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("mount", &self.mount)
            .finish_non_exhaustive()
    }
}

/// Name to constructor catalog, iterated in lexicographic name order.
///
/// Populated once during startup. Registering a name twice replaces the
/// earlier entry and logs a warning.
#[derive(Clone)]
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
    logger: Arc<dyn Logger>,
}

impl Registry {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            entries: BTreeMap::new(),
            logger,
        }
    }

    pub fn register<F, M>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&Container) -> Result<M, BoxError> + Send + Sync + 'static,
        M: Module,
    {
        self.register_with(name, Mount::Protected, constructor)
    }

    /// Registers an authentication entry point.
    pub fn register_auth<F, M>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&Container) -> Result<M, BoxError> + Send + Sync + 'static,
        M: Module,
    {
        self.register_with(name, Mount::Authentication, constructor)
    }

    pub fn register_factory<M: ModuleProvidesFactory>(
        &mut self,
        name: impl Into<String>,
        mount: Mount,
    ) {
        self.register_with(name, mount, M::factory)
    }

    pub fn register_with<F, M>(&mut self, name: impl Into<String>, mount: Mount, constructor: F)
    where
        F: Fn(&Container) -> Result<M, BoxError> + Send + Sync + 'static,
        M: Module,
    {
        let name = name.into();
        let constructor: ModuleConstructor = Arc::new(move |container: &Container| {
            let module = constructor(container)?;
            Ok(Arc::new(module) as Arc<dyn Module>)
        });

        if self
            .entries
            .insert(name.clone(), RegistryEntry { constructor, mount })
            .is_some()
        {
            self.logger.warn(
                "module registered twice, previous constructor replaced",
                &[("module", name)],
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Names split by mount marker: `(authentication, protected)`.
    pub fn partition(&self) -> (Vec<&str>, Vec<&str>) {
        let mut authentication = Vec::new();
        let mut protected = Vec::new();
        for (name, entry) in self.iter() {
            match entry.mount {
                Mount::Authentication => authentication.push(name),
                Mount::Protected => protected.push(name),
            }
        }
        (authentication, protected)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::new(LogFacade))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Supplies the modules a host should mount.
///
/// One provider typically lists the framework modules, another the
/// application modules.
pub trait ModuleProvider: Send + Sync {
    fn modules(&self, container: &Container) -> Registry;
}

impl ModuleProvider for Registry {
    fn modules(&self, _container: &Container) -> Registry {
        self.clone()
    }
}

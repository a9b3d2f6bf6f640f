use crate::core::config::Config;
use crate::core::contracts::{Database, Mailer, Router, Storage};
use crate::core::event_bus::EventBus;
use crate::core::logging::Logger;
use std::sync::Arc;

pub struct ContainerDto {
    pub database: Arc<dyn Database>,
    pub router: Arc<dyn Router>,
    pub logger: Arc<dyn Logger>,
    pub events: Arc<EventBus>,
    pub storage: Arc<dyn Storage>,
    pub email: Option<Arc<dyn Mailer>>,
    pub config: Config,
}

/// Read-only bundle of capabilities handed to every module constructor.
///
/// Built once during startup. Cloning shares the same handles.
#[derive(Clone)]
pub struct Container {
    database: Arc<dyn Database>,
    router: Arc<dyn Router>,
    logger: Arc<dyn Logger>,
    events: Arc<EventBus>,
    storage: Arc<dyn Storage>,
    email: Option<Arc<dyn Mailer>>,
    config: Arc<Config>,
}

impl Container {
    pub fn new(dto: ContainerDto) -> Self {
        Self {
            database: dto.database,
            router: dto.router,
            logger: dto.logger,
            events: dto.events,
            storage: dto.storage,
            email: dto.email,
            config: Arc::new(dto.config),
        }
    }

    pub fn database(&self) -> &Arc<dyn Database> {
        &self.database
    }

    pub fn router(&self) -> &Arc<dyn Router> {
        &self.router
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// `None` when no mail transport is configured.
    pub fn email(&self) -> Option<&Arc<dyn Mailer>> {
        self.email.as_ref()
    }

    pub fn has_email(&self) -> bool {
        self.email.is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::features::memory::{MemoryDatabase, MemoryStorage, RouteTable};
    use crate::core::logging::MemoryLogger;

    pub(crate) struct Fixture {
        pub container: Container,
        pub routes: RouteTable,
        pub database: Arc<MemoryDatabase>,
        pub logger: Arc<MemoryLogger>,
    }

    pub(crate) fn fixture() -> Fixture {
        let routes = RouteTable::new();
        let database = Arc::new(MemoryDatabase::new());
        let logger = Arc::new(MemoryLogger::new());
        let container = Container::new(ContainerDto {
            database: database.clone(),
            router: Arc::new(routes.clone()),
            logger: logger.clone(),
            events: Arc::new(EventBus::new(logger.clone())),
            storage: Arc::new(MemoryStorage::new()),
            email: None,
            config: Config::default(),
        });
        Fixture {
            container,
            routes,
            database,
            logger,
        }
    }
}

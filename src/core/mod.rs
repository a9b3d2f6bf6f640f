pub mod config;
pub mod container;
pub mod contracts;
pub mod error_capability;
pub mod error_module;
pub mod event_bus;
pub mod factory;
pub mod features;
pub mod initialization;
pub mod logging;
pub mod orchestrator;
pub mod registry;
pub mod relations;
pub(crate) mod routing;
pub mod startup;

use crate::core::container::Container;
use crate::core::contracts::{BoxError, Module};

/// Module types that know how to build themselves from the container.
///
/// Keep the factory free of side effects on shared capabilities. Event
/// handlers belong in [`Module::subscribe`], which only runs for modules that
/// went live.
///
/// Register with [`Registry::register_factory`](crate::core::registry::Registry::register_factory).
pub trait ModuleProvidesFactory: Module + Sized {
    fn factory(container: &Container) -> Result<Self, BoxError>;
}

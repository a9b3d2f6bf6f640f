use crate::core::container::Container;
use crate::core::contracts::BoxError;
use crate::core::error_module::{ModuleError, StartupError};
use crate::core::initialization::{InitReport, Initializer, ModuleSet};
use crate::core::orchestrator::{AUTH_PREFIX, CoreOrchestrator};
use crate::core::registry::ModuleProvider;
use async_trait::async_trait;
use std::sync::Arc;

/// State threaded through every startup step.
pub struct StartupContext {
    container: Container,
    modules: ModuleSet,
    errors: Vec<ModuleError>,
}

impl StartupContext {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            modules: ModuleSet::default(),
            errors: Vec::new(),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn modules(&self) -> &ModuleSet {
        &self.modules
    }

    pub fn errors(&self) -> &[ModuleError] {
        &self.errors
    }

    /// Folds an initializer result into the accumulated state.
    pub fn absorb(&mut self, report: InitReport) {
        for name in self.modules.merge(report.modules) {
            self.container.logger().warn(
                "module name provided twice, later module kept",
                &[("module", name)],
            );
        }
        self.errors.extend(report.errors);
    }

    pub fn into_report(self) -> InitReport {
        InitReport {
            modules: self.modules,
            errors: self.errors,
        }
    }
}

#[async_trait]
pub trait StartupStep: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, ctx: &mut StartupContext) -> Result<(), BoxError>;
}

/// Mounts framework modules. With `fatal_on_error` any failed core module
/// aborts startup.
pub struct CoreModulesStep {
    pub provider: Arc<dyn ModuleProvider>,
    pub auth_prefix: String,
    pub fatal_on_error: bool,
}

impl CoreModulesStep {
    pub fn new(provider: Arc<dyn ModuleProvider>) -> Self {
        Self {
            provider,
            auth_prefix: AUTH_PREFIX.to_string(),
            fatal_on_error: true,
        }
    }
}

#[async_trait]
impl StartupStep for CoreModulesStep {
    fn name(&self) -> &str {
        "core-modules"
    }

    async fn run(&self, ctx: &mut StartupContext) -> Result<(), BoxError> {
        let orchestrator =
            CoreOrchestrator::with_auth_prefix(ctx.container.clone(), &self.auth_prefix)?;
        let report = orchestrator.initialize_from(self.provider.as_ref()).await;

        let failed = report.failed_modules().join(", ");
        ctx.absorb(report);
        if self.fatal_on_error && !failed.is_empty() {
            return Err(Box::new(StartupError::CoreModulesFailed(failed)));
        }
        Ok(())
    }
}

/// Mounts application modules on the container router. Failures are kept in
/// the context and never abort startup.
pub struct ApplicationModulesStep {
    pub provider: Arc<dyn ModuleProvider>,
}

#[async_trait]
impl StartupStep for ApplicationModulesStep {
    fn name(&self) -> &str {
        "application-modules"
    }

    async fn run(&self, ctx: &mut StartupContext) -> Result<(), BoxError> {
        let initializer = Initializer::new(ctx.container.clone());
        let report = initializer.initialize_from(self.provider.as_ref()).await;
        ctx.absorb(report);
        Ok(())
    }
}

/// Ordered list of startup steps, run one after another.
pub struct Startup {
    steps: Vec<Box<dyn StartupStep>>,
}

impl Startup {
    pub fn new(steps: Vec<Box<dyn StartupStep>>) -> Self {
        Self { steps }
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, mut ctx: StartupContext) -> Result<StartupContext, StartupError> {
        for step in &self.steps {
            let logger = Arc::clone(ctx.container.logger());
            logger.info("startup step", &[("step", step.name().to_string())]);
            if let Err(cause) = step.run(&mut ctx).await {
                logger.error(
                    "startup aborted",
                    &[
                        ("step", step.name().to_string()),
                        ("error", cause.to_string()),
                    ],
                );
                return Err(StartupError::Step {
                    step: step.name().to_string(),
                    cause,
                });
            }
        }
        Ok(ctx)
    }
}

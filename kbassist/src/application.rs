//! Core application framework functionality.

use crate::config::{ApplicationConfig, APPLICATION_CONFIG};
use crate::runner::{ApplicationRunnerPtr, ErrorPtr};
use config::ConfigError;
use derive_more::Constructor;
use itertools::Itertools;
use kbassist_di::container::Container;
use kbassist_di::error::{RegistrationError, ResolutionError};
use kbassist_di::instance_provider::{ServiceInstanceProvider, TypedServiceInstanceProvider};
use std::cmp::Reverse;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Error, Debug)]
pub enum ApplicationError {
    #[error("Error loading configuration: {0}")]
    ConfigError(String),
    #[error("Error registering application config: {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("Error resolving eager service '{name}': {error}")]
    EagerServiceError { name: String, error: ResolutionError },
    #[error("Error retrieving runners: {0}")]
    RunnerInjectionError(ResolutionError),
    #[error("Runner error: {0}")]
    RunnerError(ErrorPtr),
}

impl From<ConfigError> for ApplicationError {
    fn from(error: ConfigError) -> Self {
        ApplicationError::ConfigError(error.to_string())
    }
}

/// Creates a new root container with settings taken from given config.
pub fn create_container(config: &ApplicationConfig) -> Container {
    Container::with_config(config.container_config())
}

/// Creates an application with config loaded from the environment and a fresh container, ready
/// for registering services.
pub fn create_default() -> Result<Application, ApplicationError> {
    let config = ApplicationConfig::init_from_environment()?;
    Ok(Application::new(create_container(&config), config))
}

/// Main entrypoint for the application and its composition root. Bootstraps the application and
/// runs [ApplicationRunners](crate::runner::ApplicationRunner).
#[derive(Constructor)]
pub struct Application {
    container: Container,
    config: ApplicationConfig,
}

impl Application {
    /// Container used by the application, for registering services before running.
    #[inline]
    pub fn container(&self) -> &Container {
        &self.container
    }

    #[inline]
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn run(&self) -> Result<(), ApplicationError> {
        if self.config.install_tracing_logger {
            install_tracing_logger();
        }

        if !self.container.has(APPLICATION_CONFIG) {
            self.container
                .register_instance(APPLICATION_CONFIG, self.config.clone())?;
        }

        info!("Resolving eager services...");

        for name in &self.config.eager_services {
            self.container
                .resolve(name)
                .map_err(|error| ApplicationError::EagerServiceError {
                    name: name.clone(),
                    error,
                })?;
        }

        info!("Searching for application runners...");

        let runners = self
            .config
            .runners
            .iter()
            .map(|name| self.container.resolve_typed::<ApplicationRunnerPtr>(name))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApplicationError::RunnerInjectionError)?;

        info!("Running application runners...");

        for runner in runners
            .iter()
            .sorted_by_key(|runner| Reverse(runner.priority()))
        {
            runner.run().map_err(ApplicationError::RunnerError)?;
        }

        Ok(())
    }
}

fn install_tracing_logger() {
    if tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .is_err()
    {
        debug!("Global tracing logger already installed - skipping.");
    }
}

#[cfg(test)]
mod tests {
    use crate::application::{Application, ApplicationError};
    use crate::config::{ApplicationConfig, APPLICATION_CONFIG};
    use crate::runner::{ApplicationRunnerPtr, ErrorPtr, MockApplicationRunner};
    use kbassist_di::container::Container;
    use kbassist_di::error::ServiceNotFoundError;
    use kbassist_di::instance_provider::TypedServiceInstanceProvider;
    use mockall::Sequence;
    use std::rc::Rc;

    fn create_config() -> ApplicationConfig {
        ApplicationConfig::default().with_install_tracing_logger(false)
    }

    fn register_runner(container: &Container, name: &str, runner: MockApplicationRunner) {
        container
            .register_instance(name, Box::new(runner) as ApplicationRunnerPtr)
            .unwrap();
    }

    #[test]
    fn should_return_injector_error() {
        let application = Application::new(
            Container::new(),
            create_config().with_runners(["missing"]),
        );

        assert!(matches!(
            application.run().unwrap_err(),
            ApplicationError::RunnerInjectionError(error) if error.is_not_found()
        ));
    }

    #[test]
    fn should_return_runner_error() {
        let container = Container::new();

        let mut runner = MockApplicationRunner::new();
        runner.expect_priority().return_const(0);
        runner.expect_run().times(1).returning(|| {
            Err(Rc::new(ServiceNotFoundError::new("search".to_string(), vec![])) as ErrorPtr)
        });
        register_runner(&container, "runner", runner);

        let application = Application::new(container, create_config().with_runners(["runner"]));
        assert!(matches!(
            application.run().unwrap_err(),
            ApplicationError::RunnerError(_)
        ));
    }

    #[test]
    fn should_fail_on_eager_service_before_running() {
        let container = Container::new();

        let mut runner = MockApplicationRunner::new();
        runner.expect_priority().return_const(0);
        runner.expect_run().never();
        register_runner(&container, "runner", runner);

        let application = Application::new(
            container,
            create_config()
                .with_eager_services(["searchIndex"])
                .with_runners(["runner"]),
        );

        assert!(matches!(
            application.run().unwrap_err(),
            ApplicationError::EagerServiceError { name, .. } if name == "searchIndex"
        ));
    }

    #[test]
    fn should_run_runners_by_priority() {
        let container = Container::new();
        let mut sequence = Sequence::new();

        let mut high = MockApplicationRunner::new();
        high.expect_priority().return_const(10);
        high.expect_run()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(()));

        let mut low = MockApplicationRunner::new();
        low.expect_priority().return_const(-128);
        low.expect_run()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(()));

        register_runner(&container, "low", low);
        register_runner(&container, "high", high);

        let application = Application::new(container, create_config().with_runners(["low", "high"]));
        application.run().unwrap();
    }

    #[test]
    fn should_register_config() {
        let config = create_config().with_debug_container(true);
        let application = Application::new(Container::new(), config.clone());

        application.run().unwrap();

        assert_eq!(
            *application
                .container()
                .resolve_typed::<ApplicationConfig>(APPLICATION_CONFIG)
                .unwrap(),
            config
        );
    }
}

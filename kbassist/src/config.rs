//! Application configuration is represented by [ApplicationConfig]. By default, the config is
//! created with opinionated default values, which can then be overwritten by environment variables
//! prefixed with `KBASSIST_` or the `kbassist.json` file.
//!
//! When running an [Application](crate::application::Application), the config is also registered
//! in the container under [APPLICATION_CONFIG], so any service can depend on it.

use config::{Config, ConfigError, Environment, File};
use kbassist_di::ContainerConfig;
use serde::Deserialize;
use std::path::Path;

const CONFIG_ENV_PREFIX: &str = "KBASSIST";

const LIST_SEPARATOR: &str = ",";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "kbassist.json";

/// Name under which the config is registered in the application container.
pub const APPLICATION_CONFIG: &str = "applicationConfig";

/// Framework configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplicationConfig {
    /// Should a default tracing logger be installed when running the application.
    pub install_tracing_logger: bool,

    /// Should the container log registrations and resolution steps.
    pub debug_container: bool,

    /// Services resolved at startup, before any runner, so wiring defects surface immediately.
    pub eager_services: Vec<String>,

    /// Names of registered [ApplicationRunners](crate::runner::ApplicationRunner) to run.
    pub runners: Vec<String>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
            debug_container: false,
            eager_services: vec![],
            runners: vec![],
        }
    }
}

impl From<OptionalApplicationConfig> for ApplicationConfig {
    fn from(value: OptionalApplicationConfig) -> Self {
        let default = Self::default();
        Self {
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
            debug_container: value.debug_container.unwrap_or(default.debug_container),
            eager_services: value.eager_services.unwrap_or(default.eager_services),
            runners: value.runners.unwrap_or(default.runners),
        }
    }
}

impl ApplicationConfig {
    /// Loads the config from the default file and environment.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::with_name(CONFIG_FILE).required(false)))
    }

    /// Loads the config from given file, with environment variables taking precedence.
    pub fn init_from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::build(Config::builder().add_source(File::from(path)))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(LIST_SEPARATOR)
                    .with_list_parse_key("eager_services")
                    .with_list_parse_key("runners"),
            )
            .build()
            .and_then(|config| config.try_deserialize::<OptionalApplicationConfig>())
            .map(|config| config.into())
    }

    /// Creates container settings matching this config.
    pub fn container_config(&self) -> ContainerConfig {
        ContainerConfig {
            debug: self.debug_container,
        }
    }

    pub fn with_install_tracing_logger(mut self, install_tracing_logger: bool) -> Self {
        self.install_tracing_logger = install_tracing_logger;
        self
    }

    pub fn with_debug_container(mut self, debug_container: bool) -> Self {
        self.debug_container = debug_container;
        self
    }

    pub fn with_eager_services<I, S>(mut self, eager_services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eager_services = eager_services.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_runners<I, S>(mut self, runners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runners = runners.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Deserialize)]
struct OptionalApplicationConfig {
    install_tracing_logger: Option<bool>,
    debug_container: Option<bool>,
    eager_services: Option<Vec<String>>,
    runners: Option<Vec<String>>,
}

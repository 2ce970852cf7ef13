//! Application bootstrap based on [kbassist_di] dependency injection.
//!
//! All services of the assistant are registered by name in a single root
//! [Container](kbassist_di::container::Container), which makes `main()` the only place where
//! concrete implementations are chosen. This crate provides the entrypoint for such composition
//! root in the form of [Application](application::Application), which also configures supporting
//! infrastructure, e.g. logging, and resolves eagerly requested services at startup, so wiring
//! defects are reported before any work is done.
//!
//! ```
//! use kbassist::application::Application;
//! use kbassist::config::ApplicationConfig;
//! use kbassist::runner::{runner_factory, ApplicationRunner, ErrorPtr};
//! use kbassist_di::container::Container;
//! use kbassist_di::registration::RegistrationOptions;
//!
//! struct GreetingRunner {
//!     greeting: String,
//! }
//!
//! impl ApplicationRunner for GreetingRunner {
//!     fn run(&self) -> Result<(), ErrorPtr> {
//!         println!("{}", self.greeting);
//!         Ok(())
//!     }
//! }
//!
//! let config = ApplicationConfig::default()
//!     .with_install_tracing_logger(false)
//!     .with_runners(["greetingRunner"]);
//! let application = Application::new(Container::new(), config);
//!
//! application
//!     .container()
//!     .register_factory("greeting", || Ok(String::from("Hello world!")), true)
//!     .unwrap()
//!     .register(
//!         "greetingRunner",
//!         runner_factory(|dependencies| {
//!             Ok(GreetingRunner {
//!                 greeting: dependencies.get::<String>("greeting")?.to_string(),
//!             })
//!         }),
//!         RegistrationOptions::default().with_dependencies(["greeting"]),
//!     )
//!     .unwrap();
//!
//! application.run().unwrap();
//! ```

pub mod application;
pub mod config;
pub mod runner;

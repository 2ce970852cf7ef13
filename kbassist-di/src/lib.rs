//! Name-based dependency injection container.
//!
//! Services are registered under string names together with an
//! [Implementation](service::Implementation), a [Lifecycle](lifecycle::Lifecycle) and a list of
//! dependency names. Resolving a name builds its dependencies first, hands them to the
//! implementation and caches the result according to the lifecycle:
//!
//! ```
//! use kbassist_di::container::Container;
//! use kbassist_di::instance_provider::ServiceInstanceProvider;
//! use kbassist_di::registration::RegistrationOptions;
//! use std::rc::Rc;
//!
//! let container = Container::new();
//! container
//!     .register_factory("greeting", || Ok(String::from("Hello")), true)
//!     .unwrap()
//!     .register_factory_with(
//!         "message",
//!         |dependencies| {
//!             let greeting = dependencies.get::<String>("greeting")?;
//!             Ok(format!("{greeting} world!"))
//!         },
//!         RegistrationOptions::default().with_dependencies(["greeting"]),
//!     )
//!     .unwrap();
//!
//! let message = container.resolve("message").unwrap();
//! assert_eq!(*message.downcast::<String>().unwrap(), "Hello world!");
//!
//! // singletons are shared, also with scopes
//! let scope = container.create_scope();
//! assert!(Rc::ptr_eq(
//!     &container.resolve("greeting").unwrap(),
//!     &scope.resolve("greeting").unwrap(),
//! ));
//! ```
//!
//! Wiring defects are reported as [errors](error): unknown names, circular dependencies and
//! failing implementations. They are meant to be caught at application startup.

pub mod container;
pub mod error;
mod instance_cache;
pub mod instance_provider;
pub mod lifecycle;
pub mod registration;
pub mod service;

pub use container::{Container, ContainerConfig};
pub use error::{
    CircularDependencyError, DependencyError, RegistrationError, ResolutionError,
    ServiceNotFoundError,
};
pub use lifecycle::Lifecycle;

//! Services are the units managed by the container. Each registered name is bound to an
//! [Implementation], which knows how to build an instance out of already resolved
//! [Dependencies].
//!
//! ## Constructible services
//!
//! Types implementing [Service] construct themselves from their declared dependencies:
//!
//! ```
//! use kbassist_di::container::Container;
//! use kbassist_di::instance_provider::{
//!     Dependencies, ErrorPtr, ServiceInstancePtr, TypedServiceInstanceProvider,
//! };
//! use kbassist_di::registration::RegistrationOptions;
//! use kbassist_di::service::Service;
//!
//! struct EventBus;
//!
//! impl Service for EventBus {
//!     fn create(_dependencies: &Dependencies) -> Result<Self, ErrorPtr> {
//!         Ok(EventBus)
//!     }
//! }
//!
//! struct ArticleView {
//!     events: ServiceInstancePtr<EventBus>,
//! }
//!
//! impl Service for ArticleView {
//!     fn create(dependencies: &Dependencies) -> Result<Self, ErrorPtr> {
//!         Ok(ArticleView {
//!             events: dependencies.get("eventBus")?,
//!         })
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .register_type::<EventBus>("eventBus", RegistrationOptions::singleton())
//!     .unwrap()
//!     .register_type::<ArticleView>(
//!         "articleView",
//!         RegistrationOptions::default().with_dependencies(["eventBus"]),
//!     )
//!     .unwrap();
//!
//! let view = container.resolve_typed::<ArticleView>("articleView").unwrap();
//! let events = container.resolve_typed::<EventBus>("eventBus").unwrap();
//! assert!(ServiceInstancePtr::ptr_eq(&view.events, &events));
//! ```
//!
//! ## Factories
//!
//! Plain closures can be registered as factories when a dedicated type would be overkill, e.g.
//! for configuration values or trait objects.

use crate::instance_provider::{
    Dependencies, ErrorPtr, ServiceInstanceAnyPtr, ServiceInstancePtr,
};
use derivative::Derivative;
use std::any::type_name;
use std::rc::Rc;

/// Base trait for constructible services.
pub trait Service: Sized + 'static {
    /// Creates an instance of this service using dependencies declared at registration.
    fn create(dependencies: &Dependencies) -> Result<Self, ErrorPtr>;
}

/// Type-erased constructor of a [Service].
pub type ConstructorFunction = fn(&Dependencies) -> Result<ServiceInstanceAnyPtr, ErrorPtr>;

/// Type-erased factory closure.
pub type FactoryFunction = Rc<dyn Fn(&Dependencies) -> Result<ServiceInstanceAnyPtr, ErrorPtr>>;

fn construct<T: Service>(dependencies: &Dependencies) -> Result<ServiceInstanceAnyPtr, ErrorPtr> {
    T::create(dependencies)
        .map(|instance| ServiceInstancePtr::new(instance) as ServiceInstanceAnyPtr)
}

/// The way a registered service gets built. The invocation style is decided once, when creating
/// the implementation, and never inspected again during resolution.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub enum Implementation {
    /// A [Service] type built via [Service::create].
    Constructible {
        type_name: &'static str,
        #[derivative(Debug = "ignore")]
        constructor: ConstructorFunction,
    },
    /// A closure called with resolved dependencies.
    Factory(#[derivative(Debug = "ignore")] FactoryFunction),
}

impl Implementation {
    /// Creates an implementation constructing `T`.
    pub fn constructible<T: Service>() -> Self {
        Implementation::Constructible {
            type_name: type_name::<T>(),
            constructor: construct::<T>,
        }
    }

    /// Creates an implementation calling given factory with resolved dependencies.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: 'static,
        F: Fn(&Dependencies) -> Result<T, ErrorPtr> + 'static,
    {
        Implementation::Factory(Rc::new(move |dependencies: &Dependencies| {
            factory(dependencies)
                .map(|instance| ServiceInstancePtr::new(instance) as ServiceInstanceAnyPtr)
        }))
    }

    /// Creates an implementation calling given factory, which takes no dependencies.
    pub fn supplier<T, F>(supplier: F) -> Self
    where
        T: 'static,
        F: Fn() -> Result<T, ErrorPtr> + 'static,
    {
        Self::factory(move |_| supplier())
    }

    #[inline]
    pub fn is_factory(&self) -> bool {
        matches!(self, Implementation::Factory(_))
    }

    pub(crate) fn invoke(
        &self,
        dependencies: &Dependencies,
    ) -> Result<ServiceInstanceAnyPtr, ErrorPtr> {
        match self {
            Implementation::Constructible { constructor, .. } => constructor(dependencies),
            Implementation::Factory(factory) => factory(dependencies),
        }
    }
}

//! Functionality related to registering services. Each container owns a [RegistrationStore]
//! mapping names to [Binding]s: either a [Registration] describing how to build a service, or an
//! already constructed instance.

use crate::error::RegistrationError;
use crate::instance_provider::ServiceInstanceAnyPtr;
use crate::lifecycle::Lifecycle;
use crate::service::Implementation;
use fxhash::FxHashMap;
use itertools::Itertools;
use std::rc::Rc;

/// Optional registration settings. Defaults to a [Lifecycle::Transient] service without
/// dependencies.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegistrationOptions {
    pub lifecycle: Lifecycle,

    /// Names of services to resolve before invoking the implementation. The order is preserved for
    /// introspection, but has no effect on resolution semantics.
    pub dependencies: Vec<String>,
}

impl RegistrationOptions {
    /// Shorthand for options with [Lifecycle::Singleton].
    pub fn singleton() -> Self {
        Self::default().with_lifecycle(Lifecycle::Singleton)
    }

    /// Shorthand for options with [Lifecycle::Scoped].
    pub fn scoped() -> Self {
        Self::default().with_lifecycle(Lifecycle::Scoped)
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dependency<S: Into<String>>(mut self, dependency: S) -> Self {
        self.dependencies.push(dependency.into());
        self
    }
}

/// Metadata of a registered service. Immutable once created - registering the same name again
/// replaces the whole registration.
#[derive(Clone, Debug)]
pub struct Registration {
    pub name: String,
    pub implementation: Implementation,
    pub lifecycle: Lifecycle,
    pub dependencies: Vec<String>,
}

impl Registration {
    /// Validates and creates a new registration.
    pub fn new(
        name: &str,
        implementation: Implementation,
        options: RegistrationOptions,
    ) -> Result<Self, RegistrationError> {
        validate_name(name)?;

        if let Some(dependency) = options
            .dependencies
            .iter()
            .find(|dependency| !is_valid_name(dependency))
        {
            return Err(RegistrationError::InvalidDependencyName {
                service_name: name.to_string(),
                dependency: dependency.clone(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            implementation,
            lifecycle: options.lifecycle,
            dependencies: options.dependencies,
        })
    }

    #[inline]
    pub fn is_factory(&self) -> bool {
        self.implementation.is_factory()
    }
}

#[inline]
fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}

pub(crate) fn validate_name(name: &str) -> Result<(), RegistrationError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(RegistrationError::InvalidName(name.to_string()))
    }
}

/// Something bound to a name in a [RegistrationStore].
#[derive(Clone, Debug)]
pub enum Binding {
    Registration(Rc<Registration>),
    Instance(ServiceInstanceAnyPtr),
}

/// Introspection data for a bound name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistrationInfo {
    pub name: String,
    pub lifecycle: Lifecycle,
    pub dependencies: Vec<String>,
    pub is_factory: bool,

    /// Whether a singleton instance has already been created and cached, as opposed to only being
    /// declared.
    pub is_singleton: bool,

    /// Instance bindings have no implementation to invoke.
    pub has_implementation: bool,
}

impl RegistrationInfo {
    pub(crate) fn new(name: &str, binding: &Binding, is_singleton_cached: bool) -> Self {
        match binding {
            Binding::Registration(registration) => Self {
                name: name.to_string(),
                lifecycle: registration.lifecycle,
                dependencies: registration.dependencies.clone(),
                is_factory: registration.is_factory(),
                is_singleton: is_singleton_cached,
                has_implementation: true,
            },
            Binding::Instance(_) => Self {
                name: name.to_string(),
                lifecycle: Lifecycle::Singleton,
                dependencies: vec![],
                is_factory: false,
                is_singleton: true,
                has_implementation: false,
            },
        }
    }
}

/// Local store of bindings owned by a single container.
#[derive(Clone, Debug, Default)]
pub(crate) struct RegistrationStore {
    bindings: FxHashMap<String, Binding>,
}

impl RegistrationStore {
    /// Binds a registration, returning the replaced binding.
    pub(crate) fn register(&mut self, registration: Registration) -> Option<Binding> {
        self.bindings.insert(
            registration.name.clone(),
            Binding::Registration(Rc::new(registration)),
        )
    }

    pub(crate) fn register_instance(
        &mut self,
        name: &str,
        instance: ServiceInstanceAnyPtr,
    ) -> Option<Binding> {
        self.bindings
            .insert(name.to_string(), Binding::Instance(instance))
    }

    #[inline]
    pub(crate) fn binding(&self, name: &str) -> Option<Binding> {
        self.bindings.get(name).cloned()
    }

    /// Registrations bound in this store, without instance bindings.
    pub(crate) fn registrations(&self) -> impl Iterator<Item = &Rc<Registration>> {
        self.bindings.values().filter_map(|binding| match binding {
            Binding::Registration(registration) => Some(registration),
            Binding::Instance(_) => None,
        })
    }

    /// All bound names, sorted.
    pub(crate) fn names(&self) -> Vec<String> {
        self.bindings.keys().cloned().sorted().collect()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }
}

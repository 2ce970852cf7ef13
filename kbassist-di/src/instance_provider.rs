//! Pointer types for service instances and the generic [ServiceInstanceProvider] interface used
//! to request them by name.

use crate::error::{DependencyError, ResolutionError};
use fxhash::FxHashMap;
use std::any::{type_name, Any};
use std::error::Error;
use std::rc::Rc;

pub type ServiceInstancePtr<T> = Rc<T>;

pub type ServiceInstanceAnyPtr = ServiceInstancePtr<dyn Any + 'static>;

/// Shared error pointer returned by service implementations.
pub type ErrorPtr = Rc<dyn Error + 'static>;

/// Resolved dependencies handed to a service implementation, keyed by dependency name in
/// declaration order.
#[derive(Clone, Default, Debug)]
pub struct Dependencies {
    instances: Vec<(String, ServiceInstanceAnyPtr)>,
}

impl Dependencies {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, name: String, instance: ServiceInstanceAnyPtr) {
        self.instances.push((name, instance));
    }

    /// Returns the type-erased dependency with given name.
    pub fn get_any(&self, name: &str) -> Result<ServiceInstanceAnyPtr, ErrorPtr> {
        self.instances
            .iter()
            .find(|(dependency, _)| dependency == name)
            .map(|(_, instance)| instance.clone())
            .ok_or_else(|| Rc::new(DependencyError::Undeclared(name.to_string())) as ErrorPtr)
    }

    /// Returns the dependency with given name, downcast to `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Result<ServiceInstancePtr<T>, ErrorPtr> {
        self.get_any(name)?.downcast::<T>().map_err(|_| {
            Rc::new(DependencyError::IncompatibleDependency {
                name: name.to_string(),
                expected_type: type_name::<T>(),
            }) as ErrorPtr
        })
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.instances.iter().any(|(dependency, _)| dependency == name)
    }

    /// Dependency names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instances.iter().map(|(name, _)| name.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Generic provider for service instances.
pub trait ServiceInstanceProvider {
    /// Returns a fully constructed instance of the service registered under given name.
    fn resolve(&self, name: &str) -> Result<ServiceInstanceAnyPtr, ResolutionError>;

    /// Like [ServiceInstanceProvider::resolve], but returns `None` if the service, or any service
    /// it depends on, is not registered. Circular dependencies are still reported as errors.
    fn try_resolve(&self, name: &str) -> Result<Option<ServiceInstanceAnyPtr>, ResolutionError>;

    /// Resolves all given names as independent requests. The first error aborts the whole
    /// operation.
    fn resolve_many(
        &self,
        names: &[&str],
    ) -> Result<FxHashMap<String, ServiceInstanceAnyPtr>, ResolutionError>;
}

/// Helper trait for [ServiceInstanceProvider] providing strongly-typed access.
pub trait TypedServiceInstanceProvider {
    /// Typesafe version of [ServiceInstanceProvider::resolve].
    fn resolve_typed<T: 'static>(
        &self,
        name: &str,
    ) -> Result<ServiceInstancePtr<T>, ResolutionError>;

    /// Typesafe version of [ServiceInstanceProvider::try_resolve].
    fn try_resolve_typed<T: 'static>(
        &self,
        name: &str,
    ) -> Result<Option<ServiceInstancePtr<T>>, ResolutionError>;
}

fn downcast<T: 'static>(
    name: &str,
    instance: ServiceInstanceAnyPtr,
) -> Result<ServiceInstancePtr<T>, ResolutionError> {
    instance
        .downcast::<T>()
        .map_err(|_| ResolutionError::IncompatibleService {
            service_name: name.to_string(),
            expected_type: type_name::<T>(),
        })
}

impl<SIP: ServiceInstanceProvider + ?Sized> TypedServiceInstanceProvider for SIP {
    fn resolve_typed<T: 'static>(
        &self,
        name: &str,
    ) -> Result<ServiceInstancePtr<T>, ResolutionError> {
        self.resolve(name)
            .and_then(|instance| downcast(name, instance))
    }

    fn try_resolve_typed<T: 'static>(
        &self,
        name: &str,
    ) -> Result<Option<ServiceInstancePtr<T>>, ResolutionError> {
        self.try_resolve(name)?
            .map(|instance| downcast(name, instance))
            .transpose()
    }
}

//! Core functionality for registering and resolving services. A [Container] owns a registration
//! store and lifecycle caches, and resolves services by walking their declared dependencies
//! depth-first.
//!
//! ## Scopes
//!
//! [Container::create_scope] creates a child container which:
//!
//! * falls back to its parent when a name is not registered locally
//! * shares the singleton cache of the root container
//! * has its own cache for [scoped](Lifecycle::Scoped) instances
//! * can override parent registrations without modifying the parent
//!
//! ```
//! use kbassist_di::container::Container;
//! use kbassist_di::instance_provider::TypedServiceInstanceProvider;
//!
//! let container = Container::new();
//! container.register_factory("sessionId", || Ok(String::from("root")), false).unwrap();
//!
//! let scope = container.create_scope();
//! scope.register_instance("sessionId", String::from("request")).unwrap();
//!
//! assert_eq!(*scope.resolve_typed::<String>("sessionId").unwrap(), "request");
//! assert_eq!(*container.resolve_typed::<String>("sessionId").unwrap(), "root");
//! ```
//!
//! Singletons are built by the container which registered them, so scope overrides never leak into
//! singletons of a parent. Singletons of a scope's own registrations are evicted from the shared
//! cache when the scope is dropped or reset.
//!
//! Scopes hold a non-owning reference to their parent. Dropping the parent while a scope is alive
//! leaves the scope with only its own registrations.

use crate::error::{
    CircularDependencyError, RegistrationError, ResolutionError, ServiceNotFoundError,
};
use crate::instance_cache::InstanceCache;
use crate::instance_provider::{
    Dependencies, ErrorPtr, ServiceInstanceAnyPtr, ServiceInstanceProvider, ServiceInstancePtr,
};
use crate::lifecycle::Lifecycle;
use crate::registration::{
    validate_name, Binding, Registration, RegistrationInfo, RegistrationOptions,
    RegistrationStore,
};
use crate::service::{Implementation, Service};
use fxhash::FxHashMap;
use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// Container settings.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ContainerConfig {
    /// Emit `debug` level events for registrations and resolution steps.
    pub debug: bool,
}

/// Names currently being resolved by a single top-level request.
#[derive(Debug, Default)]
struct ResolutionChain {
    names: Vec<String>,
}

impl ResolutionChain {
    #[inline]
    fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|entry| entry == name)
    }

    #[inline]
    fn push(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    #[inline]
    fn pop(&mut self) {
        self.names.pop();
    }

    /// The chain extended with the name which closes a cycle.
    fn closed_with(&self, name: &str) -> Vec<String> {
        let mut chain = self.names.clone();
        chain.push(name.to_string());
        chain
    }
}

#[derive(Debug)]
struct ContainerState {
    config: ContainerConfig,
    registrations: RefCell<RegistrationStore>,
    scoped_instances: RefCell<InstanceCache>,
    singleton_instances: Rc<RefCell<InstanceCache>>,
    parent: Option<Weak<ContainerState>>,
    depth: usize,
}

impl ContainerState {
    fn instance_cache(&self, lifecycle: Lifecycle) -> &RefCell<InstanceCache> {
        if lifecycle == Lifecycle::Singleton {
            self.singleton_instances.as_ref()
        } else {
            &self.scoped_instances
        }
    }

    /// Removes instances cached for given registrations. Returns the number of evicted instances.
    fn evict<'a>(&self, registrations: impl IntoIterator<Item = &'a Rc<Registration>>) -> usize {
        let mut evicted = vec![];
        for registration in registrations {
            if !registration.lifecycle.is_cached() {
                continue;
            }

            // skipped when the cache is already borrowed further up the stack
            if let Ok(mut cache) = self.instance_cache(registration.lifecycle).try_borrow_mut() {
                evicted.extend(cache.remove(registration));
            }
        }

        evicted.len()
    }
}

impl Drop for ContainerState {
    fn drop(&mut self) {
        let registrations = mem::take(self.registrations.get_mut());
        self.evict(registrations.registrations());
    }
}

/// Dependency injection container. Cloning yields another handle to the same container.
#[derive(Clone, Debug)]
pub struct Container {
    state: Rc<ContainerState>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Creates a new root container with default configuration.
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// Creates a new root container.
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            state: Rc::new(ContainerState {
                config,
                registrations: Default::default(),
                scoped_instances: Default::default(),
                singleton_instances: Default::default(),
                parent: None,
                depth: 0,
            }),
        }
    }

    #[inline]
    pub fn config(&self) -> ContainerConfig {
        self.state.config
    }

    /// Checks if both handles point to the same container.
    #[inline]
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Registers a service under given name, replacing any previous local binding.
    pub fn register(
        &self,
        name: &str,
        implementation: Implementation,
        options: RegistrationOptions,
    ) -> Result<&Self, RegistrationError> {
        let registration = Registration::new(name, implementation, options)?;

        if self.state.config.debug {
            debug!(
                service = name,
                lifecycle = %registration.lifecycle,
                dependencies = ?registration.dependencies,
                is_factory = registration.is_factory(),
                depth = self.state.depth,
                "Registering service"
            );
        }

        let replaced = self.state.registrations.borrow_mut().register(registration);
        self.evict_replaced(replaced);
        Ok(self)
    }

    /// Registers a [Service] type under given name.
    pub fn register_type<T: Service>(
        &self,
        name: &str,
        options: RegistrationOptions,
    ) -> Result<&Self, RegistrationError> {
        self.register(name, Implementation::constructible::<T>(), options)
    }

    /// Binds given value to a name. Such binding behaves like an eagerly created singleton.
    pub fn register_instance<T: 'static>(
        &self,
        name: &str,
        instance: T,
    ) -> Result<&Self, RegistrationError> {
        self.register_instance_ptr(
            name,
            ServiceInstancePtr::new(instance) as ServiceInstanceAnyPtr,
        )
    }

    /// Binds an existing instance pointer to a name, preserving its identity.
    pub fn register_instance_ptr(
        &self,
        name: &str,
        instance: ServiceInstanceAnyPtr,
    ) -> Result<&Self, RegistrationError> {
        validate_name(name)?;

        if self.state.config.debug {
            debug!(service = name, depth = self.state.depth, "Registering instance");
        }

        let replaced = self
            .state
            .registrations
            .borrow_mut()
            .register_instance(name, instance);
        self.evict_replaced(replaced);
        Ok(self)
    }

    /// Registers a factory without dependencies, either as a singleton or transient service.
    pub fn register_factory<T, F>(
        &self,
        name: &str,
        factory: F,
        singleton: bool,
    ) -> Result<&Self, RegistrationError>
    where
        T: 'static,
        F: Fn() -> Result<T, ErrorPtr> + 'static,
    {
        let lifecycle = if singleton {
            Lifecycle::Singleton
        } else {
            Lifecycle::Transient
        };

        self.register(
            name,
            Implementation::supplier(factory),
            RegistrationOptions::default().with_lifecycle(lifecycle),
        )
    }

    /// Registers a factory receiving resolved dependencies.
    pub fn register_factory_with<T, F>(
        &self,
        name: &str,
        factory: F,
        options: RegistrationOptions,
    ) -> Result<&Self, RegistrationError>
    where
        T: 'static,
        F: Fn(&Dependencies) -> Result<T, ErrorPtr> + 'static,
    {
        self.register(name, Implementation::factory(factory), options)
    }

    /// Checks if given name is bound in this container or any of its ancestors.
    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.find_binding(name).is_some()
    }

    /// Returns all names bound locally in this container, sorted. Ancestor bindings are not
    /// included.
    #[inline]
    pub fn list_registered(&self) -> Vec<String> {
        self.state.registrations.borrow().names()
    }

    /// Returns introspection data for the binding visible from this container under given name.
    pub fn registration_info(&self, name: &str) -> Option<RegistrationInfo> {
        self.find_binding(name).map(|(owner, binding)| {
            let is_singleton_cached = match &binding {
                Binding::Registration(registration)
                    if registration.lifecycle == Lifecycle::Singleton =>
                {
                    owner
                        .state
                        .singleton_instances
                        .borrow()
                        .contains(registration)
                }
                _ => false,
            };

            RegistrationInfo::new(name, &binding, is_singleton_cached)
        })
    }

    /// Number of local bindings.
    #[inline]
    pub fn size(&self) -> usize {
        self.state.registrations.borrow().len()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.state.parent.is_none()
    }

    /// Number of scopes between this container and the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.state.depth
    }

    /// Creates a child container. See the module documentation for details.
    pub fn create_scope(&self) -> Container {
        if self.state.config.debug {
            debug!(depth = self.state.depth + 1, "Creating scope");
        }

        Self {
            state: Rc::new(ContainerState {
                config: self.state.config,
                registrations: Default::default(),
                scoped_instances: Default::default(),
                singleton_instances: self.state.singleton_instances.clone(),
                parent: Some(Rc::downgrade(&self.state)),
                depth: self.state.depth + 1,
            }),
        }
    }

    /// Removes cached instances, keeping registrations. Scopes clear only their own scoped
    /// instances, while the root also clears the singletons shared with all scopes.
    pub fn clear_instances(&self) {
        if self.state.config.debug {
            debug!(
                depth = self.state.depth,
                scoped = self.state.scoped_instances.borrow().len(),
                singletons = self.state.singleton_instances.borrow().len(),
                "Clearing instances"
            );
        }

        let scoped = mem::take(&mut *self.state.scoped_instances.borrow_mut());
        let singletons = if self.is_root() {
            mem::take(&mut *self.state.singleton_instances.borrow_mut())
        } else {
            InstanceCache::default()
        };
        drop((scoped, singletons));
    }

    /// Removes cached instances and all local bindings, including singletons created for them.
    pub fn reset(&self) {
        self.clear_instances();

        let registrations = mem::take(&mut *self.state.registrations.borrow_mut());
        self.state.evict(registrations.registrations());
    }

    /// Finds the nearest binding together with the container which owns it.
    fn find_binding(&self, name: &str) -> Option<(Container, Binding)> {
        if let Some(binding) = self.state.registrations.borrow().binding(name) {
            return Some((self.clone(), binding));
        }

        let mut parent = self.state.parent.as_ref().and_then(Weak::upgrade);
        while let Some(state) = parent {
            let binding = state.registrations.borrow().binding(name);
            if let Some(binding) = binding {
                return Some((Container { state }, binding));
            }

            parent = state.parent.as_ref().and_then(Weak::upgrade);
        }

        None
    }

    /// Drops instances cached for a replaced local binding.
    fn evict_replaced(&self, replaced: Option<Binding>) {
        if let Some(Binding::Registration(registration)) = replaced {
            let evicted = self.state.evict([&registration]);
            if self.state.config.debug && evicted > 0 {
                debug!(service = %registration.name, "Evicting replaced instance");
            }
        }
    }

    fn resolve_in_chain(
        &self,
        name: &str,
        chain: &mut ResolutionChain,
    ) -> Result<ServiceInstanceAnyPtr, ResolutionError> {
        let found = match self.find_binding(name) {
            Some((_, Binding::Instance(instance))) => return Ok(instance),
            Some((owner, Binding::Registration(registration))) => Some((owner, registration)),
            None => None,
        };

        if chain.contains(name) {
            return Err(CircularDependencyError::new(chain.closed_with(name)).into());
        }

        let (owner, registration) = found.ok_or_else(|| {
            ServiceNotFoundError::new(name.to_string(), self.list_registered())
        })?;

        // singletons are built and cached by the registering container, scoped and transient
        // services by the requesting one
        let provider = if registration.lifecycle == Lifecycle::Singleton {
            &owner
        } else {
            self
        };
        let cache = provider.state.instance_cache(registration.lifecycle);

        if registration.lifecycle.is_cached() {
            if let Some(instance) = cache.borrow().instance(&registration) {
                if self.state.config.debug {
                    debug!(
                        service = name,
                        lifecycle = %registration.lifecycle,
                        "Using cached instance"
                    );
                }

                return Ok(instance);
            }
        }

        chain.push(name);
        let instance = provider.create_instance(&registration, chain);
        chain.pop();

        let instance = instance?;
        if registration.lifecycle.is_cached() {
            cache
                .borrow_mut()
                .store_instance(&registration, instance.clone());
        }

        Ok(instance)
    }

    fn create_instance(
        &self,
        registration: &Rc<Registration>,
        chain: &mut ResolutionChain,
    ) -> Result<ServiceInstanceAnyPtr, ResolutionError> {
        let mut dependencies = Dependencies::with_capacity(registration.dependencies.len());
        for dependency in &registration.dependencies {
            let instance = self.resolve_in_chain(dependency, chain)?;

            if registration.lifecycle == Lifecycle::Singleton
                && self.lifecycle_of(dependency) == Some(Lifecycle::Scoped)
            {
                warn!(
                    service = %registration.name,
                    dependency = %dependency,
                    "Singleton service captures a scoped dependency"
                );
            }

            dependencies.insert(dependency.clone(), instance);
        }

        if self.state.config.debug {
            debug!(
                service = %registration.name,
                lifecycle = %registration.lifecycle,
                is_factory = registration.is_factory(),
                "Creating instance"
            );
        }

        registration
            .implementation
            .invoke(&dependencies)
            .map_err(|error| ResolutionError::Construction {
                service_name: registration.name.clone(),
                error,
            })
    }

    fn lifecycle_of(&self, name: &str) -> Option<Lifecycle> {
        match self.find_binding(name)?.1 {
            Binding::Registration(registration) => Some(registration.lifecycle),
            Binding::Instance(_) => Some(Lifecycle::Singleton),
        }
    }
}

impl ServiceInstanceProvider for Container {
    fn resolve(&self, name: &str) -> Result<ServiceInstanceAnyPtr, ResolutionError> {
        self.resolve_in_chain(name, &mut ResolutionChain::default())
    }

    fn try_resolve(&self, name: &str) -> Result<Option<ServiceInstanceAnyPtr>, ResolutionError> {
        match self.resolve(name) {
            Ok(instance) => Ok(Some(instance)),
            Err(ResolutionError::NotFound(error)) => {
                if error.service_name != name {
                    debug!(
                        service = name,
                        missing = %error.service_name,
                        "Service dependency is not registered"
                    );
                }

                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    fn resolve_many(
        &self,
        names: &[&str],
    ) -> Result<FxHashMap<String, ServiceInstanceAnyPtr>, ResolutionError> {
        names
            .iter()
            .map(|name| {
                self.resolve(name)
                    .map(|instance| (name.to_string(), instance))
            })
            .collect()
    }
}

//! Service instances with a cached [Lifecycle](crate::lifecycle::Lifecycle) live in an
//! [InstanceCache]. The singleton cache belongs to the root container and is shared with all of
//! its scopes, while each container has its own cache for scoped instances.
//!
//! Entries are keyed by the registration which produced them, so replacing a registration never
//! returns an instance built from the old one, and a scope overriding a singleton does not evict
//! the instance of its parent. Containers remove entries of replaced or dropped registrations.

use crate::instance_provider::ServiceInstanceAnyPtr;
use crate::registration::Registration;
use fxhash::FxHashMap;
use std::rc::Rc;

#[derive(Clone, Debug)]
struct CachedInstance {
    // keeps the key address alive
    _registration: Rc<Registration>,
    instance: ServiceInstanceAnyPtr,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct InstanceCache {
    instances: FxHashMap<*const Registration, CachedInstance>,
}

impl InstanceCache {
    /// Gets an instance created for the given registration, if available.
    pub(crate) fn instance(
        &self,
        registration: &Rc<Registration>,
    ) -> Option<ServiceInstanceAnyPtr> {
        self.instances
            .get(&Rc::as_ptr(registration))
            .map(|cached| cached.instance.clone())
    }

    pub(crate) fn store_instance(
        &mut self,
        registration: &Rc<Registration>,
        instance: ServiceInstanceAnyPtr,
    ) {
        self.instances.insert(
            Rc::as_ptr(registration),
            CachedInstance {
                _registration: registration.clone(),
                instance,
            },
        );
    }

    /// Removes the instance created for the given registration.
    pub(crate) fn remove(
        &mut self,
        registration: &Rc<Registration>,
    ) -> Option<ServiceInstanceAnyPtr> {
        self.instances
            .remove(&Rc::as_ptr(registration))
            .map(|cached| cached.instance)
    }

    #[inline]
    pub(crate) fn contains(&self, registration: &Rc<Registration>) -> bool {
        self.instance(registration).is_some()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }
}

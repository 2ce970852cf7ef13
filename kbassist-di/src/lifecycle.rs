//! Service lifecycles decide how many times a registered service gets instantiated and how widely
//! a created instance is shared:
//!
//! * [Lifecycle::Transient] - a new instance is created on every request; nothing is cached
//! * [Lifecycle::Singleton] - one instance per root container, shared with all of its scopes
//! * [Lifecycle::Scoped] - one instance per container; sibling scopes never share instances
//!
//! Singletons are always built by the container which registered them, so their dependencies never
//! come from scope overrides. A singleton depending on a scoped service still captures the scoped
//! instance of the registering container for its whole life.

use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Lifecycle {
    #[default]
    Transient,
    Singleton,
    Scoped,
}

impl Lifecycle {
    /// Returns `true` if instances with this lifecycle are stored for reuse.
    #[inline]
    pub fn is_cached(self) -> bool {
        matches!(self, Lifecycle::Singleton | Lifecycle::Scoped)
    }
}

impl Display for Lifecycle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Lifecycle::Transient => "transient",
            Lifecycle::Singleton => "singleton",
            Lifecycle::Scoped => "scoped",
        })
    }
}

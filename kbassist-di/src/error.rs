use crate::instance_provider::ErrorPtr;
use itertools::Itertools;
use thiserror::Error;

/// Minimum share of characters two names need to have in common to be considered similar.
const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Maximum length difference between two names to be considered similar.
const SIMILAR_LENGTH_TOLERANCE: usize = 2;

/// Errors reported synchronously when registering services. Registration never defers validation
/// to resolution time.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum RegistrationError {
    #[error("Service name must be a non-empty string, got: '{0}'")]
    InvalidName(String),
    #[error("Service '{service_name}' declares an invalid dependency name: '{dependency}'")]
    InvalidDependencyName {
        service_name: String,
        dependency: String,
    },
}

/// Errors returned by [Dependencies](crate::instance_provider::Dependencies) when an
/// implementation asks for a dependency it cannot get.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum DependencyError {
    #[error("Dependency '{0}' was not declared for this service")]
    Undeclared(String),
    #[error("Dependency '{name}' is not of the requested type: {expected_type}")]
    IncompatibleDependency {
        name: String,
        expected_type: &'static str,
    },
}

/// Requested service is not registered in the container nor in any of its ancestors.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[error("Service not found: '{service_name}'")]
pub struct ServiceNotFoundError {
    /// Name which was requested.
    pub service_name: String,

    /// Names registered locally in the container which failed to resolve the service.
    pub available_services: Vec<String>,
}

impl ServiceNotFoundError {
    pub fn new(service_name: String, available_services: Vec<String>) -> Self {
        Self {
            service_name,
            available_services,
        }
    }

    /// Returns available names which look like a possible typo of the missing one: either one
    /// name contains the other, or they have similar length and share most of their characters.
    pub fn suggestions(&self) -> Vec<&str> {
        let missing = self.service_name.to_lowercase();

        self.available_services
            .iter()
            .filter(|available| {
                let available = available.to_lowercase();
                available.contains(&missing)
                    || missing.contains(&available)
                    || (available.chars().count().abs_diff(missing.chars().count())
                        <= SIMILAR_LENGTH_TOLERANCE
                        && similarity(&available, &missing) >= SIMILARITY_THRESHOLD)
            })
            .map(String::as_str)
            .collect()
    }
}

/// Share of characters (counted with repetition) present in both strings, relative to the longer
/// one.
fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }

    let mut remaining = b.chars().counts();
    let common = a
        .chars()
        .filter(|c| match remaining.get_mut(c) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
        .count();

    common as f64 / longest as f64
}

/// Requested service transitively depends on itself.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[error("Circular dependency detected: {}", format_chain(.dependency_chain))]
pub struct CircularDependencyError {
    /// Names in resolution order, ending with the repeated name which closes the cycle.
    pub dependency_chain: Vec<String>,
}

impl CircularDependencyError {
    pub fn new(dependency_chain: Vec<String>) -> Self {
        Self { dependency_chain }
    }

    /// Human-readable list of resolution steps leading to the cycle.
    pub fn explanation(&self) -> String {
        let steps = self
            .dependency_chain
            .iter()
            .tuple_windows()
            .enumerate()
            .map(|(index, (dependent, dependency))| {
                format!("  {}. '{}' depends on '{}'", index + 1, dependent, dependency)
            })
            .join("\n");

        format!(
            "Circular dependency detected while resolving '{}':\n{}",
            self.dependency_chain.first().map(String::as_str).unwrap_or_default(),
            steps
        )
    }

    /// Number of steps in the cycle itself, excluding any prefix of the chain which only leads
    /// into it.
    pub fn cycle_length(&self) -> usize {
        self.dependency_chain
            .last()
            .and_then(|last| self.dependency_chain.iter().position(|name| name == last))
            .map(|first| self.dependency_chain.len() - 1 - first)
            .unwrap_or_default()
    }
}

fn format_chain(chain: &[String]) -> String {
    chain.join(" -> ")
}

/// Errors related to resolving service instances.
#[derive(Error, Clone, Debug)]
pub enum ResolutionError {
    #[error(transparent)]
    NotFound(#[from] ServiceNotFoundError),
    #[error(transparent)]
    Circular(#[from] CircularDependencyError),
    #[error("Error constructing service '{service_name}': {error}")]
    Construction {
        service_name: String,
        error: ErrorPtr,
    },
    #[error("Service '{service_name}' is not of the requested type: {expected_type}")]
    IncompatibleService {
        service_name: String,
        expected_type: &'static str,
    },
}

impl ResolutionError {
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolutionError::NotFound(_))
    }

    #[inline]
    pub fn is_circular(&self) -> bool {
        matches!(self, ResolutionError::Circular(_))
    }
}

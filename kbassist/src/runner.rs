//! Runners executing actual application logic.

#[cfg(test)]
use mockall::automock;
use kbassist_di::instance_provider::Dependencies;
pub use kbassist_di::instance_provider::ErrorPtr;
use kbassist_di::service::Implementation;

pub type ApplicationRunnerPtr = Box<dyn ApplicationRunner>;

/// Runs application logic. Runners are registered in the container like any other service and run
/// by the [Application](crate::application::Application) after bootstrap.
#[cfg_attr(test, automock)]
pub trait ApplicationRunner {
    /// Runs any application code.
    fn run(&self) -> Result<(), ErrorPtr>;

    /// Returns the priority for this runner. Higher priorities get run first. Default 0.
    fn priority(&self) -> i8 {
        0
    }
}

/// Creates an implementation building a runner out of resolved dependencies, so that it can be
/// found by the [Application](crate::application::Application).
pub fn runner_factory<R, F>(factory: F) -> Implementation
where
    R: ApplicationRunner + 'static,
    F: Fn(&Dependencies) -> Result<R, ErrorPtr> + 'static,
{
    Implementation::factory(move |dependencies| {
        factory(dependencies).map(|runner| Box::new(runner) as ApplicationRunnerPtr)
    })
}

// note: this example assumes you've analyzed the previous one

use kbassist::application;
use kbassist::config::{ApplicationConfig, APPLICATION_CONFIG};
use kbassist::runner::{runner_factory, ApplicationRunner, ErrorPtr};
use kbassist_di::instance_provider::ServiceInstancePtr;
use kbassist_di::registration::RegistrationOptions;

struct ConfigPrinter {
    config: ServiceInstancePtr<ApplicationConfig>,
}

impl ApplicationRunner for ConfigPrinter {
    fn run(&self) -> Result<(), ErrorPtr> {
        println!("Eager services: {:?}", self.config.eager_services);
        println!("Runners: {:?}", self.config.runners);
        Ok(())
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // the config is read from "kbassist.json" (if present) and "KBASSIST_" environment variables,
    // e.g. KBASSIST_RUNNERS=configPrinter KBASSIST_DEBUG_CONTAINER=true
    let application =
        application::create_default().expect("unable to create default application");

    // the config is registered in the container when running, so services can depend on it
    application
        .container()
        .register(
            "configPrinter",
            runner_factory(|dependencies| {
                Ok(ConfigPrinter {
                    config: dependencies.get(APPLICATION_CONFIG)?,
                })
            }),
            RegistrationOptions::default().with_dependencies([APPLICATION_CONFIG]),
        )
        .expect("error registering runner");

    application.run().expect("error running application");
}

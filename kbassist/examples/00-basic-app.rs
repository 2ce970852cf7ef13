use kbassist::application::{create_container, Application};
use kbassist::config::ApplicationConfig;
use kbassist::runner::{runner_factory, ApplicationRunner, ErrorPtr};
use kbassist_di::instance_provider::{Dependencies, ServiceInstancePtr};
use kbassist_di::registration::RegistrationOptions;
use kbassist_di::service::Service;

struct Greeter;

impl Service for Greeter {
    fn create(_dependencies: &Dependencies) -> Result<Self, ErrorPtr> {
        Ok(Greeter)
    }
}

impl Greeter {
    fn greet(&self) -> &'static str {
        "Hello world!"
    }
}

// runners contain the actual application logic and are run after bootstrap
struct HelloWorldRunner {
    greeter: ServiceInstancePtr<Greeter>,
}

impl ApplicationRunner for HelloWorldRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        println!("{}", self.greeter.greet());
        Ok(())
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // runners are listed by name in the config
    let config = ApplicationConfig::default().with_runners(["helloWorldRunner"]);
    let application = Application::new(create_container(&config), config);

    application
        .container()
        .register_type::<Greeter>("greeter", RegistrationOptions::singleton())
        .expect("error registering greeter")
        .register(
            "helloWorldRunner",
            runner_factory(|dependencies| {
                Ok(HelloWorldRunner {
                    greeter: dependencies.get("greeter")?,
                })
            }),
            RegistrationOptions::default().with_dependencies(["greeter"]),
        )
        .expect("error registering runner");

    // prints "Hello world!"
    application.run().expect("error running application");
}

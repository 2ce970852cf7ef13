// note: this example assumes you've analyzed the previous one

use kbassist::application::{create_container, Application};
use kbassist::config::ApplicationConfig;
use kbassist::runner::{runner_factory, ApplicationRunner, ErrorPtr};
use kbassist_di::registration::RegistrationOptions;

struct PrintRunner {
    text: &'static str,
    priority: i8,
}

impl ApplicationRunner for PrintRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        print!("{}", self.text);
        Ok(())
    }

    // for ordered execution of application runners, priorities can be used
    fn priority(&self) -> i8 {
        self.priority
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let config = ApplicationConfig::default().with_runners(["exclamation", "world", "hello"]);
    let application = Application::new(create_container(&config), config);

    for (name, text, priority) in [
        ("hello", "Hello ", 3),
        ("world", "world", 2),
        ("exclamation", "!\n", 1),
    ] {
        application
            .container()
            .register(
                name,
                runner_factory(move |_| Ok(PrintRunner { text, priority })),
                RegistrationOptions::default(),
            )
            .expect("error registering runner");
    }

    // prints "Hello world!"
    application.run().expect("error running application");
}

// note: this example assumes you've analyzed the previous one

use kbassist_di::container::Container;
use kbassist_di::error::ResolutionError;
use kbassist_di::instance_provider::{Dependencies, ErrorPtr, TypedServiceInstanceProvider};
use kbassist_di::registration::RegistrationOptions;
use kbassist_di::service::Service;
use std::cell::Cell;

// scoped services live as long as the scope which created them, e.g. a single chat session
struct Conversation {
    turns: Cell<u32>,
}

impl Service for Conversation {
    fn create(_dependencies: &Dependencies) -> Result<Self, ErrorPtr> {
        println!("Conversation created!");
        Ok(Conversation {
            turns: Cell::new(0),
        })
    }
}

impl Conversation {
    fn ask(&self) {
        self.turns.set(self.turns.get() + 1);
        println!("Turn {}", self.turns.get());
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("warn")
        .try_init()
        .expect("error installing logger");

    let container = Container::new();
    container
        .register_type::<Conversation>("conversation", RegistrationOptions::scoped())
        .expect("error registering conversation")
        .register_factory("model", || Ok("default-model".to_string()), true)
        .expect("error registering model");

    let session = container.create_scope();
    session
        .resolve_typed::<Conversation>("conversation")
        .expect("error resolving conversation")
        .ask();

    // the same scope returns the same instance, so this prints "Turn 2"
    session
        .resolve_typed::<Conversation>("conversation")
        .expect("error resolving conversation")
        .ask();

    // a new scope gets a new conversation
    container
        .create_scope()
        .resolve_typed::<Conversation>("conversation")
        .expect("error resolving conversation")
        .ask();

    // scopes can override parent registrations, e.g. for testing
    session
        .register_instance("model", "test-model".to_string())
        .expect("error overriding model");
    println!(
        "Session model: {}, root model: {}",
        session
            .resolve_typed::<String>("model")
            .expect("error resolving model"),
        container
            .resolve_typed::<String>("model")
            .expect("error resolving model"),
    );

    // cycles are reported with the full chain
    container
        .register_factory_with(
            "a",
            |_| Ok(()),
            RegistrationOptions::default().with_dependencies(["b"]),
        )
        .expect("error registering a")
        .register_factory_with(
            "b",
            |_| Ok(()),
            RegistrationOptions::default().with_dependencies(["a"]),
        )
        .expect("error registering b");

    if let Err(ResolutionError::Circular(error)) = container.resolve_typed::<()>("a") {
        println!("{error}\n{}", error.explanation());
    }
}

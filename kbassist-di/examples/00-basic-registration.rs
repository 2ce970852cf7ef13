use kbassist_di::container::Container;
use kbassist_di::instance_provider::{
    Dependencies, ErrorPtr, ServiceInstancePtr, TypedServiceInstanceProvider,
};
use kbassist_di::registration::RegistrationOptions;
use kbassist_di::service::Service;

// services are plain types constructed from their resolved dependencies
struct EventBus;

impl Service for EventBus {
    fn create(_dependencies: &Dependencies) -> Result<Self, ErrorPtr> {
        println!("EventBus created!");
        Ok(EventBus)
    }
}

struct SearchIndex {
    events: ServiceInstancePtr<EventBus>,
    title: ServiceInstancePtr<String>,
}

impl Service for SearchIndex {
    fn create(dependencies: &Dependencies) -> Result<Self, ErrorPtr> {
        // dependencies are available under the names declared at registration
        Ok(SearchIndex {
            events: dependencies.get("eventBus")?,
            title: dependencies.get("title")?,
        })
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // debug events are emitted only for containers with enabled debugging
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .try_init()
        .expect("error installing logger");

    let container = Container::with_config(kbassist_di::ContainerConfig { debug: true });
    container
        .register_type::<EventBus>("eventBus", RegistrationOptions::singleton())
        .expect("error registering event bus")
        .register_instance("title", "Knowledge base".to_string())
        .expect("error registering title")
        .register_type::<SearchIndex>(
            "searchIndex",
            RegistrationOptions::default().with_dependencies(["eventBus", "title"]),
        )
        .expect("error registering search index");

    // transient services are created on every request, but the event bus is created only once
    let first = container
        .resolve_typed::<SearchIndex>("searchIndex")
        .expect("error resolving search index");
    let second = container
        .resolve_typed::<SearchIndex>("searchIndex")
        .expect("error resolving search index");

    assert!(ServiceInstancePtr::ptr_eq(&first.events, &second.events));
    println!("Indexing: {}", first.title);

    // misspelled names come with suggestions
    if let Err(error) = container.resolve_typed::<EventBus>("evntBus") {
        println!("{error}");
    }
}

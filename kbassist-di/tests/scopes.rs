use kbassist_di::container::Container;
use kbassist_di::instance_provider::{
    Dependencies, ErrorPtr, ServiceInstanceAnyPtr, ServiceInstanceProvider, ServiceInstancePtr,
    TypedServiceInstanceProvider,
};
use kbassist_di::registration::RegistrationOptions;
use kbassist_di::service::Service;
use std::cell::Cell;
use std::rc::Rc;

struct MockA;

impl Service for MockA {
    fn create(_dependencies: &Dependencies) -> Result<Self, ErrorPtr> {
        Ok(MockA)
    }
}

struct MockB;

struct RequestContext;

impl Service for RequestContext {
    fn create(_dependencies: &Dependencies) -> Result<Self, ErrorPtr> {
        Ok(RequestContext)
    }
}

struct ChatSession {
    context: ServiceInstancePtr<RequestContext>,
}

impl Service for ChatSession {
    fn create(dependencies: &Dependencies) -> Result<Self, ErrorPtr> {
        Ok(ChatSession {
            context: dependencies.get("requestContext")?,
        })
    }
}

fn create_container() -> Container {
    let container = Container::new();
    container
        .register_type::<MockA>("eventBus", RegistrationOptions::singleton())
        .unwrap()
        .register_type::<RequestContext>("requestContext", RegistrationOptions::scoped())
        .unwrap()
        .register_type::<ChatSession>(
            "chatSession",
            RegistrationOptions::scoped().with_dependencies(["requestContext"]),
        )
        .unwrap();
    container
}

#[test]
fn should_share_singletons_with_scopes() {
    let container = create_container();
    let scope = container.create_scope();
    let nested = scope.create_scope();

    let from_root = container.resolve("eventBus").unwrap();
    assert!(Rc::ptr_eq(&from_root, &scope.resolve("eventBus").unwrap()));
    assert!(Rc::ptr_eq(&from_root, &nested.resolve("eventBus").unwrap()));
}

#[test]
fn should_share_singletons_created_in_scope() {
    let container = create_container();
    let scope = container.create_scope();

    let from_scope = scope.resolve("eventBus").unwrap();
    assert!(Rc::ptr_eq(&from_scope, &container.resolve("eventBus").unwrap()));
}

#[test]
fn should_isolate_scoped_instances() {
    let container = create_container();
    let scope1 = container.create_scope();
    let scope2 = container.create_scope();

    let first = scope1.resolve("requestContext").unwrap();
    assert!(Rc::ptr_eq(&first, &scope1.resolve("requestContext").unwrap()));
    assert!(!Rc::ptr_eq(&first, &scope2.resolve("requestContext").unwrap()));
    assert!(!Rc::ptr_eq(
        &first,
        &container.resolve("requestContext").unwrap()
    ));
}

#[test]
fn should_not_share_scoped_instances_with_nested_scopes() {
    let container = create_container();
    let scope = container.create_scope();
    let nested = scope.create_scope();

    assert!(!Rc::ptr_eq(
        &scope.resolve("requestContext").unwrap(),
        &nested.resolve("requestContext").unwrap()
    ));
}

#[test]
fn should_inject_scoped_dependencies_from_requesting_scope() {
    let container = create_container();
    let scope = container.create_scope();

    let session = scope.resolve_typed::<ChatSession>("chatSession").unwrap();
    let context = scope
        .resolve_typed::<RequestContext>("requestContext")
        .unwrap();

    assert!(Rc::ptr_eq(&session.context, &context));
}

#[test]
fn should_override_parent_registration() {
    let container = create_container();
    let scope = container.create_scope();

    let mock_b = ServiceInstancePtr::new(MockB) as ServiceInstanceAnyPtr;
    scope
        .register_instance_ptr("eventBus", mock_b.clone())
        .unwrap();

    assert!(Rc::ptr_eq(&scope.resolve("eventBus").unwrap(), &mock_b));
    assert!(container.resolve_typed::<MockA>("eventBus").is_ok());
    assert!(container.resolve_typed::<MockB>("eventBus").is_err());
}

#[test]
fn should_apply_override_to_nested_scopes() {
    let container = create_container();
    let scope = container.create_scope();
    let nested = scope.create_scope();

    scope.register_instance("eventBus", MockB).unwrap();

    assert!(nested.resolve_typed::<MockB>("eventBus").is_ok());
}

#[test]
fn should_keep_singleton_overrides_separate() {
    let counter = Rc::new(Cell::new(0));
    let factory_counter = counter.clone();

    let container = create_container();
    let scope = container.create_scope();
    scope
        .register_factory(
            "eventBus",
            move || {
                factory_counter.set(factory_counter.get() + 1);
                Ok(MockB)
            },
            true,
        )
        .unwrap();

    let from_scope = scope.resolve("eventBus").unwrap();
    let from_root = container.resolve_typed::<MockA>("eventBus").unwrap();
    let from_scope_again = scope.resolve("eventBus").unwrap();

    assert!(Rc::ptr_eq(&from_scope, &from_scope_again));
    assert!(Rc::ptr_eq(
        &from_root,
        &container.resolve_typed::<MockA>("eventBus").unwrap()
    ));
    assert_eq!(counter.get(), 1);
}

#[test]
fn should_fall_back_to_parent_registrations() {
    let container = create_container();
    let scope = container.create_scope();

    assert!(scope.has("eventBus"));
    assert!(scope.registration_info("eventBus").is_some());
    assert!(scope.list_registered().is_empty());
    assert_eq!(scope.size(), 0);

    container.register_instance("late", 1_u8).unwrap();
    assert!(scope.has("late"));
}

#[test]
fn should_not_leak_scope_registrations_to_parent() {
    let container = create_container();
    let scope = container.create_scope();
    scope.register_instance("local", 1_u8).unwrap();

    assert!(!container.has("local"));
    assert!(container.try_resolve("local").unwrap().is_none());
}

#[test]
fn should_report_local_names_when_missing_in_scope() {
    let container = create_container();
    let scope = container.create_scope();
    scope.register_instance("local", 1_u8).unwrap();

    let error = scope.resolve("missing").unwrap_err();
    assert!(matches!(
        error,
        kbassist_di::ResolutionError::NotFound(error) if error.available_services == ["local"]
    ));
}

#[test]
fn should_clear_only_scoped_instances_in_scope() {
    let container = create_container();
    let scope = container.create_scope();

    let singleton = scope.resolve("eventBus").unwrap();
    let scoped = scope.resolve("requestContext").unwrap();

    scope.clear_instances();

    assert!(Rc::ptr_eq(&singleton, &scope.resolve("eventBus").unwrap()));
    assert!(!Rc::ptr_eq(&scoped, &scope.resolve("requestContext").unwrap()));
}

#[test]
fn should_clear_singletons_from_root() {
    let container = create_container();
    let scope = container.create_scope();

    let singleton = scope.resolve("eventBus").unwrap();
    container.clear_instances();

    assert!(!Rc::ptr_eq(&singleton, &scope.resolve("eventBus").unwrap()));
}

#[test]
fn should_reset_scope_without_touching_parent() {
    let container = create_container();
    let scope = container.create_scope();
    scope.register_instance("eventBus", MockB).unwrap();

    scope.reset();

    assert_eq!(scope.size(), 0);
    assert!(scope.resolve_typed::<MockA>("eventBus").is_ok());
    assert_eq!(container.size(), 3);
}

#[test]
fn should_survive_dropped_parent() {
    let container = create_container();
    let singleton = container.resolve("eventBus").unwrap();

    let scope = container.create_scope();
    scope.register_instance("local", 1_u8).unwrap();
    drop(container);

    assert!(scope.has("local"));
    assert!(!scope.has("eventBus"));
    assert_eq!(Rc::strong_count(&singleton), 1);
}

#[test]
fn should_release_scope_singletons_with_scope() {
    let container = create_container();
    let root_singleton = container.resolve("eventBus").unwrap();

    let released = (0..10)
        .map(|_| {
            let scope = container.create_scope();
            scope
                .register_factory("eventBus", || Ok(MockB), true)
                .unwrap();
            Rc::downgrade(&scope.resolve("eventBus").unwrap())
        })
        .collect::<Vec<_>>();

    assert!(released.iter().all(|instance| instance.upgrade().is_none()));
    assert!(Rc::ptr_eq(
        &root_singleton,
        &container.resolve("eventBus").unwrap()
    ));
}

#[test]
fn should_release_scope_singletons_on_reset() {
    let container = create_container();
    let scope = container.create_scope();
    scope
        .register_factory("eventBus", || Ok(MockB), true)
        .unwrap();

    let released = Rc::downgrade(&scope.resolve("eventBus").unwrap());
    scope.reset();

    assert!(released.upgrade().is_none());
    assert!(scope.resolve_typed::<MockA>("eventBus").is_ok());
}

#[test]
fn should_build_parent_singletons_with_parent_dependencies() {
    let container = Container::new();
    container
        .register_instance("eventBus", "root bus".to_string())
        .unwrap()
        .register_factory_with(
            "logger",
            |dependencies| Ok(format!("logger: {}", dependencies.get::<String>("eventBus")?)),
            RegistrationOptions::singleton().with_dependencies(["eventBus"]),
        )
        .unwrap()
        .register_factory_with(
            "handler",
            |dependencies| Ok(format!("handler: {}", dependencies.get::<String>("eventBus")?)),
            RegistrationOptions::default().with_dependencies(["eventBus"]),
        )
        .unwrap();

    let scope = container.create_scope();
    scope
        .register_instance("eventBus", "mock bus".to_string())
        .unwrap();

    assert_eq!(
        *scope.resolve_typed::<String>("logger").unwrap(),
        "logger: root bus"
    );
    assert_eq!(
        *container.resolve_typed::<String>("logger").unwrap(),
        "logger: root bus"
    );
    assert_eq!(
        *scope.resolve_typed::<String>("handler").unwrap(),
        "handler: mock bus"
    );
}

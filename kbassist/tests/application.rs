use kbassist::application::{create_container, Application, ApplicationError};
use kbassist::config::{ApplicationConfig, APPLICATION_CONFIG};
use kbassist::runner::{runner_factory, ApplicationRunner, ErrorPtr};
use kbassist_di::instance_provider::ServiceInstancePtr;
use kbassist_di::registration::RegistrationOptions;
use std::cell::RefCell;
use std::rc::Rc;

struct RecordingRunner {
    log: ServiceInstancePtr<RefCell<Vec<String>>>,
    config: ServiceInstancePtr<ApplicationConfig>,
}

impl ApplicationRunner for RecordingRunner {
    fn run(&self) -> Result<(), ErrorPtr> {
        self.log
            .borrow_mut()
            .push(format!("debug: {}", self.config.debug_container));
        Ok(())
    }
}

fn create_application(config: ApplicationConfig) -> (Application, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(vec![]));
    let application = Application::new(create_container(&config), config);

    application
        .container()
        .register_instance_ptr("log", log.clone())
        .unwrap()
        .register(
            "recorder",
            runner_factory(|dependencies| {
                Ok(RecordingRunner {
                    log: dependencies.get("log")?,
                    config: dependencies.get(APPLICATION_CONFIG)?,
                })
            }),
            RegistrationOptions::singleton().with_dependencies(["log", APPLICATION_CONFIG]),
        )
        .unwrap();

    (application, log)
}

#[test]
fn should_inject_config_into_runners() {
    let (application, log) = create_application(
        ApplicationConfig::default()
            .with_install_tracing_logger(false)
            .with_debug_container(true)
            .with_runners(["recorder"]),
    );

    application.run().unwrap();

    assert!(application.container().config().debug);
    assert_eq!(*log.borrow(), ["debug: true"]);
}

#[test]
fn should_report_eager_service_wiring_defects() {
    let (application, log) = create_application(
        ApplicationConfig::default()
            .with_install_tracing_logger(false)
            .with_eager_services(["recorder", "searchIndex"])
            .with_runners(["recorder"]),
    );
    application
        .container()
        .register_factory_with(
            "searchIndex",
            |_| Ok(()),
            RegistrationOptions::default().with_dependencies(["evntBus"]),
        )
        .unwrap();

    match application.run().unwrap_err() {
        ApplicationError::EagerServiceError { name, error } => {
            assert_eq!(name, "searchIndex");
            assert!(error.is_not_found());
        }
        error => panic!("unexpected error: {error}"),
    }
    assert!(log.borrow().is_empty());
}

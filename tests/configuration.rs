/// Configuration and loosely-typed boundary tests
///
/// Environment-variable tests are serialized because they share process
/// state.

use ferrous_lifecycles::{
    configure_lifecycles, lifecycles, types, Activator, BasicContainer, Container, CreateContainer,
    DiError, Lifecycle, LifecycleConfig, LifecycleDecorator, RegistrationOptions,
    DEFAULT_LIFECYCLE_ENV,
};
use serial_test::serial;
use std::sync::Arc;

#[test]
fn test_configure_rejects_invalid_default() {
    assert_eq!(
        configure_lifecycles("boop").unwrap_err(),
        DiError::InvalidLifecycle("boop".to_string())
    );
    assert!(configure_lifecycles("").is_err());
    assert!(configure_lifecycles(42).is_err());

    assert!(configure_lifecycles(types::SINGLETON).is_ok());
    assert!(configure_lifecycles(types::TRANSIENT).is_ok());
    assert!(configure_lifecycles("tranSieNt").is_ok());
    assert!(configure_lifecycles(Lifecycle::Singleton).is_ok());
}

#[test]
fn test_preconfigured_default_is_singleton() {
    assert_eq!(lifecycles().default_lifecycle(), Lifecycle::Singleton);
    assert_eq!(LifecycleDecorator::default().default_lifecycle(), Lifecycle::Singleton);
    assert_eq!(types::SINGLETON, "singleton");
    assert_eq!(types::TRANSIENT, "transient");
    assert_eq!(Lifecycle::ALL, [Lifecycle::Singleton, Lifecycle::Transient]);
}

#[test]
fn test_registration_rejects_invalid_lifecycle() {
    let mut container = lifecycles().decorate(BasicContainer::new).create();
    let bad = RegistrationOptions::new().lifecycle("boop");

    assert!(container.bind("name", Activator::constructor(|_| ()), Some(&bad)).is_err());
    assert!(container.factory("name", Activator::constructor(|_| ()), Some(&bad)).is_err());

    for token in ["singleTON", types::SINGLETON, types::TRANSIENT] {
        let options = RegistrationOptions::new().lifecycle(token);
        assert!(container.bind("name", Activator::constructor(|_| ()), Some(&options)).is_ok());
        assert!(container.factory("name", Activator::constructor(|_| ()), Some(&options)).is_ok());
    }
    assert!(container.bind("name", Activator::constructor(|_| ()), None).is_ok());
}

#[test]
fn test_decorate_any_requires_callable() {
    let err = lifecycles()
        .decorate_any::<BasicContainer>(Box::new("not a function"))
        .unwrap_err();
    assert_eq!(err, DiError::TypeMismatch("createContainer must be callable"));

    let create: CreateContainer<BasicContainer> = Arc::new(BasicContainer::new);
    let factory = lifecycles()
        .decorate_any::<BasicContainer>(Box::new(create))
        .unwrap();

    let mut container = factory.create();
    container.bind("a", Activator::constructor(|_| 1u8), None).unwrap();
    assert!(container.contains("a"));
}

#[test]
fn test_bind_any_and_factory_any_require_callable() {
    let mut container = lifecycles().decorate(BasicContainer::new).create();

    assert_eq!(
        container.bind_any("a", Box::new(5u32), None).unwrap_err(),
        DiError::TypeMismatch("activator must be callable")
    );
    assert_eq!(
        container.factory_any("a", Box::new(()), None).unwrap_err(),
        DiError::TypeMismatch("activator must be callable")
    );
    assert!(!container.contains("a"));

    container
        .bind_any("a", Box::new(Activator::constructor(|_| 1u8)), None)
        .unwrap()
        .factory_any("b", Box::new(Activator::constructor(|_| 2u8)), None)
        .unwrap();
    assert!(container.contains("a"));
    assert!(container.contains("b"));
}

#[test]
#[serial]
fn test_from_env_reads_default() {
    std::env::set_var(DEFAULT_LIFECYCLE_ENV, "Transient");
    let config = LifecycleConfig::from_env();
    std::env::remove_var(DEFAULT_LIFECYCLE_ENV);

    assert_eq!(config.unwrap().default_lifecycle, Lifecycle::Transient);
}

#[test]
#[serial]
fn test_from_env_unset_uses_singleton() {
    std::env::remove_var(DEFAULT_LIFECYCLE_ENV);
    assert_eq!(LifecycleConfig::from_env().unwrap(), LifecycleConfig::default());
}

#[test]
#[serial]
fn test_from_env_invalid_fails() {
    std::env::set_var("FERROUS_LIFECYCLES_TEST_DEFAULT", "scoped");
    let config = LifecycleConfig::from_env_var("FERROUS_LIFECYCLES_TEST_DEFAULT");
    std::env::remove_var("FERROUS_LIFECYCLES_TEST_DEFAULT");

    assert_eq!(config.unwrap_err(), DiError::InvalidLifecycle("scoped".to_string()));
}

#[test]
#[serial]
fn test_env_config_drives_decorator() {
    std::env::set_var(DEFAULT_LIFECYCLE_ENV, "transient");
    let config = LifecycleConfig::from_env().unwrap();
    std::env::remove_var(DEFAULT_LIFECYCLE_ENV);

    let mut container = LifecycleDecorator::from_config(config)
        .decorate(BasicContainer::new)
        .create();
    container.bind("a", Activator::constructor(|_| 0u8), None).unwrap();

    let a = container.instance("a").unwrap();
    let b = container.instance("a").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

/// Unit tests for DiError and DiResult types

use ferrous_lifecycles::{DiError, DiResult};
use std::error::Error;

#[test]
fn test_error_display_invalid_lifecycle() {
    let error = DiError::InvalidLifecycle("boop".to_string());
    let display_str = format!("{}", error);
    assert_eq!(
        display_str,
        "lifecycle must be either singleton or transient but received boop"
    );

    // The message names the offending value and both options
    assert!(display_str.contains("boop"));
    assert!(display_str.contains("singleton"));
    assert!(display_str.contains("transient"));
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch("activator must be callable");
    assert_eq!(format!("{}", error), "Type mismatch for: activator must be callable");
}

#[test]
fn test_error_display_not_found() {
    let error = DiError::NotFound("database".to_string());
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Registration not found: database");
    assert!(display_str.contains("not found"));
}

#[test]
fn test_error_display_invalid_name() {
    let error = DiError::InvalidName(String::new());
    assert_eq!(format!("{}", error), "Invalid registration name: \"\"");
}

#[test]
fn test_error_display_undeclared_dependency() {
    let error = DiError::UndeclaredDependency {
        name: "users".to_string(),
        dependency: "db".to_string(),
    };
    assert_eq!(format!("{}", error), "Registration users did not declare dependency db");
}

#[test]
fn test_error_display_circular() {
    let path = vec!["a".to_string(), "b".to_string(), "a".to_string()];
    let error = DiError::Circular(path);
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Circular dependency: a -> b -> a");
}

#[test]
fn test_error_display_depth_and_activation() {
    assert_eq!(format!("{}", DiError::DepthExceeded(1024)), "Max depth 1024 exceeded");
    assert_eq!(
        format!("{}", DiError::Activation("disk full".to_string())),
        "Activation failed: disk full"
    );
    assert_eq!(
        format!("{}", DiError::Config("expected value".to_string())),
        "Configuration error: expected value"
    );
}

#[test]
fn test_error_trait_and_equality() {
    let error = DiError::NotFound("x".to_string());
    let as_error: &dyn Error = &error;
    assert!(as_error.source().is_none());

    assert_eq!(error.clone(), error);
    assert_ne!(error, DiError::NotFound("y".to_string()));
}

#[test]
fn test_di_result_alias() {
    fn succeed() -> DiResult<u8> {
        Ok(1)
    }

    fn fail() -> DiResult<u8> {
        Err(DiError::Activation("nope".to_string()))
    }

    assert_eq!(succeed(), Ok(1));
    assert!(matches!(fail(), Err(DiError::Activation(_))));
}

//! Custom assertion macros
//!
//! `assert_ok!` unwraps with the error in the panic message; `assert_err!`
//! checks for an error, optionally against a pattern.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a result is an error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        assert!($result.is_err(), "Expected Err, got Ok");
    };
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => {}
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => panic!("Expected different error variant, got: {:?}", e),
        }
    };
}

/// Assert that two id lists hold the same ids, ignoring order
#[macro_export]
macro_rules! assert_same_ids {
    ($left:expr, $right:expr) => {{
        let left: std::collections::BTreeSet<uuid::Uuid> = $left.iter().copied().collect();
        let right: std::collections::BTreeSet<uuid::Uuid> = $right.iter().copied().collect();
        pretty_assertions::assert_eq!(left, right);
    }};
}

#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_lifecycles::{configure_lifecycles, DiError, Lifecycle};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);

    match Lifecycle::normalize(&raw) {
        Ok(lifecycle) => {
            // Only the two tokens, in any casing, are accepted
            assert_eq!(raw.to_lowercase(), lifecycle.as_str());
            assert!(configure_lifecycles(&raw).is_ok());
        }
        Err(DiError::InvalidLifecycle(echoed)) => {
            assert_eq!(echoed, raw);
            assert!(configure_lifecycles(&raw).is_err());
        }
        Err(other) => panic!("unexpected error: {}", other),
    }
});

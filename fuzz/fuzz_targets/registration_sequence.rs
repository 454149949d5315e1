#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_lifecycles::{
    lifecycles, Activator, AnyArc, BasicContainer, Container, RegistrationOptions,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Each byte is one operation:
//   bits 0-1: name slot
//   bit 2:    register (1) or resolve (0)
//   bit 3:    singleton (1) or transient (0)
//   bit 4:    factory (1) or bind (0)
//   bit 5:    depend on the next slot
fuzz_target!(|data: &[u8]| {
    let mut container = lifecycles().decorate(BasicContainer::new).create();
    let mut singletons: [Option<(Arc<AtomicUsize>, Option<AnyArc>)>; 4] = Default::default();

    for byte in data.iter().take(256) {
        let slot = (byte & 0b11) as usize;
        let name = format!("svc{}", slot);

        if byte & 0b100 != 0 {
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();
            let singleton = byte & 0b1000 != 0;
            let mut options = RegistrationOptions::new()
                .lifecycle(if singleton { "SINGLETON" } else { "Transient" });
            if byte & 0b10_0000 != 0 {
                options = options.depends_on(format!("svc{}", (slot + 1) % 4));
            }

            let activator = Activator::new(move |deps| {
                for dep in deps.names() {
                    deps.get_any(dep)?;
                }
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(()) as AnyArc)
            });

            let result = if byte & 0b1_0000 != 0 {
                container.factory(&name, activator, Some(&options)).map(|_| ())
            } else {
                container.bind(&name, activator, Some(&options)).map(|_| ())
            };
            assert!(result.is_ok());
            singletons[slot] = if singleton { Some((calls, None)) } else { None };
        } else if let Ok(value) = container.instance(&name) {
            if let Some((calls, seen)) = &mut singletons[slot] {
                assert!(calls.load(Ordering::SeqCst) <= 1);
                match seen {
                    Some(previous) => assert!(Arc::ptr_eq(previous, &value)),
                    None => *seen = Some(value),
                }
            }
        }
    }
});

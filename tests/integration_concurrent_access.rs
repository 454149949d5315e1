/// Concurrent access integration tests
///
/// Containers are registered on one thread and then shared read-only; these
/// tests check that singletons still activate once when first resolved from
/// many threads at the same time.

use crossbeam_utils::thread;
use ferrous_lifecycles::{
    lifecycles, Activator, BasicContainer, Container, ContainerExt, DiError, RegistrationOptions,
};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::time::Duration;

#[derive(Debug)]
struct SlowService {
    created_by: String,
}

#[test]
fn test_singleton_activates_once_across_threads() {
    const THREADS: usize = 8;

    let activations = Arc::new(AtomicU32::new(0));
    let counter = activations.clone();
    let mut container = lifecycles().decorate(BasicContainer::new).create();
    container
        .bind(
            "slow",
            Activator::constructor(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(10));
                SlowService {
                    created_by: format!("{:?}", std::thread::current().id()),
                }
            }),
            None,
        )
        .unwrap();

    let barrier = Barrier::new(THREADS);
    let resolved: Vec<Arc<SlowService>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|_| {
                    barrier.wait();
                    container.get::<SlowService>("slow").unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    assert_eq!(activations.load(Ordering::SeqCst), 1);
    assert!(resolved.iter().all(|svc| Arc::ptr_eq(svc, &resolved[0])));
    assert!(!resolved[0].created_by.is_empty());
}

#[test]
fn test_transient_activates_per_thread_call() {
    const THREADS: usize = 4;
    const CALLS: usize = 25;

    let activations = Arc::new(AtomicU32::new(0));
    let counter = activations.clone();
    let mut container = lifecycles().decorate(BasicContainer::new).create();
    container
        .factory(
            "t",
            Activator::constructor(move |_| counter.fetch_add(1, Ordering::SeqCst)),
            Some(&RegistrationOptions::new().lifecycle("transient")),
        )
        .unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|_| {
                for _ in 0..CALLS {
                    container.instance("t").unwrap();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(activations.load(Ordering::SeqCst), (THREADS * CALLS) as u32);
}

#[test]
fn test_shared_singleton_dependency_across_threads() {
    struct Pool;
    struct Handler {
        pool: Arc<Pool>,
    }

    let mut container = lifecycles().decorate(BasicContainer::new).create();
    container
        .bind("pool", Activator::constructor(|_| Pool), None)
        .unwrap()
        .factory(
            "handler",
            Activator::try_constructor(|deps| Ok(Handler { pool: deps.get("pool")? })),
            Some(&RegistrationOptions::new().lifecycle("transient").depends_on("pool")),
        )
        .unwrap();

    let handlers: Vec<Arc<Handler>> = thread::scope(|s| {
        let handles: Vec<_> = (0..6)
            .map(|_| s.spawn(|_| container.get::<Handler>("handler").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    let pool = container.get::<Pool>("pool").unwrap();
    for handler in &handlers {
        assert!(Arc::ptr_eq(&handler.pool, &pool));
    }
    assert!(!Arc::ptr_eq(&handlers[0], &handlers[1]));
}

#[test]
fn test_mutual_singletons_from_two_threads_report_cycle() {
    let barrier = Arc::new(Barrier::new(2));
    let arrivals = Arc::new(AtomicUsize::new(0));

    // Each activator waits for the other thread on its first run only, so
    // both threads hold their first cell before reaching for the second.
    let paired = |dependency: &'static str| {
        let barrier = barrier.clone();
        let arrivals = arrivals.clone();
        Activator::new(move |deps| {
            if arrivals.fetch_add(1, Ordering::SeqCst) < 2 {
                barrier.wait();
            }
            deps.get_any(dependency)
        })
    };

    let mut container = lifecycles().decorate(BasicContainer::new).create();
    container
        .bind("s1", paired("s2"), Some(&RegistrationOptions::new().depends_on("s2")))
        .unwrap()
        .bind("s2", paired("s1"), Some(&RegistrationOptions::new().depends_on("s1")))
        .unwrap();
    let container = Arc::new(container);

    let (tx, rx) = mpsc::channel();
    for name in ["s1", "s2"] {
        let container = container.clone();
        let tx = tx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(container.instance(name).map(|_| ()));
        });
    }

    for _ in 0..2 {
        let result = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("resolution blocked");
        assert!(matches!(result, Err(DiError::Circular(_))), "{:?}", result);
    }
    assert!(!container.is_created("s1"));
    assert!(!container.is_created("s2"));
}

use std::sync::{Arc, Barrier};
use std::thread;

use dynproxy::{
    Arguments, DataType, Dispatch, DispatchError, DispatcherEntry, Dynamic, InterfaceEntry,
    MethodSignature, PrimitiveKind, ProxyFactory, TypeHash,
};

const THREADS: usize = 8;

struct Counter {
    count: i32,
}

impl Dispatch for Counter {
    fn invoke(&mut self, _method: &str, _args: Arguments) -> Result<Option<Dynamic>, DispatchError> {
        self.count += 1;
        Ok(Some(Dynamic::Int32(self.count)))
    }
}

fn setup(interfaces: usize) -> (Arc<ProxyFactory>, TypeHash, Vec<TypeHash>) {
    let factory = ProxyFactory::new();
    let base = factory
        .register_dispatcher(
            DispatcherEntry::new("Counter").with_default_constructor(|| Counter { count: 0 }),
        )
        .unwrap();
    let ifaces = (0..interfaces)
        .map(|i| {
            factory
                .register_interface_entry(InterfaceEntry::new(format!("ICounter{i}")).with_method(
                    MethodSignature::new("Next", vec![], DataType::primitive(PrimitiveKind::Int32)),
                ))
                .unwrap()
        })
        .collect();
    (Arc::new(factory), base, ifaces)
}

#[test]
fn test_concurrent_requests_synthesize_once() {
    let (factory, base, ifaces) = setup(1);
    let iface = ifaces[0];
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let factory = Arc::clone(&factory);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                factory.create_type(base, iface).unwrap()
            })
        })
        .collect();

    let types: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(types.iter().all(|t| Arc::ptr_eq(t, &types[0])));
    assert_eq!(factory.synthesis_count(), 1);
    assert_eq!(factory.cached_type_count(), 1);
}

#[test]
fn test_concurrent_pairings_are_independent() {
    let (factory, base, ifaces) = setup(4);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let factory = Arc::clone(&factory);
            let barrier = Arc::clone(&barrier);
            let ifaces = ifaces.clone();
            thread::spawn(move || {
                barrier.wait();
                // Each thread walks the pairings in a different order
                for i in 0..ifaces.len() {
                    let iface = ifaces[(i + t) % ifaces.len()];
                    factory.create_type(base, iface).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(factory.synthesis_count(), 4);
    assert_eq!(factory.cached_type_count(), 4);
}

#[test]
fn test_proxy_objects_move_between_threads() {
    let (factory, base, ifaces) = setup(1);
    let mut object = factory.create_instance(base, ifaces[0], vec![]).unwrap();
    assert_eq!(object.call("Next", vec![]).unwrap(), Some(Dynamic::Int32(1)));

    let handle = thread::spawn(move || {
        let next = object.call("Next", vec![]).unwrap();
        (object, next)
    });
    let (object, next) = handle.join().unwrap();

    assert_eq!(next, Some(Dynamic::Int32(2)));
    assert_eq!(object.dispatcher::<Counter>().unwrap().count, 2);
}

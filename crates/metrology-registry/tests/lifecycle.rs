//! clear / stop / iteration and re-entrant callbacks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use metrology_core::{ErrorCode, Instrument, MetricKey, Stoppable, TagSet};
use metrology_registry::instruments::{Counter, Meter, Timer};
use metrology_registry::Registry;

#[derive(Default)]
struct Sampler {
    stops: AtomicUsize,
}

impl Stoppable for Sampler {
    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

impl Instrument for Sampler {
    fn kind(&self) -> &'static str {
        "sampler"
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(self)
    }
}

#[test]
fn clear_stops_once_and_forgets_everything() {
    let reg = Registry::new();
    let sampler = reg.get_or_create::<Sampler>("sampler").unwrap();
    let shared = Arc::new(Sampler::default());
    reg.add("a", Arc::clone(&shared)).unwrap();
    reg.add(TagSet::from([("env", "prod")]), Arc::clone(&shared)).unwrap();
    let meter = reg.meter("events").unwrap();
    reg.counter("plain").unwrap();

    reg.clear();

    assert_eq!(sampler.stops.load(Ordering::SeqCst), 1);
    assert_eq!(shared.stops.load(Ordering::SeqCst), 1);
    assert!(meter.is_stopped());
    assert!(reg.is_empty());
    for key in ["sampler", "a", "events", "plain"] {
        assert_eq!(reg.get(key).err().map(|e| e.code()), Some(ErrorCode::NotFound));
    }
    assert_eq!(reg.filter(&TagSet::from([("env", "prod")])).count(), 0);
}

#[test]
fn registry_is_reusable_after_stop() {
    let reg = Registry::new();
    let before = reg.counter("jobs").unwrap();
    reg.stop();

    let after = reg.counter("jobs").unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(reg.len(), 1);
}

#[test]
fn iter_is_a_sorted_snapshot() {
    let reg = Registry::new();
    reg.counter("b").unwrap();
    reg.counter("a").unwrap();
    reg.meter(TagSet::from([("env", "prod")])).unwrap();

    let snapshot = reg.iter();
    reg.counter("c").unwrap();

    let keys: Vec<MetricKey> = snapshot.map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec![
            MetricKey::Name("a".into()),
            MetricKey::Name("b".into()),
            MetricKey::Tags(vec![("env".into(), "prod".into())]),
        ]
    );
    assert_eq!((&reg).into_iter().count(), 4);
}

#[test]
fn catalog_lists_identity_only() {
    let reg = Registry::new();
    reg.timer("latency").unwrap();
    reg.counter(TagSet::from([("env", "prod")])).unwrap();

    let rows = reg.catalog();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].key, "latency");
    assert_eq!(rows[0].kind, "timer");
    assert!(rows[0].tags.is_none());
    assert_eq!(rows[1].key, "{env=prod}");
    assert_eq!(rows[1].tags.as_ref().and_then(|t| t.get("env")), Some("prod"));
}

#[test]
fn factory_may_reenter_the_registry() {
    let reg = Registry::new();
    let timer = reg
        .get_or_create_with("outer", || {
            reg.counter("inner").unwrap().inc();
            Timer::new()
        })
        .unwrap();

    assert_eq!(timer.kind(), "timer");
    assert_eq!(reg.counter("inner").unwrap().count(), 1);
    assert_eq!(reg.len(), 2);
}

#[test]
fn reentrant_registration_of_same_key_wins() {
    let reg = Registry::new();
    let inner = Arc::new(Counter::new());
    let inner_clone = Arc::clone(&inner);

    let got = reg
        .get_or_create_with("k", || {
            reg.install("k", inner_clone);
            Counter::new()
        })
        .unwrap();

    assert!(Arc::ptr_eq(&got, &inner));
}

struct Recorder {
    registry: Arc<Registry>,
}

impl Stoppable for Recorder {
    fn stop(&self) {
        // registry is already empty and unlocked for this thread
        self.registry.meter("after_stop").unwrap().mark();
    }
}

impl Instrument for Recorder {
    fn kind(&self) -> &'static str {
        "recorder"
    }

    fn as_stoppable(&self) -> Option<&dyn Stoppable> {
        Some(self)
    }
}

#[test]
fn stop_hooks_may_reenter_the_registry() {
    let reg = Arc::new(Registry::new());
    reg.install("recorder", Arc::new(Recorder { registry: Arc::clone(&reg) }));

    reg.clear();

    assert_eq!(reg.len(), 1);
    assert_eq!(reg.get_as::<Meter>("after_stop").unwrap().count(), 1);
    reg.clear();
}

/// Reports its kind by looking at the registry it lives in.
struct SelfDescribing {
    registry: Arc<Registry>,
}

impl Instrument for SelfDescribing {
    fn kind(&self) -> &'static str {
        if self.registry.contains("latency") {
            "described"
        } else {
            "undescribed"
        }
    }
}

#[test]
fn kind_may_reenter_the_registry() {
    let reg = Arc::new(Registry::new());
    reg.timer("latency").unwrap();

    reg.add("added", Arc::new(SelfDescribing { registry: Arc::clone(&reg) }))
        .unwrap();
    reg.install(
        TagSet::from([("env", "prod")]),
        Arc::new(SelfDescribing { registry: Arc::clone(&reg) }),
    );
    let built = reg
        .get_or_create_with("built", || SelfDescribing { registry: Arc::clone(&reg) })
        .unwrap();
    assert_eq!(built.kind(), "described");

    let kinds: Vec<_> = reg.catalog().into_iter().map(|row| (row.key, row.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("added".to_string(), "described"),
            ("built".to_string(), "described"),
            ("latency".to_string(), "timer"),
            ("{env=prod}".to_string(), "described"),
        ]
    );
    // breaks the registry <-> instrument cycles
    reg.clear();
}

//! End-to-end scenarios across the cache, container, stores and manager.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use portal_state::cache::ManualClock;
use portal_state::external::{BroadcastBus, MemoryReporter};
use portal_state::store::middleware::{validation, Validators};
use portal_state::store::StoreEnv;
use portal_state::{
    Action, Cache, CacheConfig, Container, Dependencies, PortalError, ServiceDefinition,
    SetOptions, Store, StoreConfig, StoreManager,
};

// == Fixtures ==

#[derive(Debug, Clone, PartialEq)]
struct Counter {
    count: i64,
}

#[derive(Debug, Clone)]
enum CounterAction {
    /// Payload is `None` for a well-formed increment
    Inc(Option<serde_json::Value>),
}

impl Action for CounterAction {
    fn kind(&self) -> &'static str {
        match self {
            CounterAction::Inc(_) => "inc",
        }
    }
}

fn reduce(state: &Arc<Counter>, action: &CounterAction) -> anyhow::Result<Arc<Counter>> {
    match action {
        CounterAction::Inc(_) => Ok(Arc::new(Counter {
            count: state.count + 1,
        })),
    }
}

fn env() -> StoreEnv {
    StoreEnv::new(Arc::new(MemoryReporter::new()), Arc::new(BroadcastBus::new()))
}

fn counter_config(name: &str) -> StoreConfig<Counter, CounterAction> {
    StoreConfig::new(name, Counter { count: 0 }, reduce)
}

struct Sum {
    sum: i32,
}

struct Base {
    v: i32,
}

// == Scenarios ==

#[test]
fn scenario_cache_evicts_soonest_expiry_to_fit() {
    let clock = Arc::new(ManualClock::new(0));
    let mut cache: Cache<String> = Cache::with_collaborators(
        CacheConfig {
            max_size: 100,
            ..CacheConfig::default()
        },
        clock,
        Arc::new(MemoryReporter::new()),
    );

    // JSON strings carry two quote bytes
    assert!(cache.set(
        "first",
        "x".repeat(58),
        SetOptions::ttl(Duration::from_millis(1000))
    ));
    assert_eq!(cache.total_size(), 60);
    assert!(cache.set("second", "y".repeat(48), SetOptions::default()));

    assert!(!cache.has("first"));
    assert!(cache.has("second"));
    let stats = cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.total_size, 50);
}

#[test]
fn scenario_container_injects_dependencies() {
    let mut container = Container::new();
    container.register(ServiceDefinition::new("A", |_: &Dependencies| {
        Ok(Base { v: 1 })
    }));
    container.register(
        ServiceDefinition::new("B", |deps: &Dependencies| {
            let a = deps.get::<Base>(0)?;
            Ok(Sum { sum: a.v + 1 })
        })
        .depends_on(["A"]),
    );

    let b = container.get_as::<Sum>("B").unwrap();
    assert_eq!(b.sum, 2);
}

#[test]
fn scenario_container_reports_cycle() {
    let mut container = Container::new();
    container.register(
        ServiceDefinition::new("A", |_: &Dependencies| Ok(Base { v: 1 })).depends_on(["B"]),
    );
    container.register(
        ServiceDefinition::new("B", |_: &Dependencies| Ok(Base { v: 2 })).depends_on(["A"]),
    );

    match container.get("A") {
        Err(PortalError::CircularDependency { chain }) => assert_eq!(chain, vec!["A", "B", "A"]),
        other => panic!("expected circular dependency, got {:?}", other.map(|_| ())),
    }
    assert!(matches!(
        container.get("B"),
        Err(PortalError::CircularDependency { .. })
    ));
}

#[test]
fn scenario_store_counts_and_notifies() {
    let store = Store::with_dependencies(counter_config("counter"), Dependencies::default(), env());
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let _sub = store.subscribe(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    store.dispatch(CounterAction::Inc(None)).unwrap();
    store.dispatch(CounterAction::Inc(None)).unwrap();

    assert_eq!(store.get_state().count, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn scenario_validation_blocks_bad_payload() {
    let validators = Validators::new().rule("inc", |action: &CounterAction| {
        matches!(action, CounterAction::Inc(None))
    });
    let config = counter_config("counter").middleware(validation(validators));
    let store = Store::with_dependencies(config, Dependencies::default(), env());

    let result = store.dispatch(CounterAction::Inc(Some(serde_json::json!({ "bad": true }))));

    assert!(matches!(result, Err(PortalError::InvalidPayload(_))));
    assert_eq!(*store.get_state(), Counter { count: 0 });
}

#[test]
fn scenario_manager_rejects_duplicates_and_forgets_removed() {
    let mut container = Container::new();
    let mut manager = StoreManager::new(env());

    manager
        .create_store(counter_config_serializable("x"), &mut container)
        .unwrap();
    assert!(matches!(
        manager.create_store(counter_config_serializable("x"), &mut container),
        Err(PortalError::StoreExists(_))
    ));

    assert!(manager.remove_store("x"));
    assert!(matches!(
        manager.get_store::<Tally, TallyAction>("x"),
        Err(PortalError::StoreNotFound(_))
    ));
}

// The manager's JSON surface needs serializable state and deserializable actions

#[derive(Debug, Clone, serde::Serialize)]
struct Tally {
    count: i64,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TallyAction {
    Inc,
}

impl Action for TallyAction {
    fn kind(&self) -> &'static str {
        "inc"
    }
}

fn counter_config_serializable(name: &str) -> StoreConfig<Tally, TallyAction> {
    StoreConfig::new(name, Tally { count: 0 }, |state: &Arc<Tally>, _: &TallyAction| {
        Ok(Arc::new(Tally {
            count: state.count + 1,
        }))
    })
}

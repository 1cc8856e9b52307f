//! State Store
//!
//! A single-domain state container. State lives behind an `Arc` and is only
//! ever replaced wholesale by the reducer; a change is a change of pointer.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock, Weak};

use serde_json::json;
use tracing::{debug, trace};

use crate::container::{Container, Dependencies};
use crate::error::{PortalError, Result};
use crate::external::{
    BroadcastBus, ErrorRecord, ErrorReporter, EventBus, TracingReporter, STORE_UPDATED,
};
use crate::store::{Action, Dispatch};

/// Pure transition. Return the same `Arc` to signal "no change".
pub type Reducer<S, A> = Arc<dyn Fn(&Arc<S>, &A) -> anyhow::Result<Arc<S>> + Send + Sync>;

/// Future returned by an effect.
pub type EffectFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Side-effecting handler run detached after the reducer.
pub type Effect<A> = Arc<dyn Fn(A, Dependencies) -> EffectFuture + Send + Sync>;

/// One link of the dispatch chain.
pub type DispatchFn<S, A> = Arc<dyn Fn(Dispatch<S, A>) -> Result<()> + Send + Sync>;

/// Wraps the next link of the chain and returns a new one.
pub type Middleware<S, A> =
    Arc<dyn Fn(StoreApi<S, A>, DispatchFn<S, A>) -> DispatchFn<S, A> + Send + Sync>;

type Listener = Arc<dyn Fn() + Send + Sync>;

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Store Env ==
/// Collaborators every store reports to.
#[derive(Clone)]
pub struct StoreEnv {
    pub reporter: Arc<dyn ErrorReporter>,
    pub bus: Arc<dyn EventBus>,
}

impl StoreEnv {
    pub fn new(reporter: Arc<dyn ErrorReporter>, bus: Arc<dyn EventBus>) -> Self {
        Self { reporter, bus }
    }
}

impl Default for StoreEnv {
    fn default() -> Self {
        Self::new(Arc::new(TracingReporter), Arc::new(BroadcastBus::new()))
    }
}

// == Store Config ==
/// Declarative description of a store.
pub struct StoreConfig<S, A> {
    pub(crate) name: String,
    pub(crate) initial_state: S,
    pub(crate) reducer: Reducer<S, A>,
    pub(crate) effects: HashMap<&'static str, Effect<A>>,
    pub(crate) middleware: Vec<Middleware<S, A>>,
    pub(crate) dependencies: Vec<String>,
}

impl<S, A> StoreConfig<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    pub fn new<R>(name: impl Into<String>, initial_state: S, reducer: R) -> Self
    where
        R: Fn(&Arc<S>, &A) -> anyhow::Result<Arc<S>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            initial_state,
            reducer: Arc::new(reducer),
            effects: HashMap::new(),
            middleware: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Registers the effect run whenever an action of `kind` is dispatched.
    pub fn effect<F, Fut>(mut self, kind: &'static str, effect: F) -> Self
    where
        F: Fn(A, Dependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.effects.insert(
            kind,
            Arc::new(move |action, deps| Box::pin(effect(action, deps)) as EffectFuture),
        );
        self
    }

    /// Appends a middleware. The first one added is the outermost.
    pub fn middleware(mut self, middleware: Middleware<S, A>) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Service ids resolved once at construction and handed to every effect.
    pub fn dependencies<I, D>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.dependencies = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// == Subscription ==
/// Handle returned by [`Store::subscribe`].
///
/// Dropping it keeps the listener registered; call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    remove: Box<dyn FnOnce() + Send + Sync>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        (self.remove)()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}

// == Store Inner ==
struct StoreInner<S, A> {
    name: String,
    state: RwLock<Arc<S>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    reducer: Reducer<S, A>,
    effects: HashMap<&'static str, Effect<A>>,
    dependencies: Dependencies,
    env: StoreEnv,
    dispatcher: OnceLock<DispatchFn<S, A>>,
}

impl<S, A> StoreInner<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    /// Entry point of the composed middleware chain.
    fn dispatch(&self, dispatch: Dispatch<S, A>) -> Result<()> {
        let dispatcher = self
            .dispatcher
            .get()
            .cloned()
            .ok_or_else(|| PortalError::Internal("store dispatcher not initialised".into()))?;
        dispatcher(dispatch)
    }

    // == Base Dispatch ==
    /// Innermost link: reducer, listeners, effect, bus notification.
    fn base_dispatch(&self, dispatch: Dispatch<S, A>) -> Result<()> {
        let action = match dispatch {
            Dispatch::Action(action) => action,
            Dispatch::Thunk(_) => {
                return Err(PortalError::InvalidAction(
                    "thunks require the thunk middleware".into(),
                ))
            }
        };
        let kind = action.kind();

        let outcome = {
            let mut state = write(&self.state);
            (self.reducer)(&*state, &action).map(|next| {
                if Arc::ptr_eq(&*state, &next) {
                    false
                } else {
                    *state = next;
                    true
                }
            })
        };

        let changed = match outcome {
            Ok(changed) => changed,
            Err(source) => {
                let err = PortalError::Reducer {
                    action: kind.to_string(),
                    source,
                };
                self.env.reporter.report(
                    ErrorRecord::from_error(&err)
                        .with_context(json!({ "store": self.name, "action": kind }))
                        .handled(false),
                );
                return Err(err);
            }
        };

        if changed {
            trace!(store = %self.name, action = kind, "state replaced");
            self.notify();
        }

        if let Some(effect) = self.effects.get(kind) {
            self.spawn_effect(effect, action);
        }

        self.env.bus.emit(
            STORE_UPDATED,
            Some(json!({ "store": self.name, "action": kind, "changed": changed })),
        );
        Ok(())
    }

    fn notify(&self) {
        // Snapshot so listeners may subscribe, unsubscribe or dispatch re-entrantly
        let listeners: Vec<Listener> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn spawn_effect(&self, effect: &Effect<A>, action: A) {
        let kind = action.kind();
        let context = json!({ "store": self.name, "action": kind });
        let reporter = self.env.reporter.clone();

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                reporter.report(
                    ErrorRecord::new(
                        "EffectError",
                        "no async runtime available to run effect",
                        "EFFECT_NO_RUNTIME",
                    )
                    .with_context(context),
                );
                return;
            }
        };

        let future = effect(action, self.dependencies.clone());
        debug!(store = %self.name, action = kind, "effect started");
        handle.spawn(async move {
            if let Err(e) = future.await {
                reporter.report(
                    ErrorRecord::new("EffectError", format!("{:#}", e), "EFFECT_ERROR")
                        .with_context(context),
                );
            }
        });
    }
}

// == Store API ==
/// View of a store handed to middleware and thunks.
pub struct StoreApi<S, A> {
    name: String,
    inner: Weak<StoreInner<S, A>>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<S, A> Clone for StoreApi<S, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            inner: self.inner.clone(),
            reporter: self.reporter.clone(),
        }
    }
}

impl<S, A> StoreApi<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reporter(&self) -> &Arc<dyn ErrorReporter> {
        &self.reporter
    }

    fn upgrade(&self) -> Result<Arc<StoreInner<S, A>>> {
        self.inner
            .upgrade()
            .ok_or_else(|| PortalError::StoreNotFound(self.name.clone()))
    }

    pub fn get_state(&self) -> Result<Arc<S>> {
        Ok(read(&self.upgrade()?.state).clone())
    }

    /// Dispatches through the full middleware chain.
    pub fn dispatch(&self, dispatch: impl Into<Dispatch<S, A>>) -> Result<()> {
        self.upgrade()?.dispatch(dispatch.into())
    }
}

// == Store ==
/// Handle to a store. Cloning is cheap and every clone sees the same state.
pub struct Store<S, A> {
    inner: Arc<StoreInner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    // == Constructor ==
    /// Builds a store, resolving its dependencies from `container` once.
    pub fn new(config: StoreConfig<S, A>, container: &mut Container, env: StoreEnv) -> Result<Self> {
        let dependencies = container.resolve_all(&config.dependencies)?;
        Ok(Self::with_dependencies(config, dependencies, env))
    }

    /// Builds a store with already-resolved dependencies.
    pub fn with_dependencies(
        config: StoreConfig<S, A>,
        dependencies: Dependencies,
        env: StoreEnv,
    ) -> Self {
        let StoreConfig {
            name,
            initial_state,
            reducer,
            effects,
            middleware,
            dependencies: _,
        } = config;

        let inner = Arc::new(StoreInner {
            name: name.clone(),
            state: RwLock::new(Arc::new(initial_state)),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
            reducer,
            effects,
            dependencies,
            env: env.clone(),
            dispatcher: OnceLock::new(),
        });

        let api = StoreApi {
            name,
            inner: Arc::downgrade(&inner),
            reporter: env.reporter,
        };

        let weak = Arc::downgrade(&inner);
        let store_name = api.name.clone();
        let base: DispatchFn<S, A> = Arc::new(move |dispatch| match weak.upgrade() {
            Some(inner) => inner.base_dispatch(dispatch),
            None => Err(PortalError::StoreNotFound(store_name.clone())),
        });

        // Right-to-left so the first configured middleware is the outermost
        let composed = middleware
            .iter()
            .rev()
            .fold(base, |next, layer| layer(api.clone(), next));
        let _ = inner.dispatcher.set(composed);

        Self { inner }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    // == Dispatch ==
    /// Sends an action (or thunk) through the middleware chain.
    ///
    /// Reducer failures and middleware rejections are returned; effect
    /// failures never are.
    pub fn dispatch(&self, dispatch: impl Into<Dispatch<S, A>>) -> Result<()> {
        self.inner.dispatch(dispatch.into())
    }

    /// Runs `thunk` through the chain; requires the thunk middleware.
    pub fn dispatch_thunk<F>(&self, thunk: F) -> Result<()>
    where
        F: FnOnce(&StoreApi<S, A>) -> Result<()> + Send + 'static,
    {
        let dispatch: Dispatch<S, A> = Dispatch::Thunk(Box::new(thunk));
        self.dispatch(dispatch)
    }

    // == Get State ==
    /// Returns the current state. Not a copy: the same `Arc` until the next change.
    pub fn get_state(&self) -> Arc<S> {
        read(&self.inner.state).clone()
    }

    // == Subscribe ==
    /// Registers a listener called after every state replacement.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push((id, Arc::new(listener)));

        let weak = Arc::downgrade(&self.inner);
        Subscription {
            remove: Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner.listeners).retain(|(listener_id, _)| *listener_id != id);
                }
            }),
        }
    }

    // == Select ==
    /// Projects the current state.
    pub fn select<R>(&self, selector: impl FnOnce(&S) -> R) -> R {
        selector(&self.get_state())
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }
}

impl<S, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ServiceDefinition;
    use crate::external::MemoryReporter;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        count: i64,
    }

    #[derive(Debug, Clone)]
    enum CounterAction {
        Inc,
        Add(i64),
        Touch,
        Noop,
        Fail,
        Ping,
        Boom,
    }

    impl Action for CounterAction {
        fn kind(&self) -> &'static str {
            match self {
                CounterAction::Inc => "inc",
                CounterAction::Add(_) => "add",
                CounterAction::Touch => "touch",
                CounterAction::Noop => "noop",
                CounterAction::Fail => "fail",
                CounterAction::Ping => "ping",
                CounterAction::Boom => "boom",
            }
        }
    }

    fn reduce(state: &Arc<Counter>, action: &CounterAction) -> anyhow::Result<Arc<Counter>> {
        Ok(match action {
            CounterAction::Inc => Arc::new(Counter {
                count: state.count + 1,
            }),
            CounterAction::Add(n) => Arc::new(Counter {
                count: state.count + n,
            }),
            // Deep-equal but a new allocation
            CounterAction::Touch => Arc::new(Counter { count: state.count }),
            CounterAction::Noop | CounterAction::Ping | CounterAction::Boom => state.clone(),
            CounterAction::Fail => anyhow::bail!("counter cannot fail gracefully"),
        })
    }

    fn env() -> (StoreEnv, Arc<MemoryReporter>, Arc<BroadcastBus>) {
        let reporter = Arc::new(MemoryReporter::new());
        let bus = Arc::new(BroadcastBus::new());
        (StoreEnv::new(reporter.clone(), bus.clone()), reporter, bus)
    }

    fn counter_store() -> (Store<Counter, CounterAction>, Arc<MemoryReporter>) {
        let (env, reporter, _) = env();
        let config = StoreConfig::new("counter", Counter { count: 0 }, reduce);
        let store = Store::with_dependencies(config, Dependencies::default(), env);
        (store, reporter)
    }

    fn counting_listener(store: &Store<Counter, CounterAction>) -> (Arc<AtomicUsize>, Subscription) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let sub = store.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (calls, sub)
    }

    #[test]
    fn test_dispatch_applies_reducer_and_notifies() {
        let (store, _) = counter_store();
        let (calls, _sub) = counting_listener(&store);

        store.dispatch(CounterAction::Inc).unwrap();
        store.dispatch(CounterAction::Inc).unwrap();

        assert_eq!(store.get_state().count, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_same_reference_does_not_notify() {
        let (store, _) = counter_store();
        let (calls, _sub) = counting_listener(&store);
        let before = store.get_state();

        store.dispatch(CounterAction::Noop).unwrap();

        assert!(Arc::ptr_eq(&before, &store.get_state()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_new_equal_state_notifies() {
        let (store, _) = counter_store();
        let (calls, _sub) = counting_listener(&store);
        let before = store.get_state();

        store.dispatch(CounterAction::Touch).unwrap();

        assert_eq!(*before, *store.get_state());
        assert!(!Arc::ptr_eq(&before, &store.get_state()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reducer_error_is_reported_and_returned() {
        let (store, reporter) = counter_store();
        let before = store.get_state();

        let result = store.dispatch(CounterAction::Fail);

        assert!(matches!(result, Err(PortalError::Reducer { ref action, .. }) if action == "fail"));
        assert!(Arc::ptr_eq(&before, &store.get_state()));
        let records = reporter.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "REDUCER_ERROR");
        assert!(!records[0].handled);
    }

    #[test]
    fn test_unsubscribe_is_independent() {
        let (store, _) = counter_store();
        let (first, first_sub) = counting_listener(&store);
        let (second, _second_sub) = counting_listener(&store);

        store.dispatch(CounterAction::Inc).unwrap();
        first_sub.unsubscribe();
        store.dispatch(CounterAction::Inc).unwrap();

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_listener_can_read_state() {
        let (store, _) = counter_store();
        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = observed.clone();
        let reader = store.clone();
        let _sub = store.subscribe(move || {
            lock(&sink).push(reader.get_state().count);
        });

        store.dispatch(CounterAction::Add(5)).unwrap();
        store.dispatch(CounterAction::Add(-2)).unwrap();

        assert_eq!(*lock(&observed), vec![5, 3]);
    }

    #[test]
    fn test_select_projects_state() {
        let (store, _) = counter_store();
        store.dispatch(CounterAction::Add(21)).unwrap();
        assert_eq!(store.select(|s| s.count * 2), 42);
    }

    #[test]
    fn test_thunk_rejected_without_middleware() {
        let (store, _) = counter_store();
        let result = store.dispatch_thunk(|_| Ok(()));
        assert!(matches!(result, Err(PortalError::InvalidAction(_))));
    }

    #[tokio::test]
    async fn test_bus_notified_after_dispatch() {
        let (env, _, bus) = env();
        let mut rx = bus.subscribe();
        let store = Store::with_dependencies(
            StoreConfig::new("counter", Counter { count: 0 }, reduce),
            Dependencies::default(),
            env,
        );

        store.dispatch(CounterAction::Noop).unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, STORE_UPDATED);
        assert_eq!(
            event.payload,
            Some(json!({ "store": "counter", "action": "noop", "changed": false }))
        );
    }

    #[tokio::test]
    async fn test_effect_receives_action_and_dependencies() {
        let (env, _, _) = env();
        let mut container = Container::new();
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        container.register(ServiceDefinition::instance("log", seen.clone()));

        let config = StoreConfig::new("counter", Counter { count: 0 }, reduce)
            .dependencies(["log"])
            .effect("add", |action: CounterAction, deps: Dependencies| async move {
                let log = deps.get::<Mutex<Vec<String>>>(0)?;
                lock(&log).push(format!("{:?}", action));
                anyhow::Ok(())
            });
        let store = Store::new(config, &mut container, env).unwrap();

        store.dispatch(CounterAction::Add(3)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*lock(&seen), vec!["Add(3)".to_string()]);
    }

    #[tokio::test]
    async fn test_effect_failure_is_reported_not_returned() {
        let (env, reporter, _) = env();
        let config = StoreConfig::new("counter", Counter { count: 0 }, reduce).effect(
            "boom",
            |_: CounterAction, _: Dependencies| async {
                Err::<(), _>(anyhow::anyhow!("remote sync failed"))
            },
        );
        let store = Store::with_dependencies(config, Dependencies::default(), env);

        assert!(store.dispatch(CounterAction::Boom).is_ok());
        tokio::time::sleep(Duration::from_millis(20)).await;

        let records = reporter.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "EFFECT_ERROR");
        assert!(records[0].message.contains("remote sync failed"));
        assert!(records[0].handled);
    }

    #[test]
    fn test_effect_without_runtime_is_reported() {
        let (env, reporter, _) = env();
        let config = StoreConfig::new("counter", Counter { count: 0 }, reduce)
            .effect("ping", |_: CounterAction, _: Dependencies| async { anyhow::Ok(()) });
        let store = Store::with_dependencies(config, Dependencies::default(), env);

        assert!(store.dispatch(CounterAction::Ping).is_ok());
        assert_eq!(reporter.codes(), vec!["EFFECT_NO_RUNTIME"]);
    }

    #[test]
    fn test_missing_dependency_fails_construction() {
        let (env, _, _) = env();
        let mut container = Container::new();
        let config = StoreConfig::new("counter", Counter { count: 0 }, reduce).dependencies(["db"]);

        let result = Store::new(config, &mut container, env);
        assert!(matches!(result, Err(PortalError::ServiceNotFound(_))));
    }

    #[test]
    fn test_effect_runs_on_current_runtime() {
        let (env, _, _) = env();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let config = StoreConfig::new("counter", Counter { count: 0 }, reduce).effect(
            "add",
            move |action: CounterAction, _: Dependencies| {
                let tx = tx.clone();
                async move {
                    tx.send(action.kind())?;
                    anyhow::Ok(())
                }
            },
        );
        let store = Store::with_dependencies(config, Dependencies::default(), env);

        let kind = tokio_test::block_on(async {
            store.dispatch(CounterAction::Add(1)).unwrap();
            rx.recv().await
        });
        assert_eq!(kind, Some("add"));
        assert_eq!(store.get_state().count, 1);
    }

    #[test]
    fn test_api_dispatch_enters_outermost_link() {
        let (env, _, _) = env();
        let entered = Arc::new(AtomicUsize::new(0));
        let captured: Arc<Mutex<Option<StoreApi<Counter, CounterAction>>>> =
            Arc::new(Mutex::new(None));
        let (count, slot) = (entered.clone(), captured.clone());
        let counting: Middleware<Counter, CounterAction> = Arc::new(
            move |api: StoreApi<Counter, CounterAction>,
                  next: DispatchFn<Counter, CounterAction>|
                  -> DispatchFn<Counter, CounterAction> {
                *lock(&slot) = Some(api);
                let count = count.clone();
                Arc::new(move |dispatch| {
                    count.fetch_add(1, Ordering::SeqCst);
                    next(dispatch)
                })
            },
        );
        let config = StoreConfig::new("counter", Counter { count: 0 }, reduce).middleware(counting);
        let store = Store::with_dependencies(config, Dependencies::default(), env);
        let api = lock(&captured).clone().unwrap();

        store.dispatch(CounterAction::Inc).unwrap();
        api.dispatch(CounterAction::Inc).unwrap();
        assert_eq!(entered.load(Ordering::SeqCst), 2);
        assert_eq!(api.get_state().unwrap().count, 2);

        drop(store);
        assert!(matches!(
            api.dispatch(CounterAction::Inc),
            Err(PortalError::StoreNotFound(_))
        ));
    }
}

//! Domain Stores
//!
//! Store configurations for the `app`, `patient` and `provider` domains.
//! Every domain gets the same middleware stack and is hydrated from
//! persistence under its store name.

pub mod app;
pub mod patient;
pub mod provider;

use std::fmt::Debug;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::container::Container;
use crate::error::Result;
use crate::external::{ErrorReporter, Persistence};
use crate::services::{OUTBOX, PERSISTENCE, REPORTER};
use crate::store::middleware::{self, Validators};
use crate::store::{Action, StoreConfig, StoreManager};

pub use app::{AppAction, AppState, APP_STORE};
pub use patient::{PatientAction, PatientState, PATIENT_STORE};
pub use provider::{ProviderAction, ProviderState, PROVIDER_STORE};

/// Collaborators shared by every domain config.
#[derive(Clone)]
pub struct DomainEnv {
    pub persistence: Arc<dyn Persistence>,
    pub reporter: Arc<dyn ErrorReporter>,
    /// Adds the logging middleware
    pub log_actions: bool,
}

impl DomainEnv {
    /// Resolves the persistence backend and error reporter registered by
    /// [`crate::services::register_services`].
    pub fn from_container(container: &mut Container, log_actions: bool) -> Result<Self> {
        let persistence = container.get_as::<Arc<dyn Persistence>>(PERSISTENCE)?;
        let reporter = container.get_as::<Arc<dyn ErrorReporter>>(REPORTER)?;
        Ok(Self {
            persistence: (*persistence).clone(),
            reporter: (*reporter).clone(),
            log_actions,
        })
    }
}

/// Persisted state for `name`, or the default when nothing usable is stored.
fn hydrate<S>(env: &DomainEnv, name: &str) -> S
where
    S: DeserializeOwned + Default,
{
    middleware::load_persisted(env.persistence.as_ref(), name, env.reporter.as_ref())
        .unwrap_or_default()
}

// Order: thunk, [logging], validation, error_boundary, persistence
fn standard_middleware<S, A>(
    config: StoreConfig<S, A>,
    validators: Validators<A>,
    env: &DomainEnv,
) -> StoreConfig<S, A>
where
    S: Serialize + Debug + Send + Sync + 'static,
    A: Action,
{
    let key = config.name().to_string();
    let mut config = config.middleware(middleware::thunk());
    if env.log_actions {
        config = config.middleware(middleware::logging());
    }
    config
        .middleware(middleware::validation(validators))
        .middleware(middleware::error_boundary())
        .middleware(middleware::persistence(key, env.persistence.clone()))
}

pub fn app_config(env: &DomainEnv) -> StoreConfig<AppState, AppAction> {
    let config = StoreConfig::new(APP_STORE, hydrate(env, APP_STORE), app::reduce);
    standard_middleware(config, app::validators(), env)
}

pub fn patient_config(env: &DomainEnv) -> StoreConfig<PatientState, PatientAction> {
    let config = StoreConfig::new(PATIENT_STORE, hydrate(env, PATIENT_STORE), patient::reduce)
        .dependencies([OUTBOX])
        .effect("record_check_in", patient::sync_check_in);
    standard_middleware(config, patient::validators(), env)
}

pub fn provider_config(env: &DomainEnv) -> StoreConfig<ProviderState, ProviderAction> {
    let config = StoreConfig::new(PROVIDER_STORE, hydrate(env, PROVIDER_STORE), provider::reduce)
        .dependencies([OUTBOX])
        .effect("assign_protocol", provider::sync_assignment);
    standard_middleware(config, provider::validators(), env)
}

/// Creates the three domain stores. The container must already hold the
/// services registered by [`crate::services::register_services`].
pub fn create_domain_stores(
    manager: &mut StoreManager,
    container: &mut Container,
    env: &DomainEnv,
) -> Result<()> {
    manager.create_store(app_config(env), container)?;
    manager.create_store(patient_config(env), container)?;
    manager.create_store(provider_config(env), container)?;
    Ok(())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortalError;
    use crate::external::{BroadcastBus, MemoryPersistence, MemoryReporter};
    use crate::services::{register_services, SyncOutbox};
    use crate::store::StoreEnv;
    use chrono::NaiveDate;
    use std::time::Duration;

    struct Fixture {
        manager: StoreManager,
        container: Container,
        env: DomainEnv,
        persistence: Arc<MemoryPersistence>,
        reporter: Arc<MemoryReporter>,
    }

    fn fixture_with(persistence: Arc<MemoryPersistence>) -> Fixture {
        let reporter = Arc::new(MemoryReporter::new());
        let bus = Arc::new(BroadcastBus::new());
        let mut container = Container::new();
        register_services(&mut container, reporter.clone(), persistence.clone(), bus.clone());
        let env = DomainEnv::from_container(&mut container, true).unwrap();
        Fixture {
            manager: StoreManager::new(StoreEnv::new(reporter.clone(), bus)),
            container,
            env,
            persistence,
            reporter,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(MemoryPersistence::new()))
    }

    #[test]
    fn test_env_resolves_registered_collaborators() {
        let f = fixture();
        f.env.persistence.set("k", "v".into()).unwrap();
        assert_eq!(f.persistence.get("k").unwrap(), Some("v".to_string()));

        f.env.reporter.report(crate::external::ErrorRecord::new("Test", "boom", "TEST"));
        assert_eq!(f.reporter.codes(), vec!["TEST"]);
    }

    #[test]
    fn test_env_requires_registered_collaborators() {
        let mut container = Container::new();
        assert!(matches!(
            DomainEnv::from_container(&mut container, false),
            Err(PortalError::ServiceNotFound(_))
        ));
    }

    #[test]
    fn test_creates_all_domain_stores() {
        let mut f = fixture();
        create_domain_stores(&mut f.manager, &mut f.container, &f.env).unwrap();
        assert_eq!(f.manager.store_names(), vec!["app", "patient", "provider"]);
    }

    #[test]
    fn test_dispatch_persists_and_rehydrates() {
        let mut f = fixture();
        create_domain_stores(&mut f.manager, &mut f.container, &f.env).unwrap();
        let app = f.manager.get_store::<AppState, AppAction>(APP_STORE).unwrap();
        app.dispatch(AppAction::SetTheme(app::Theme::Dark)).unwrap();
        assert!(f.persistence.get(APP_STORE).unwrap().is_some());

        // A fresh process over the same backend starts from the saved state
        let mut restarted = fixture_with(f.persistence.clone());
        create_domain_stores(&mut restarted.manager, &mut restarted.container, &restarted.env)
            .unwrap();
        let app = restarted
            .manager
            .get_store::<AppState, AppAction>(APP_STORE)
            .unwrap();
        assert_eq!(app.get_state().theme, app::Theme::Dark);
    }

    #[test]
    fn test_invalid_payload_rejected_outside_boundary() {
        let mut f = fixture();
        create_domain_stores(&mut f.manager, &mut f.container, &f.env).unwrap();
        let app = f.manager.get_store::<AppState, AppAction>(APP_STORE).unwrap();

        let result = app.dispatch(AppAction::Notify(app::Notification {
            id: "n1".into(),
            message: "".into(),
            level: app::NotificationLevel::Info,
        }));

        assert!(matches!(result, Err(PortalError::InvalidPayload(_))));
        assert!(f.reporter.is_empty());
        assert!(app.get_state().notifications.is_empty());
        assert!(f.persistence.get(APP_STORE).unwrap().is_none());
    }

    #[test]
    fn test_reducer_failure_reported_by_store_and_boundary() {
        let mut f = fixture();
        create_domain_stores(&mut f.manager, &mut f.container, &f.env).unwrap();
        let patient = f
            .manager
            .get_store::<PatientState, PatientAction>(PATIENT_STORE)
            .unwrap();

        let result = patient.dispatch(PatientAction::CompleteHabit {
            habit_id: "missing".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        });

        assert!(matches!(result, Err(PortalError::Reducer { .. })));
        assert_eq!(f.reporter.codes(), vec!["REDUCER_ERROR", "REDUCER_ERROR"]);
        let boundary = &f.reporter.records()[1];
        assert_eq!(boundary.context.as_ref().unwrap()["boundary"], true);
    }

    #[test]
    fn test_corrupt_persisted_state_falls_back_to_default() {
        let persistence = Arc::new(MemoryPersistence::new());
        persistence.set(PATIENT_STORE, "{broken".into()).unwrap();
        let mut f = fixture_with(persistence);

        create_domain_stores(&mut f.manager, &mut f.container, &f.env).unwrap();

        let patient = f
            .manager
            .get_store::<PatientState, PatientAction>(PATIENT_STORE)
            .unwrap();
        assert_eq!(*patient.get_state(), PatientState::default());
        assert_eq!(f.reporter.codes(), vec!["SERIALIZATION_ERROR"]);
    }

    #[tokio::test]
    async fn test_check_in_effect_queues_outbox_item() {
        let mut f = fixture();
        create_domain_stores(&mut f.manager, &mut f.container, &f.env).unwrap();
        let patient = f
            .manager
            .get_store::<PatientState, PatientAction>(PATIENT_STORE)
            .unwrap();

        patient
            .dispatch(PatientAction::RecordCheckIn(patient::CheckIn {
                id: "c1".into(),
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                mood: 4,
                energy: 2,
                notes: Some("slept well".into()),
            }))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let outbox = f.container.get_as::<SyncOutbox>(OUTBOX).unwrap();
        let items = outbox.drain();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].entity, "check_in");
        assert_eq!(items[0].payload["mood"], 4);
    }

    #[test]
    fn test_missing_outbox_fails_creation() {
        let mut f = fixture();
        f.container.remove(OUTBOX);
        let result = f.manager.create_store(patient_config(&f.env), &mut f.container);
        assert!(matches!(result, Err(PortalError::ServiceNotFound(_))));
    }
}

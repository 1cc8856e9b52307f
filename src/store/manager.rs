//! Store Manager
//!
//! Registry of named stores, one per domain, for the life of the process.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::container::Container;
use crate::error::{PortalError, Result};
use crate::store::{Action, Store, StoreConfig, StoreEnv};

// == Managed Store ==
/// Type-erased view of a store, used for lookups and the JSON admin surface.
trait ManagedStore: Send + Sync {
    fn state_json(&self) -> Result<Value>;
    fn dispatch_json(&self, action: Value) -> Result<()>;
    fn as_any(&self) -> &dyn Any;
}

impl<S, A> ManagedStore for Store<S, A>
where
    S: Serialize + Send + Sync + 'static,
    A: Action + DeserializeOwned,
{
    fn state_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(&*self.get_state())?)
    }

    fn dispatch_json(&self, action: Value) -> Result<()> {
        let action: A = serde_json::from_value(action)
            .map_err(|e| PortalError::InvalidAction(e.to_string()))?;
        self.dispatch(action)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// == Store Manager ==
/// Owns every live store, keyed by unique name.
pub struct StoreManager {
    stores: HashMap<String, Box<dyn ManagedStore>>,
    env: StoreEnv,
}

impl StoreManager {
    /// Creates an empty manager whose stores report to `env`.
    pub fn new(env: StoreEnv) -> Self {
        Self {
            stores: HashMap::new(),
            env,
        }
    }

    // == Create Store ==
    /// Builds and registers a store.
    ///
    /// # Errors
    /// - [`PortalError::StoreExists`] if the name is taken
    /// - any error resolving the store's dependencies
    pub fn create_store<S, A>(
        &mut self,
        config: StoreConfig<S, A>,
        container: &mut Container,
    ) -> Result<Store<S, A>>
    where
        S: Serialize + Send + Sync + 'static,
        A: Action + DeserializeOwned,
    {
        if self.stores.contains_key(config.name()) {
            return Err(PortalError::StoreExists(config.name().to_string()));
        }

        let store = Store::new(config, container, self.env.clone())?;
        self.stores
            .insert(store.name().to_string(), Box::new(store.clone()));
        info!(store = store.name(), "store created");
        Ok(store)
    }

    // == Get Store ==
    /// Returns a handle to the named store.
    ///
    /// # Errors
    /// - [`PortalError::StoreNotFound`] if no store has that name
    /// - [`PortalError::StoreType`] if it holds a different state or action type
    pub fn get_store<S, A>(&self, name: &str) -> Result<Store<S, A>>
    where
        S: Send + Sync + 'static,
        A: Action,
    {
        let managed = self.lookup(name)?;
        managed
            .as_any()
            .downcast_ref::<Store<S, A>>()
            .cloned()
            .ok_or_else(|| PortalError::StoreType(name.to_string()))
    }

    fn lookup(&self, name: &str) -> Result<&dyn ManagedStore> {
        self.stores
            .get(name)
            .map(|store| store.as_ref())
            .ok_or_else(|| PortalError::StoreNotFound(name.to_string()))
    }

    /// Current state of the named store as JSON.
    pub fn state_json(&self, name: &str) -> Result<Value> {
        self.lookup(name)?.state_json()
    }

    /// Deserializes `action` into the store's action type and dispatches it.
    pub fn dispatch_json(&self, name: &str, action: Value) -> Result<()> {
        self.lookup(name)?.dispatch_json(action)
    }

    pub fn has_store(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// Store names, sorted.
    pub fn store_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.keys().cloned().collect();
        names.sort();
        names
    }

    /// Deregisters a store. Returns whether it existed.
    ///
    /// Outstanding handles keep working but are no longer reachable by name.
    pub fn remove_store(&mut self, name: &str) -> bool {
        let removed = self.stores.remove(name).is_some();
        if removed {
            info!(store = name, "store removed");
        }
        removed
    }

    pub fn clear_stores(&mut self) {
        self.stores.clear();
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl fmt::Debug for StoreManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreManager")
            .field("stores", &self.store_names())
            .finish()
    }
}

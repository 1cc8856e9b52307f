//! Dependency Injection Container
//!
//! Lazy singleton/factory resolution with cycle detection. Services are
//! registered explicitly at startup with [`ServiceDefinition`] and resolved by id.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{PortalError, Result};

/// A constructed service, type-erased.
pub type Instance = Arc<dyn Any + Send + Sync>;

type Factory = Arc<dyn Fn(&Dependencies) -> Result<Instance> + Send + Sync>;

// == Dependencies ==
/// Resolved dependency instances, in the order they were declared.
#[derive(Clone, Default)]
pub struct Dependencies {
    entries: Vec<(String, Instance)>,
}

impl Dependencies {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of the resolved dependencies, in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    /// Returns the dependency at `index` as a `T`.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        let (id, instance) = self.entries.get(index).ok_or_else(|| {
            PortalError::ServiceNotFound(format!("dependency at position {}", index))
        })?;
        downcast(id, instance.clone())
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

fn downcast<T: Any + Send + Sync>(id: &str, instance: Instance) -> Result<Arc<T>> {
    instance.downcast::<T>().map_err(|_| PortalError::ServiceType {
        id: id.to_string(),
        expected: type_name::<T>(),
    })
}

// == Service Definition ==
/// How to build a service: its factory, what it depends on, and whether to cache it.
#[derive(Clone)]
pub struct ServiceDefinition {
    id: String,
    factory: Factory,
    dependencies: Vec<String>,
    singleton: bool,
}

impl ServiceDefinition {
    /// Defines a singleton service built by `factory`.
    ///
    /// The factory receives the declared dependencies positionally.
    pub fn new<T, F>(id: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Dependencies) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            factory: Arc::new(move |deps: &Dependencies| {
                factory(deps).map(|value| Arc::new(value) as Instance)
            }),
            dependencies: Vec::new(),
            singleton: true,
        }
    }

    /// Defines a service that always resolves to an already-built value.
    pub fn instance<T: Any + Send + Sync>(id: impl Into<String>, value: Arc<T>) -> Self {
        Self {
            id: id.into(),
            factory: Arc::new(move |_: &Dependencies| Ok(value.clone() as Instance)),
            dependencies: Vec::new(),
            singleton: true,
        }
    }

    /// Declares the ids resolved and passed to the factory, in order.
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Builds a fresh instance on every resolution instead of caching one.
    pub fn transient(mut self) -> Self {
        self.singleton = false;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .field("singleton", &self.singleton)
            .finish_non_exhaustive()
    }
}

// == Container ==
/// Registry of service definitions and the singletons built from them.
#[derive(Default)]
pub struct Container {
    definitions: HashMap<String, ServiceDefinition>,
    instances: HashMap<String, Instance>,
    /// Ids whose construction is in progress, outermost first
    building: Vec<String>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Adds or replaces a definition. Any cached instance for the id is dropped.
    pub fn register(&mut self, definition: ServiceDefinition) {
        debug!(service = %definition.id, deps = ?definition.dependencies, "service registered");
        self.instances.remove(&definition.id);
        self.definitions.insert(definition.id.clone(), definition);
    }

    // == Get ==
    /// Resolves a service, building it and its dependencies as needed.
    ///
    /// # Errors
    /// - [`PortalError::ServiceNotFound`] if `id` (or a dependency) is not registered
    /// - [`PortalError::CircularDependency`] if `id` is re-entered while being built
    /// - any error returned by a factory
    pub fn get(&mut self, id: &str) -> Result<Instance> {
        if let Some(instance) = self.instances.get(id) {
            return Ok(instance.clone());
        }

        let definition = self
            .definitions
            .get(id)
            .cloned()
            .ok_or_else(|| PortalError::ServiceNotFound(id.to_string()))?;

        if self.building.iter().any(|building| building == id) {
            let mut chain = self.building.clone();
            chain.push(id.to_string());
            return Err(PortalError::CircularDependency { chain });
        }

        self.building.push(id.to_string());
        let built = self.construct(&definition);
        self.building.pop();
        let instance = built?;

        if definition.singleton {
            self.instances.insert(id.to_string(), instance.clone());
        }
        debug!(service = %id, singleton = definition.singleton, "service constructed");
        Ok(instance)
    }

    /// Resolves a service and downcasts it to `T`.
    pub fn get_as<T: Any + Send + Sync>(&mut self, id: &str) -> Result<Arc<T>> {
        let instance = self.get(id)?;
        downcast(id, instance)
    }

    /// Resolves each id in order.
    pub fn resolve_all<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<Dependencies> {
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            entries.push((id.to_string(), self.get(id)?));
        }
        Ok(Dependencies { entries })
    }

    fn construct(&mut self, definition: &ServiceDefinition) -> Result<Instance> {
        let deps = self.resolve_all(&definition.dependencies)?;
        (definition.factory)(&deps)
    }

    pub fn has(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Removes both the definition and any cached instance. Returns whether a definition existed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.instances.remove(id);
        self.definitions.remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.definitions.clear();
        self.instances.clear();
        self.building.clear();
    }

    /// Registered ids, in no particular order.
    pub fn service_ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("definitions", &self.definitions.len())
            .field("instances", &self.instances.len())
            .finish()
    }
}

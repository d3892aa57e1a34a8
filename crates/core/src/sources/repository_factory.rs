//! Keyed constructor lookup for repository implementations.
//!
//! The selection happens once, at startup, from a configuration variable.
//! There is no fallback when the configured key is unknown.

use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{Error, Result};

/// Zero-argument constructor producing a repository instance.
pub type RepositoryConstructor<T> = Box<dyn Fn() -> Result<Arc<T>> + Send + Sync>;

/// Maps data source keys to constructors for one repository interface.
pub struct RepositoryRegistry<T: ?Sized> {
    constructors: HashMap<String, RepositoryConstructor<T>>,
}

impl<T: ?Sized> Default for RepositoryRegistry<T> {
    fn default() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }
}

impl<T: ?Sized> RepositoryRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, key: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.constructors.insert(key.into(), Box::new(constructor));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn construct(&self, key: &str, variable: &str) -> Result<Arc<T>> {
        let constructor =
            self.constructors
                .get(key)
                .ok_or_else(|| Error::UnregisteredDataSource {
                    key: key.to_string(),
                    variable: variable.to_string(),
                })?;
        constructor()
    }
}

/// Resolves `variable` from the process environment and builds the matching
/// repository. See [`create_repository_with`].
pub fn create_repository<T: ?Sized>(
    registry: &RepositoryRegistry<T>,
    variable: &str,
    default_key: Option<&str>,
) -> Result<Arc<T>> {
    create_repository_with(registry, variable, default_key, |name| {
        std::env::var(name).ok()
    })
}

/// Resolves `variable` through `lookup`, falling back to `default_key`, and
/// instantiates the registered constructor for the resolved key.
///
/// Fails with `MissingConfigKey` when neither is set and with
/// `UnregisteredDataSource` when the key has no constructor.
pub fn create_repository_with<T, F>(
    registry: &RepositoryRegistry<T>,
    variable: &str,
    default_key: Option<&str>,
    lookup: F,
) -> Result<Arc<T>>
where
    T: ?Sized,
    F: Fn(&str) -> Option<String>,
{
    let configured = lookup(variable)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    let key = match (configured, default_key) {
        (Some(value), _) => value,
        (None, Some(default)) => {
            debug!("{} not set, using default '{}'", variable, default);
            default.to_string()
        }
        (None, None) => return Err(Error::MissingConfigKey(variable.to_string())),
    };

    let repository = registry.construct(&key, variable)?;
    info!("{} resolved to '{}'", variable, key);
    Ok(repository)
}

//! Named database connections
//!
//! The registry owns one [`MySqlDatabase`] per configured connection and
//! hands out shared handles by name.

use std::collections::BTreeMap;
use std::sync::Arc;

use config::AppConfig;
use mysql_adapter::MySqlDatabase;

use crate::errors::QueryTreeError;

/// Explicit registry of open databases, keyed by configuration name
#[derive(Default)]
pub struct DatabaseRegistry {
    databases: BTreeMap<String, Arc<MySqlDatabase>>,
}

impl DatabaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect every database in the configuration
    pub async fn init(config: &AppConfig) -> Result<Self, QueryTreeError> {
        config.validate()?;
        let mut registry = Self::new();
        for (name, database) in &config.databases {
            let db = MySqlDatabase::connect(database).await?;
            registry.register(name.clone(), db)?;
        }
        tracing::info!("Initialized {} database(s)", registry.databases.len());
        Ok(registry)
    }

    /// Like [`DatabaseRegistry::init`], but connections open on first use
    pub fn init_lazy(config: &AppConfig) -> Result<Self, QueryTreeError> {
        config.validate()?;
        let mut registry = Self::new();
        for (name, database) in &config.databases {
            registry.register(name.clone(), MySqlDatabase::connect_lazy(database)?)?;
        }
        Ok(registry)
    }

    /// Register a database under a name
    pub fn register(&mut self, name: String, database: MySqlDatabase) -> Result<(), QueryTreeError> {
        if self.databases.contains_key(&name) {
            return Err(QueryTreeError::DatabaseAlreadyRegistered(name));
        }
        crate::debug_log!("Registered database {}", name);
        self.databases.insert(name, Arc::new(database));
        Ok(())
    }

    /// Get a registered database by name
    pub fn get(&self, name: &str) -> Result<Arc<MySqlDatabase>, QueryTreeError> {
        self.databases
            .get(name)
            .cloned()
            .ok_or_else(|| QueryTreeError::DatabaseNotFound(name.to_string()))
    }

    /// List all registered database names
    pub fn names(&self) -> Vec<&str> {
        self.databases.keys().map(String::as_str).collect()
    }

    /// Remove a database by name, closing its pool
    pub async fn unregister(&mut self, name: &str) -> Result<(), QueryTreeError> {
        let database = self
            .databases
            .remove(name)
            .ok_or_else(|| QueryTreeError::DatabaseNotFound(name.to_string()))?;
        database.close().await;
        Ok(())
    }

    /// Check connection health of a registered database
    pub async fn health_check(&self, name: &str) -> Result<(), QueryTreeError> {
        self.get(name)?.query_raw("SELECT 1").await?;
        Ok(())
    }

    /// Close every pool
    pub async fn shutdown(&self) {
        for (name, database) in &self.databases {
            tracing::info!("Closing database {}", name);
            database.close().await;
        }
    }
}

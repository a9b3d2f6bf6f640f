use crate::core::contracts::{Database, Dialect, EntityDescriptor};
use crate::core::error_capability::DatabaseError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

/// Records which entities each module migrated. Applying the same entity twice
/// is a no-op, matching `CREATE TABLE IF NOT EXISTS` semantics.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    applied: RwLock<BTreeMap<String, BTreeSet<String>>>,
    failing: RwLock<BTreeSet<String>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later migration of `entity` fail.
    pub fn fail_on(&self, entity: impl Into<String>) {
        self.failing.write().insert(entity.into());
    }

    pub fn applied(&self, module: &str) -> Vec<String> {
        self.applied
            .read()
            .get(module)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn modules(&self) -> Vec<String> {
        self.applied.read().keys().cloned().collect()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Memory
    }

    async fn migrate(
        &self,
        module: &str,
        entities: &[EntityDescriptor],
    ) -> Result<(), DatabaseError> {
        {
            let failing = self.failing.read();
            if let Some(entity) = entities.iter().find(|e| failing.contains(e.name())) {
                return Err(DatabaseError::Migration(
                    entity.name().to_string(),
                    "rejected by memory database".to_string(),
                ));
            }
        }

        let mut applied = self.applied.write();
        let owned = applied.entry(module.to_string()).or_default();
        for entity in entities {
            owned.insert(entity.name().to_string());
        }
        Ok(())
    }
}

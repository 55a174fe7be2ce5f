use std::{collections::HashMap, sync::{Arc, Mutex}};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::domain::store::KeyValueStore;

/// Process-local store; clones share the same map.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn init(&self) -> Result<()> { Ok(()) }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.items.lock().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.items.lock().map_err(|_| anyhow!("store lock poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

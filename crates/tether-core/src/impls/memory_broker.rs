//! MemoryBroker - 開発・テスト用の broker
//!
//! A map of field maps behind one `RwLock`. Each trait call takes the lock
//! once, so single calls are atomic and nothing else is.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::ports::{Broker, BrokerError, FieldMap};

#[derive(Debug, Default)]
pub struct MemoryBroker {
    maps: RwLock<HashMap<String, FieldMap>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.maps.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: PoisonError<T>) -> BrokerError {
    BrokerError::OperationFailed("memory broker lock poisoned".to_string())
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn get_field(&self, key: &str, field: &str) -> Result<Option<String>, BrokerError> {
        let maps = self.maps.read().map_err(poisoned)?;
        Ok(maps.get(key).and_then(|m| m.get(field)).cloned())
    }

    async fn put_field(&self, key: &str, field: &str, value: &str) -> Result<(), BrokerError> {
        let mut maps = self.maps.write().map_err(poisoned)?;
        maps.entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn get_all_fields(&self, key: &str) -> Result<FieldMap, BrokerError> {
        let maps = self.maps.read().map_err(poisoned)?;
        Ok(maps.get(key).cloned().unwrap_or_default())
    }

    async fn put_all_fields(&self, key: &str, fields: FieldMap) -> Result<(), BrokerError> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut maps = self.maps.write().map_err(poisoned)?;
        maps.entry(key.to_string()).or_default().extend(fields);
        Ok(())
    }

    async fn remove_map(&self, key: &str) -> Result<(), BrokerError> {
        let mut maps = self.maps.write().map_err(poisoned)?;
        maps.remove(key);
        Ok(())
    }
}

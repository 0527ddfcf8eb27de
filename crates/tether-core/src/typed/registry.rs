//! TypedRegistry - task_type から Handler を引く表
//!
//! A job stores only the task type string. Workers resolve it here; an
//! unresolvable type is not a panic but a failure message that ends up in
//! the job's `error` field.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::handler::{DynHandler, Handler, TypedHandler};
use super::task::Task;
use crate::domain::TaskType;

#[derive(Default)]
pub struct TypedRegistry {
    // BTreeMap so task_types() comes out in a stable order.
    handlers: BTreeMap<&'static str, Arc<dyn DynHandler>>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("handler for task_type={0} is already registered")]
    AlreadyRegistered(&'static str),

    /// Text persisted as the job error when a worker meets an unknown type.
    #[error("handler not found for task_type={0}")]
    NotFound(String),
}

impl TypedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One handler per `T::TYPE`; a second registration is refused.
    pub fn register<T: Task, H: Handler<T> + 'static>(
        &mut self,
        handler: H,
    ) -> Result<(), RegistryError> {
        if self.handlers.contains_key(T::TYPE) {
            return Err(RegistryError::AlreadyRegistered(T::TYPE));
        }
        self.handlers
            .insert(T::TYPE, Arc::new(TypedHandler::<T, H>::new(handler)));
        Ok(())
    }

    pub fn resolve(&self, task_type: &TaskType) -> Result<Arc<dyn DynHandler>, RegistryError> {
        self.handlers
            .get(task_type.as_str())
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(task_type.to_string()))
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.handlers.contains_key(task_type)
    }

    /// Sorted.
    pub fn task_types(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    /// Those of `expected` that have no handler, in the given order.
    pub fn missing(&self, expected: &[String]) -> Vec<String> {
        expected
            .iter()
            .filter(|t| !self.contains(t))
            .cloned()
            .collect()
    }
}

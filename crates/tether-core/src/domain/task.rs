use serde::{Deserialize, Serialize};
use std::fmt;

use crate::typed::Task;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// ジョブの `task` フィールドに保存される不透明なタスク記述子。
///
/// Workers resolve `task_type` to a handler and hand it `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    task_type: TaskType,
    payload: serde_json::Value,
}

impl TaskEnvelope {
    pub fn new(task_type: TaskType, payload: serde_json::Value) -> Self {
        Self { task_type, payload }
    }

    /// Wrap a typed task.
    pub fn from_task<T: Task>(task: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(TaskType::new(T::TYPE), serde_json::to_value(task)?))
    }

    pub fn task_type(&self) -> &TaskType {
        &self.task_type
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }
}

//! Handler trait - Task を実行する Handler の定義
//!
//! - ジェネリック trait (Handler<T>)
//! - Object-safe trait (DynHandler)
//! - Type erasure パターン (TypedHandler<T, H> → DynHandler)

use super::task::Task;
use async_trait::async_trait;
use std::marker::PhantomData;

/// Error a handler may return. Only its `Display` text is persisted.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Handler は Task を実行して `T::Output` を返す
///
/// # 使用例
/// ```ignore
/// struct GreetHandler;
///
/// #[async_trait]
/// impl Handler<Greet> for GreetHandler {
///     async fn handle(&self, task: Greet) -> Result<String, BoxError> {
///         Ok(format!("Hello, {}!", task.name))
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<T: Task>: Send + Sync {
    async fn handle(&self, task: T) -> Result<T::Output, BoxError>;
}

/// DynHandler は object-safe な Handler の抽象化
///
/// TypedHandler<T> を DynHandler に変換することで、
/// HashMap<String, Arc<dyn DynHandler>> に格納可能にします。
#[async_trait]
pub trait DynHandler: Send + Sync {
    async fn handle_dyn(&self, payload: serde_json::Value) -> Result<serde_json::Value, BoxError>;
    fn task_type(&self) -> &str;
}

pub struct TypedHandler<T: Task, H: Handler<T>> {
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Task, H: Handler<T>> TypedHandler<T, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Task, H: Handler<T>> DynHandler for TypedHandler<T, H> {
    async fn handle_dyn(&self, payload: serde_json::Value) -> Result<serde_json::Value, BoxError> {
        let task: T = serde_json::from_value(payload)
            .map_err(|e| format!("payload decode for {}: {e}", T::TYPE))?;
        let output = self.handler.handle(task).await?;
        Ok(serde_json::to_value(output)?)
    }

    fn task_type(&self) -> &str {
        T::TYPE
    }
}

//! Task trait - 型付き Task の定義
//!
//! - Associated Constants (`const TYPE`)
//! - Associated Type (`Output`): ジョブの result フィールドに保存される値

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Task は task_type と型を対応付ける
///
/// # 使用例
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Greet {
///     name: String,
/// }
///
/// impl Task for Greet {
///     const TYPE: &'static str = "demo.greet.v1";
///     type Output = String;
/// }
/// ```
///
/// # Trait Bounds
/// - `Serialize`: task フィールドへの保存のため
/// - `DeserializeOwned`: worker 側での復元のため
/// - `Send + Sync + 'static`: 別タスクで実行するため
pub trait Task: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// task_type の定義
    ///
    /// # 命名規約
    /// - `{namespace}.{domain}.{action}.v{major}`
    const TYPE: &'static str;

    /// Value the handler returns on success.
    type Output: Serialize + DeserializeOwned + Send + 'static;
}

//! App - アプリケーション層
//!
//! ports を組み合わせてジョブのライフサイクルを実装します。
//!
//! # 主要コンポーネント
//! - **JobQueueBuilder**: キューの構築とワイヤリング
//! - **JobQueue**: broker / codec / handler を束ねたハンドル
//! - **Job**: broker 上のフィールドマップに対する型付きビュー
//! - **WorkerGroup**: 配送キューからジョブを取り出して実行

pub mod builder;
pub mod job;
pub mod queue;
pub mod worker_loop;

pub use self::builder::{BuildError, JobQueueBuilder};
pub use self::job::{Job, RESULT_POLL_INTERVAL};
pub use self::queue::JobQueue;
pub use self::worker_loop::WorkerGroup;

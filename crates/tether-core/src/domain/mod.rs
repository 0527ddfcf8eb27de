//! Domain model (ids, keys, status, options, task descriptors, errors).

pub mod errors;
pub mod ids;
pub mod keys;
pub mod options;
pub mod status;
pub mod task;

pub use errors::{JobError, RemoteExecutionError};
pub use ids::JobId;
pub use options::JobOptions;
pub use status::JobStatus;
pub use task::{TaskEnvelope, TaskType};

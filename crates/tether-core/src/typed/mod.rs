//! Typed - 型付き Task API
//!
//! Producers enqueue a concrete `Task` value; the broker only ever sees its
//! `TYPE` string and JSON payload. Workers go back from the string to a
//! handler through [`TypedRegistry::resolve`].

pub mod handler;
pub mod registry;
pub mod task;

pub use self::handler::{BoxError, DynHandler, Handler};
pub use self::registry::{RegistryError, TypedRegistry};
pub use self::task::Task;

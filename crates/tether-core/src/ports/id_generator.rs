//! IdGenerator port - job id の自動採番
//!
//! Used when `JobOptions::job_id` is `None`.

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use ulid::{Generator, Ulid};

use crate::domain::JobId;
use crate::ports::Clock;

pub trait IdGenerator: Send + Sync {
    fn generate_job_id(&self) -> JobId;
}

/// ULID ids stamped with the queue's clock.
///
/// Ids from one generator sort in creation order, including several in the
/// same millisecond. A ULID is 26 characters, inside the accepted id length.
pub struct UlidGenerator {
    clock: Arc<dyn Clock>,
    monotonic: Mutex<Generator>,
}

impl UlidGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            monotonic: Mutex::new(Generator::new()),
        }
    }
}

impl IdGenerator for UlidGenerator {
    fn generate_job_id(&self) -> JobId {
        let now = self.clock.now();
        let next = self
            .monotonic
            .lock()
            .ok()
            .and_then(|mut generator| generator.generate_from_datetime(SystemTime::from(now)).ok());
        // Poisoned lock or an exhausted millisecond: fall back to a random ULID.
        let ulid = next.unwrap_or_else(|| {
            Ulid::from_parts(now.timestamp_millis().max(0) as u64, rand::random())
        });
        JobId::from(ulid)
    }
}

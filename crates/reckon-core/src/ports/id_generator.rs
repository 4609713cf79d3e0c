//! IdGenerator port - task id generation.
//!
//! Uniqueness of task ids is the coordinator's job, not the registry's; the
//! coordinator asks one of these for every new task.
//!
//! # Implementations
//! - **SequentialIdGenerator**: `expr_1`, `expr_2`, ... (per process)
//! - **UlidGenerator**: `expr_<ULID>`, sortable and unique across restarts

use std::sync::atomic::{AtomicU64, Ordering};

use ulid::Ulid;

use crate::domain::TaskId;
use crate::ports::Clock;

pub trait IdGenerator: Send + Sync {
    fn generate_task_id(&self) -> TaskId;
}

/// Monotonic counter. Never hands out the same id twice within a process.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_task_id(&self) -> TaskId {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        TaskId::with_prefix(n)
    }
}

/// ULID-based generator. The timestamp part comes from the injected clock so
/// tests can pin it with `FixedClock`.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_task_id(&self) -> TaskId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        TaskId::with_prefix(ulid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn sequential_ids_count_from_one() {
        let id_gen = SequentialIdGenerator::new();
        assert_eq!(id_gen.generate_task_id().as_str(), "expr_1");
        assert_eq!(id_gen.generate_task_id().as_str(), "expr_2");
    }

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_task_id();
        let id2 = id_gen.generate_task_id();

        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("expr_"));
    }

    #[test]
    fn ulid_generator_with_fixed_clock_shares_timestamp() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id1 = id_gen.generate_task_id();
        let id2 = id_gen.generate_task_id();
        assert_ne!(id1, id2);

        let parse = |id: &TaskId| Ulid::from_string(&id.as_str()["expr_".len()..]).unwrap();
        assert_eq!(parse(&id1).timestamp_ms(), fixed_time.timestamp_millis() as u64);
        assert_eq!(parse(&id2).timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }
}

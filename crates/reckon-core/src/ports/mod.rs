//! Ports - seams for time and id generation.
//!
//! Both are traits so tests can swap in deterministic implementations.

pub mod clock;
pub mod id_generator;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, SequentialIdGenerator, UlidGenerator};

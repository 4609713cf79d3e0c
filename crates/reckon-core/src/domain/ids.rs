//! Domain identifiers (strongly-typed IDs).
//!
//! `Id<T>` wraps the textual id that travels over the wire. The marker type `T`
//! only exists at compile time, so a `JobId` can never be passed where a
//! `TaskId` is expected even though both are strings underneath.
//!
//! Ids are opaque: the registry accepts any caller-supplied string. Generators
//! (see `ports::id_generator`) use `IdMarker::prefix` to produce readable ids
//! such as `expr_1` or `job_7`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for each id kind.
pub trait IdMarker: Send + Sync + 'static {
    /// Prefix used by generators (e.g. `"expr_"`).
    fn prefix() -> &'static str;
}

/// Generic id type.
///
/// ```ignore
/// let task: TaskId = Id::new("expr_1");
/// let job: JobId = Id::new("job_1");
/// // let _: TaskId = job; // <- does not compile
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// Build `<prefix><suffix>`, e.g. `expr_` + `42`.
    pub fn with_prefix(suffix: impl fmt::Display) -> Self {
        Self::new(format!("{}{}", T::prefix(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// Serialized as the bare string so wire bodies read `"id": "expr_1"`.
impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

// ========================================
// Marker types
// ========================================

/// Marker for expression tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "expr_"
    }
}

/// Marker for binary-operation jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Job {}

impl IdMarker for Job {
    fn prefix() -> &'static str {
        "job_"
    }
}

/// Identifier of a client-visible task (one submitted expression).
pub type TaskId = Id<Task>;

/// Identifier of a binary-operation job handed to workers.
pub type JobId = Id<Job>;

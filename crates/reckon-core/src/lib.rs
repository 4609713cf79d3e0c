//! reckon-core
//!
//! Distributed evaluation of arithmetic expressions.
//!
//! # Modules
//! - **calc**: tokenizer, shunting-yard compiler, evaluator, job plans
//! - **domain**: ids, tasks, binary-operation jobs and reports
//! - **registry**: in-memory task/job store with the claim/report exchange
//! - **coordinator**: submission modes and the HTTP API (axum)
//! - **worker**: polling workers and their coordinator client (reqwest)
//! - **ports**: clock and id generation seams
//! - **config**: TOML configuration with defaults
//! - **observability**: registry counters

pub mod calc;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod observability;
pub mod ports;
pub mod registry;
pub mod worker;

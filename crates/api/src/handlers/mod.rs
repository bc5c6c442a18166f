//! Request handlers, one module per resource.
//!
//! Handlers validate input through `taskfund_core`, check object-level
//! permissions through [`access`], and delegate persistence to the
//! repositories in `taskfund_db`.

pub mod access;
pub mod accounts;
pub mod income;
pub mod outcome;
pub mod payment;
pub mod project;
pub mod subtask;
pub mod task;

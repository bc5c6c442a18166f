//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod income;
pub mod outcome;
pub mod payment;
pub mod project;
pub mod session;
pub mod subtask;
pub mod task;
pub mod user;

//! Domain rules for the project-management and financial-tracking backend.
//!
//! Everything here is pure: no database, no HTTP. The `db` and `api` crates
//! call into these modules to validate input and decide status changes.

#[macro_use]
mod text_enum;

pub mod access;
pub mod accounts;
pub mod budget;
pub mod error;
pub mod hierarchy;
pub mod ledger;
pub mod paging;
pub mod payment;
pub mod schedule;
pub mod status;
pub mod target;
pub mod types;

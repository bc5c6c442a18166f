//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Writes that touch more than
//! one row open their own transaction and run the matching
//! [`propagation`](crate::propagation) step before committing.

pub mod access_repo;
pub mod expert_repo;
pub mod income_repo;
pub mod outcome_repo;
pub mod payment_repo;
pub mod project_repo;
pub mod schedule_repo;
pub mod session_repo;
pub mod subtask_repo;
pub mod task_repo;
pub mod user_repo;

pub use access_repo::AccessRepo;
pub use expert_repo::ExpertRepo;
pub use income_repo::IncomeRepo;
pub use outcome_repo::OutcomeRepo;
pub use payment_repo::PaymentRepo;
pub use project_repo::ProjectRepo;
pub use schedule_repo::ScheduleRepo;
pub use session_repo::SessionRepo;
pub use subtask_repo::SubTaskRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;

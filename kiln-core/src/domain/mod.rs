//! Core domain types
//!
//! These types mirror what the machine reports about recipes, jobs and
//! their execution. The client only ever reads them; the machine owns them.

pub mod job;
pub mod machine;
pub mod recipe;
pub mod report;

//! Data models for the newspaper agency.
//!
//! Request types carry raw form input; each implements `Validate` and cleans
//! into the input type the repository persists.

mod dashboard;
mod newspaper;
mod redactor;
mod topic;

pub use dashboard::*;
pub use newspaper::*;
pub use redactor::*;
pub use topic::*;

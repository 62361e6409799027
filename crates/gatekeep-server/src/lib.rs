//! Reference API server for gatekeep
//!
//! Wires the validation layers to an org/user/team directory.

pub mod directory;
pub mod routes;
pub mod validators;

pub use directory::{Directory, MemoryDirectory, Org, Plan, Team, User};
pub use routes::{app, AppState};

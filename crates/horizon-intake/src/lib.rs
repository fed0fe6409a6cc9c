//! Horizon Talents intake library: the public application workflow, the admin
//! panel services, and the trait seams over the managed database, storage,
//! account, and e-mail collaborators.

pub mod admin;
pub mod config;
pub mod error;
pub mod intake;
pub mod notify;
pub mod telemetry;

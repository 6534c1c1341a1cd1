//! agencydesk: recruitment agency records with a soft-delete lifecycle.
//!
//! Candidates, employers, job orders and their dependents are never removed
//! by a normal delete. They move to a recycle bin as one batch, can be
//! restored together, and only a super admin can purge them for good.

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod repository;
pub mod schema;
pub mod services;

pub use app::AppContext;
pub use config::{Config, Settings};
pub use error::{LifecycleError, LifecycleResult};
pub use registry::EntityType;
pub use services::{LifecycleService, OpResult};

//! Postgres storage for the tarn memory store.
//!
//! Tenancy is schema-per-tenant: provisioning creates a schema per tenant and
//! every query runs on a connection whose search path was bound to exactly
//! one tenant.

pub mod db;
pub mod models;
pub mod schema;

mod error;

pub use error::{Error, Result};

//! Core domain types for the tarn memory store.
//!
//! Everything here is storage-agnostic: content validation, tenant naming
//! rules, tag canonicalization and the lemmatizer behind it.

pub mod entities;
pub mod lemma;
pub mod memory;
pub mod tag;
pub mod tenant;

mod error;

pub use error::{Error, Result};

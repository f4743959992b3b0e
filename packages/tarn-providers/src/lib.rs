//! Embedding and feature-extraction providers.

pub mod embedding;
pub mod extractor;
pub mod mock;

mod error;

pub use error::{Error, Result};

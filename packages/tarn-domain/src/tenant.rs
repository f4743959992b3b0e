//! Tenant name rules.
//!
//! Tenant names are interpolated directly into `SET search_path` and DDL
//! statements, so the character set here is the injection boundary for the
//! whole storage layer.

use crate::error::{Error, Result};

/// Schema names that must never be claimed by a tenant.
pub const RESERVED_SCHEMAS: &[&str] = &["public", "information_schema"];

/// Validates that `name` is usable as a Postgres schema name.
///
/// Only ASCII alphanumerics and underscores are accepted. Anything else,
/// including whitespace, quotes and hyphens, is rejected.
pub fn validate_name(name: &str) -> Result<()> {
	if name.is_empty() {
		return Err(Error::InvalidTenantName("Tenant name must be non-empty.".to_string()));
	}
	if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
		return Err(Error::InvalidTenantName(format!(
			"Tenant name {name:?} may only contain ASCII letters, digits and underscores."
		)));
	}

	Ok(())
}

/// Whether `name` collides with a schema Postgres owns.
pub fn is_reserved(name: &str) -> bool {
	RESERVED_SCHEMAS.contains(&name) || name.starts_with("pg_")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn validate_name_accepts_word_characters() {
		for name in ["acme", "acme_corp", "Tenant42", "_private"] {
			assert!(validate_name(name).is_ok(), "{name} should be valid");
		}
	}

	#[test]
	fn validate_name_rejects_punctuation() {
		for name in ["", "acme corp", "acme-corp", "acme;drop", "acme'||'x", "acme\"x"] {
			assert!(validate_name(name).is_err(), "{name:?} should be rejected");
		}
	}

	#[test]
	fn reserved_schemas_are_flagged() {
		assert!(is_reserved("public"));
		assert!(is_reserved("information_schema"));
		assert!(is_reserved("pg_catalog"));
		assert!(!is_reserved("acme"));
	}
}

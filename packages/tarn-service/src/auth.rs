use sqlx::Acquire;
use time::OffsetDateTime;
use uuid::Uuid;

use tarn_storage::models::ApiKeyRow;

use crate::{Error, Result, TarnService};

pub const KEY_PREFIX: &str = "tarn_sk_";

// Two v4 UUIDs give 32 bytes of OS randomness behind the prefix.
fn generate_key() -> String {
	format!("{KEY_PREFIX}{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

// Only the hash is ever stored; the plaintext exists once, in the response
// that hands it to the caller.
fn hash_key(key: &str) -> String {
	blake3::hash(key.as_bytes()).to_hex().to_string()
}

impl TarnService {
	/// Mints a key for `tenant` and returns the plaintext. It cannot be
	/// recovered later.
	pub async fn issue_key(&self, tenant: &str, description: Option<&str>) -> Result<String> {
		tarn_domain::tenant::validate_name(tenant)?;

		let key = generate_key();
		let description = description
			.map(str::to_string)
			.unwrap_or_else(|| format!("API key issued at {}", OffsetDateTime::now_utc()));
		let mut conn = self.db.acquire_tenant(tenant).await?;

		sqlx::query("INSERT INTO api_keys (key_hash, description) VALUES ($1, $2)")
			.bind(hash_key(&key))
			.bind(description.as_str())
			.execute(&mut *conn)
			.await?;

		Ok(key)
	}

	/// Resolves `key` to the tenant that owns it, touching `last_used` in the
	/// same statement so validation and the usage stamp cannot diverge.
	pub async fn validate_key(&self, key: &str) -> Result<String> {
		if !key.starts_with(KEY_PREFIX) {
			return Err(Error::Authorization { message: "Invalid API key format.".to_string() });
		}

		let hash = hash_key(key);

		for tenant in tarn_storage::schema::list_tenants(&self.db).await? {
			let mut conn = self.db.acquire_tenant(&tenant).await?;
			let result =
				sqlx::query("UPDATE api_keys SET last_used = now() WHERE key_hash = $1 AND active")
					.bind(hash.as_str())
					.execute(&mut *conn)
					.await?;

			if result.rows_affected() > 0 {
				return Ok(tenant);
			}
		}

		Err(Error::Authorization { message: "API key not found or inactive.".to_string() })
	}

	/// Replaces keys for `tenant` in one transaction.
	///
	/// With `old_key` set, only that key is deactivated; an unmatched old key
	/// deactivates nothing and is not an error. Without it, every active key
	/// goes. Either way the new plaintext is live once this returns.
	pub async fn rotate_key(&self, tenant: &str, old_key: Option<&str>) -> Result<String> {
		tarn_domain::tenant::validate_name(tenant)?;

		let mut conn = self.db.acquire_tenant(tenant).await?;
		let mut tx = conn.begin().await?;

		match old_key {
			Some(old) => {
				sqlx::query("UPDATE api_keys SET active = false WHERE key_hash = $1 AND active")
					.bind(hash_key(old))
					.execute(&mut *tx)
					.await?;
			},
			None => {
				sqlx::query("UPDATE api_keys SET active = false WHERE active")
					.execute(&mut *tx)
					.await?;
			},
		}

		let key = generate_key();

		sqlx::query("INSERT INTO api_keys (key_hash, description) VALUES ($1, $2)")
			.bind(hash_key(&key))
			.bind("Rotated key")
			.execute(&mut *tx)
			.await?;
		tx.commit().await?;

		Ok(key)
	}

	/// Key records for `tenant`, newest first. Hashes stay in storage.
	pub async fn list_keys(&self, tenant: &str) -> Result<Vec<ApiKeyRow>> {
		tarn_domain::tenant::validate_name(tenant)?;

		let mut conn = self.db.acquire_tenant(tenant).await?;
		let keys = sqlx::query_as::<_, ApiKeyRow>(
			"\
SELECT id, description, created_at, last_used, active
FROM api_keys
ORDER BY created_at DESC, id DESC",
		)
		.fetch_all(&mut *conn)
		.await?;

		Ok(keys)
	}

	/// Deactivates one key by id. Returns whether a live key was affected.
	pub async fn deactivate_key(&self, tenant: &str, id: i64) -> Result<bool> {
		tarn_domain::tenant::validate_name(tenant)?;

		let mut conn = self.db.acquire_tenant(tenant).await?;
		let result = sqlx::query("UPDATE api_keys SET active = false WHERE id = $1 AND active")
			.bind(id)
			.execute(&mut *conn)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}

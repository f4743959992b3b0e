//! Tenant schema provisioning.
//!
//! Each tenant owns a Postgres schema carrying its own `memories` and
//! `api_keys` tables. Provisioning runs the same DDL for every tenant with
//! the embedding dimension substituted in.

use crate::{Result, db::Db, error::Error};

// One global lock serializes provisioning; the DDL is idempotent so
// concurrent callers just wait their turn.
const PROVISION_LOCK_ID: i64 = 7_461_114;

pub fn render_tenant_ddl(vector_dim: u32) -> String {
	include_str!("../../../sql/tenant_init.sql").replace("<VECTOR_DIM>", &vector_dim.to_string())
}

/// Creates `tenant`'s schema and tables if they do not exist yet.
pub async fn ensure_tenant(db: &Db, tenant: &str, vector_dim: u32) -> Result<()> {
	tarn_domain::tenant::validate_name(tenant)?;

	if tarn_domain::tenant::is_reserved(tenant) {
		return Err(Error::Domain(tarn_domain::Error::InvalidTenantName(format!(
			"Tenant name {tenant:?} is reserved."
		))));
	}

	let ddl = render_tenant_ddl(vector_dim);
	// Advisory locks are held per connection. Use a single transaction so the
	// lock is scoped to one connection and released when the transaction ends.
	let mut tx = db.pool.begin().await?;

	sqlx::query("SELECT pg_advisory_xact_lock($1)")
		.bind(PROVISION_LOCK_ID)
		.execute(&mut *tx)
		.await?;
	sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {tenant}")).execute(&mut *tx).await?;
	// SET LOCAL scopes the path to this transaction, so the DDL below lands
	// in the tenant schema without touching the connection's default.
	sqlx::query(&format!("SET LOCAL search_path TO {tenant}, public"))
		.execute(&mut *tx)
		.await?;

	for statement in ddl.split(';') {
		let trimmed = statement.trim();

		if trimmed.is_empty() {
			continue;
		}

		sqlx::query(trimmed).execute(&mut *tx).await?;
	}

	tx.commit().await?;

	tracing::info!(tenant, vector_dim, "tenant schema ensured");

	Ok(())
}

pub async fn tenant_exists(db: &Db, tenant: &str) -> Result<bool> {
	tarn_domain::tenant::validate_name(tenant)?;

	// Reserved schemas exist but are never tenants; answering for them would
	// contradict list_tenants.
	if tarn_domain::tenant::is_reserved(tenant) {
		return Err(Error::Domain(tarn_domain::Error::InvalidTenantName(format!(
			"Tenant name {tenant:?} is reserved."
		))));
	}

	let mut conn = db.acquire_system().await?;
	let exists = sqlx::query_scalar::<_, bool>(
		"SELECT EXISTS (SELECT 1 FROM information_schema.schemata WHERE schema_name = $1)",
	)
	.bind(tenant)
	.fetch_one(&mut *conn)
	.await?;

	Ok(exists)
}

/// All tenant schemas, alphabetically.
pub async fn list_tenants(db: &Db) -> Result<Vec<String>> {
	let mut conn = db.acquire_system().await?;
	let tenants = sqlx::query_scalar::<_, String>(
		"\
SELECT schema_name
FROM information_schema.schemata
WHERE schema_name NOT IN ('public', 'information_schema')
	AND schema_name NOT LIKE 'pg\\_%'
ORDER BY schema_name",
	)
	.fetch_all(&mut *conn)
	.await?;

	Ok(tenants)
}

/// Drops `tenant`'s schema and everything in it.
pub async fn drop_tenant(db: &Db, tenant: &str) -> Result<()> {
	tarn_domain::tenant::validate_name(tenant)?;

	if tarn_domain::tenant::is_reserved(tenant) {
		return Err(Error::Domain(tarn_domain::Error::InvalidTenantName(format!(
			"Tenant name {tenant:?} is reserved."
		))));
	}

	sqlx::query(&format!("DROP SCHEMA IF EXISTS {tenant} CASCADE")).execute(&db.pool).await?;

	tracing::info!(tenant, "tenant schema dropped");

	Ok(())
}

use std::time::Duration;

use sqlx::{
	PgPool,
	pool::PoolConnection,
	postgres::{PgPoolOptions, Postgres},
};

use crate::Result;

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &tarn_config::Postgres) -> Result<Self> {
		let pool = PgPoolOptions::new()
			.min_connections(cfg.pool_min_conns)
			.max_connections(cfg.pool_max_conns)
			.acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
			.connect(&cfg.dsn)
			.await?;

		sqlx::query("CREATE EXTENSION IF NOT EXISTS vector").execute(&pool).await?;

		Ok(Self { pool })
	}

	/// Checks out a connection bound to the `public` schema only.
	pub async fn acquire_system(&self) -> Result<PoolConnection<Postgres>> {
		let mut conn = self.pool.acquire().await?;

		sqlx::query("SET search_path TO public").execute(&mut *conn).await?;

		Ok(conn)
	}

	/// Checks out a connection bound to `tenant`'s schema.
	///
	/// Pooled connections are reused across tenants, so the search path must
	/// be rebound on every checkout. The name is validated here because this
	/// statement interpolates it; validation is the only quoting applied.
	pub async fn acquire_tenant(&self, tenant: &str) -> Result<PoolConnection<Postgres>> {
		tarn_domain::tenant::validate_name(tenant)?;

		let mut conn = self.pool.acquire().await?;

		sqlx::query(&format!("SET search_path TO {tenant}, public")).execute(&mut *conn).await?;

		Ok(conn)
	}
}

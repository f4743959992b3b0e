use tarn_providers::embedding::HealthReport;
use tarn_storage::schema;

use crate::{Result, TarnService};

impl TarnService {
	pub async fn create_tenant(&self, tenant: &str) -> Result<()> {
		schema::ensure_tenant(&self.db, tenant, self.cfg.providers.embedding.dimensions).await?;

		Ok(())
	}

	pub async fn tenant_exists(&self, tenant: &str) -> Result<bool> {
		Ok(schema::tenant_exists(&self.db, tenant).await?)
	}

	pub async fn list_tenants(&self) -> Result<Vec<String>> {
		Ok(schema::list_tenants(&self.db).await?)
	}

	pub async fn drop_tenant(&self, tenant: &str) -> Result<()> {
		schema::drop_tenant(&self.db, tenant).await?;

		Ok(())
	}

	/// Live memories in `tenant`.
	pub async fn memory_count(&self, tenant: &str) -> Result<i64> {
		tarn_domain::tenant::validate_name(tenant)?;

		let mut conn = self.db.acquire_tenant(tenant).await?;
		let count =
			sqlx::query_scalar::<_, i64>("SELECT count(*) FROM memories WHERE NOT forgotten")
				.fetch_one(&mut *conn)
				.await?;

		Ok(count)
	}

	pub async fn embedding_health(&self) -> HealthReport {
		self.providers.embedding.health(&self.cfg.providers.embedding).await
	}
}

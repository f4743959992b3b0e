use sqlx::PgPool;

use tarn_config::{Config, EmbeddingProviderConfig, Postgres, Storage};
use tarn_domain::memory::MAX_CONTENT_CHARS;
use tarn_service::{Error, TarnService};
use tarn_storage::db::Db;

fn test_config(provider: Option<&str>) -> Config {
	Config {
		storage: Storage {
			postgres: Postgres {
				dsn: "postgres://localhost:1/tarn_unreachable".to_string(),
				pool_min_conns: 0,
				pool_max_conns: 1,
				acquire_timeout_secs: 1,
			},
		},
		providers: tarn_config::Providers {
			embedding: EmbeddingProviderConfig {
				provider: provider.map(str::to_string),
				url: "http://localhost:11434".to_string(),
				model: None,
				dimensions: 8,
				timeout_secs: 5,
			},
		},
	}
}

// The pool is lazy, so these tests prove the operations fail or short-circuit
// before any database work happens.
fn service(provider: Option<&str>) -> TarnService {
	let cfg = test_config(provider);
	let pool = PgPool::connect_lazy(&cfg.storage.postgres.dsn).expect("Failed to build pool.");
	let lemmatizer = std::sync::Arc::new(tarn_domain::lemma::Lemmatizer::new());
	let providers = tarn_service::Providers::from_config(&cfg, lemmatizer);

	TarnService::with_providers(cfg, Db { pool }, providers)
}

#[tokio::test]
async fn search_short_circuits_on_blank_query_and_zero_limit() {
	let service = service(None);

	assert!(service.search("acme", "", 10).await.unwrap().is_empty());
	assert!(service.search("acme", "  \t\n ", 10).await.unwrap().is_empty());
	assert!(service.search("acme", "pizza", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn store_rejects_invalid_content() {
	let service = service(Some("mock"));
	let oversized = "x".repeat(MAX_CONTENT_CHARS + 1);

	for content in ["", "   \n ", oversized.as_str()] {
		assert!(matches!(
			service.store("acme", content, &[]).await,
			Err(Error::Validation(_))
		));
	}
}

#[tokio::test]
async fn store_rejects_invalid_tenant_names() {
	let service = service(Some("mock"));

	for tenant in ["", "tenant-name", "tenant name", "tenant'; DROP TABLE memories; --"] {
		assert!(matches!(
			service.store(tenant, "some content", &[]).await,
			Err(Error::Validation(_))
		));
	}
}

#[tokio::test]
async fn reserved_schema_names_are_rejected_across_admin_operations() {
	let service = service(Some("mock"));

	for tenant in ["public", "information_schema", "pg_catalog"] {
		assert!(matches!(service.create_tenant(tenant).await, Err(Error::Validation(_))));
		assert!(matches!(service.tenant_exists(tenant).await, Err(Error::Validation(_))));
		assert!(matches!(service.drop_tenant(tenant).await, Err(Error::Validation(_))));
	}
}

#[tokio::test]
async fn store_fails_without_an_embedding_provider() {
	let service = service(None);
	let err = service.store("acme", "some content", &[]).await.unwrap_err();

	assert!(matches!(err, Error::Provider(tarn_providers::Error::NotConfigured)));
}

#[tokio::test]
async fn validate_key_rejects_malformed_keys() {
	let service = service(Some("mock"));

	for key in ["", "sk_nope", "pond_sk_wrong_prefix", "tarn_pk_other"] {
		assert!(matches!(
			service.validate_key(key).await,
			Err(Error::Authorization { .. })
		));
	}
}

#[tokio::test]
async fn rotate_key_rejects_invalid_tenant_names() {
	let service = service(Some("mock"));
	let err = service.rotate_key("tenant-name", None).await.unwrap_err();

	assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn embedding_health_reports_missing_provider() {
	let service = service(None);
	let report = service.embedding_health().await;

	assert!(!report.healthy);
	assert!(report.error.is_some());
}

#[tokio::test]
async fn embedding_health_reports_mock_provider() {
	let service = service(Some("mock"));
	let report = service.embedding_health().await;

	assert!(report.healthy);
	assert_eq!(report.dimension, Some(8));
}

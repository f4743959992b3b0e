//! End-to-end flows against a real Postgres with pgvector.
//!
//! The embedding provider is stubbed with fixed unit vectors keyed off marker
//! words, so cosine distances in these tests are exact by construction.

use std::sync::Arc;

use tarn_config::{Config, EmbeddingProviderConfig, Postgres, Storage};
use tarn_domain::lemma::Lemmatizer;
use tarn_providers::embedding::HealthReport;
use tarn_service::{BoxFuture, EmbeddingProvider, Error, Providers, TarnService};
use tarn_storage::db::Db;
use tarn_testkit::TestDatabase;

const DIM: u32 = 8;

struct StubEmbedding;
impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, tarn_providers::Result<Vec<f32>>> {
		let vector = vector_for(text);

		Box::pin(async move { Ok(vector) })
	}

	fn health<'a>(&'a self, _cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, HealthReport> {
		Box::pin(async {
			HealthReport {
				healthy: true,
				service: "stub".to_string(),
				model: None,
				dimension: Some(DIM),
				latency_ms: Some(0.),
				error: None,
			}
		})
	}
}

// Unit vectors with known cosine similarity to the "pizza" anchor axis:
// nearby 0.8, duplicate 0.95, band 0.85, lukewarm 0.45, everything else 0.
fn vector_for(text: &str) -> Vec<f32> {
	let lowered = text.to_lowercase();
	let mut v = vec![0.0_f32; DIM as usize];

	if lowered.contains("duplicate") {
		v[0] = 0.95;
		v[1] = 0.312_25;
	} else if lowered.contains("nearby") {
		v[0] = 0.8;
		v[1] = 0.6;
	} else if lowered.contains("band") {
		v[0] = 0.85;
		v[1] = 0.526_78;
	} else if lowered.contains("lukewarm") {
		v[0] = 0.45;
		v[1] = 0.893_03;
	} else if lowered.contains("crime") {
		v[3] = 1.;
	} else if lowered.contains("pizza") {
		v[0] = 1.;
	} else {
		v[2] = 1.;
	}

	v
}

fn config_for(dsn: &str) -> Config {
	Config {
		storage: Storage {
			postgres: Postgres {
				dsn: dsn.to_string(),
				pool_min_conns: 0,
				pool_max_conns: 4,
				acquire_timeout_secs: 10,
			},
		},
		providers: tarn_config::Providers {
			embedding: EmbeddingProviderConfig {
				provider: Some("mock".to_string()),
				url: "http://localhost:11434".to_string(),
				model: None,
				dimensions: DIM,
				timeout_secs: 5,
			},
		},
	}
}

async fn service_for(dsn: &str) -> TarnService {
	let cfg = config_for(dsn);
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");
	let mut providers = Providers::from_config(&cfg, Arc::new(Lemmatizer::new()));

	providers.embedding = Arc::new(StubEmbedding);

	TarnService::with_providers(cfg, db, providers)
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TARN_PG_DSN to run."]
async fn store_pipeline_persists_derived_metadata() {
	let Some(base_dsn) = tarn_testkit::env_dsn() else {
		eprintln!("Skipping store_pipeline_persists_derived_metadata; set TARN_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service_for(test_db.dsn()).await;

	service.create_tenant("acme").await.expect("Failed to create tenant.");

	let outcome = service
		.store("acme", "  Sparkle stole a pizza from the kitchen counter  ", &[
			"Kitchen Crimes".to_string(),
		])
		.await
		.expect("Failed to store memory.");
	let memory = &outcome.memory;

	assert!(memory.id.is_some());
	assert_eq!(memory.content, "Sparkle stole a pizza from the kitchen counter");
	assert!(memory.metadata.tags.contains("crime-kitchen"));
	assert!(memory.metadata.tags.contains("sparkle"));
	assert!(memory.metadata.entities.iter().any(|entity| entity.text == "Sparkle"));
	assert!(memory.metadata.actions.iter().any(|action| action.lemma == "steal"));
	assert_eq!(memory.embedding.as_deref(), Some(vector_for(&memory.content).as_slice()));

	assert_eq!(service.memory_count("acme").await.expect("Failed to count."), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TARN_PG_DSN to run."]
async fn splash_returns_only_the_similarity_band() {
	let Some(base_dsn) = tarn_testkit::env_dsn() else {
		eprintln!("Skipping splash_returns_only_the_similarity_band; set TARN_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service_for(test_db.dsn()).await;

	service.create_tenant("acme").await.expect("Failed to create tenant.");

	let store = |content: &'static str| service.store("acme", content, &[]);
	let first = store("Completely unrelated note about taxes").await.expect("Failed to store.");

	// Nothing to splash against on the first write.
	assert!(first.splashes.is_empty());

	let nearby =
		store("The nearby bakery sells focaccia").await.expect("Failed to store.").memory;

	store("A duplicate account of the stolen flatbread").await.expect("Failed to store.");

	let band = store("The band played in the kitchen").await.expect("Failed to store.").memory;

	// Forgotten memories never splash, even inside the band.
	{
		let mut conn =
			service.db.acquire_tenant("acme").await.expect("Failed to acquire connection.");

		sqlx::query("UPDATE memories SET forgotten = true WHERE id = $1")
			.bind(band.id)
			.execute(&mut *conn)
			.await
			.expect("Failed to forget memory.");
	}

	let outcome =
		store("Sparkle stole a pizza from the counter").await.expect("Failed to store.");
	let splash_ids = outcome.splashes.iter().map(|memory| memory.id).collect::<Vec<_>>();

	// Distance 0.2 is in the band; 0.05 (duplicate), 1.0 (unrelated) and the
	// forgotten 0.15 are not.
	assert_eq!(splash_ids, vec![nearby.id]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TARN_PG_DSN to run."]
async fn store_survives_splash_discovery_failing_after_the_insert() {
	let Some(base_dsn) = tarn_testkit::env_dsn() else {
		eprintln!("Skipping store_survives_splash_discovery_failing_after_the_insert.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service_for(test_db.dsn()).await;

	service.create_tenant("acme").await.expect("Failed to create tenant.");

	// Plant a row inside the splash band whose metadata does not decode, so
	// the insert succeeds and only the splash read afterwards fails.
	{
		let mut conn =
			service.db.acquire_tenant("acme").await.expect("Failed to acquire connection.");

		sqlx::query(
			"INSERT INTO memories (content, embedding, metadata) VALUES ($1, $2::text::vector, $3)",
		)
		.bind("planted row")
		.bind("[0.8,0.6,0,0,0,0,0,0]")
		.bind(serde_json::json!({ "created_at": 123 }))
		.execute(&mut *conn)
		.await
		.expect("Failed to plant row.");
	}

	let outcome = service
		.store("acme", "Sparkle stole a pizza from the counter", &[])
		.await
		.expect("Store must survive a failing splash read.");

	assert!(outcome.memory.id.is_some());
	assert!(outcome.splashes.is_empty());
	assert_eq!(service.memory_count("acme").await.expect("Failed to count."), 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TARN_PG_DSN to run."]
async fn search_blends_text_feature_and_semantic_signals() {
	let Some(base_dsn) = tarn_testkit::env_dsn() else {
		eprintln!("Skipping search_blends_text_feature_and_semantic_signals; set TARN_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service_for(test_db.dsn()).await;

	service.create_tenant("acme").await.expect("Failed to create tenant.");

	let pizza = service
		.store("acme", "Sparkle stole a pizza from the kitchen counter", &[
			"Kitchen Crimes".to_string(),
		])
		.await
		.expect("Failed to store.")
		.memory;
	let taxes = service
		.store("acme", "Completely unrelated note about taxes", &[])
		.await
		.expect("Failed to store.")
		.memory;
	let lukewarm = service
		.store("acme", "A lukewarm take on flatbread", &[])
		.await
		.expect("Failed to store.")
		.memory;

	// Text, semantic (similarity 1.0) and entity feature all fire for the
	// pizza memory; the lukewarm one sits below the semantic floor and has no
	// other signal.
	let hits = service.search("acme", "pizza", 10).await.expect("Failed to search.");
	let ids = hits.iter().map(|hit| hit.memory.id).collect::<Vec<_>>();

	assert!(ids.contains(&pizza.id));
	assert!(!ids.contains(&taxes.id));
	assert!(!ids.contains(&lukewarm.id));
	assert!(hits[0].score > 0.4, "text plus semantic should clear the semantic weight alone");

	// A canonical-tag query reaches the memory through the feature channel.
	let hits = service.search("acme", "crime-kitchen", 10).await.expect("Failed.");

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].memory.id, pizza.id);

	// Limit applies after ranking.
	let hits = service.search("acme", "pizza", 1).await.expect("Failed to search.");

	assert_eq!(hits.len(), 1);
	assert_eq!(hits[0].memory.id, pizza.id);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TARN_PG_DSN to run."]
async fn api_keys_issue_validate_rotate_and_deactivate() {
	let Some(base_dsn) = tarn_testkit::env_dsn() else {
		eprintln!("Skipping api_keys_issue_validate_rotate_and_deactivate; set TARN_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service_for(test_db.dsn()).await;

	service.create_tenant("alpha").await.expect("Failed to create tenant.");
	service.create_tenant("beta").await.expect("Failed to create tenant.");

	let alpha_key =
		service.issue_key("alpha", Some("ci deploys")).await.expect("Failed to issue key.");
	let beta_key = service.issue_key("beta", None).await.expect("Failed to issue key.");

	// Keys resolve to their own tenant, never the other.
	assert_eq!(service.validate_key(&alpha_key).await.expect("Failed to validate."), "alpha");
	assert_eq!(service.validate_key(&beta_key).await.expect("Failed to validate."), "beta");

	let keys = service.list_keys("alpha").await.expect("Failed to list keys.");

	assert_eq!(keys.len(), 1);
	assert_eq!(keys[0].description.as_deref(), Some("ci deploys"));
	assert!(keys[0].last_used.is_some(), "validation stamps last_used");
	assert!(keys[0].active);

	// Rotation invalidates the old key atomically.
	let rotated =
		service.rotate_key("alpha", Some(&alpha_key)).await.expect("Failed to rotate key.");

	assert!(matches!(
		service.validate_key(&alpha_key).await,
		Err(Error::Authorization { .. })
	));
	assert_eq!(service.validate_key(&rotated).await.expect("Failed to validate."), "alpha");

	// Rotating with an unknown old key deactivates nothing; the current key
	// survives and the fresh one works too.
	let extra = service
		.rotate_key("alpha", Some("tarn_sk_doesnotexist"))
		.await
		.expect("Failed to rotate key.");

	assert_eq!(service.validate_key(&rotated).await.expect("Failed to validate."), "alpha");
	assert_eq!(service.validate_key(&extra).await.expect("Failed to validate."), "alpha");

	// Rotating without an old key retires everything active at once.
	let only = service.rotate_key("alpha", None).await.expect("Failed to rotate key.");

	for stale in [&rotated, &extra] {
		assert!(matches!(
			service.validate_key(stale).await,
			Err(Error::Authorization { .. })
		));
	}

	// Deactivation by id kills the key.
	let keys = service.list_keys("alpha").await.expect("Failed to list keys.");
	let live = keys.iter().find(|key| key.active).expect("Expected an active key.");

	assert!(service.deactivate_key("alpha", live.id).await.expect("Failed to deactivate."));
	assert!(!service.deactivate_key("alpha", live.id).await.expect("Failed to deactivate."));
	assert!(matches!(
		service.validate_key(&only).await,
		Err(Error::Authorization { .. })
	));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TARN_PG_DSN to run."]
async fn recent_reads_newest_first_within_window() {
	let Some(base_dsn) = tarn_testkit::env_dsn() else {
		eprintln!("Skipping recent_reads_newest_first_within_window; set TARN_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service_for(test_db.dsn()).await;

	service.create_tenant("acme").await.expect("Failed to create tenant.");

	let first = service.store("acme", "first note", &[]).await.expect("Failed.").memory;

	// Keep created_at strictly ordered.
	tokio::time::sleep(std::time::Duration::from_millis(10)).await;

	let second = service.store("acme", "second note", &[]).await.expect("Failed.").memory;
	let since = time::OffsetDateTime::now_utc() - time::Duration::hours(1);
	let recent = service.recent("acme", since, 10).await.expect("Failed to read recent.");
	let ids = recent.iter().map(|memory| memory.id).collect::<Vec<_>>();

	assert_eq!(ids, vec![second.id, first.id]);

	let future = time::OffsetDateTime::now_utc() + time::Duration::hours(1);

	assert!(service.recent("acme", future, 10).await.expect("Failed.").is_empty());
	assert!(service.recent("acme", since, 1).await.expect("Failed.").len() == 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

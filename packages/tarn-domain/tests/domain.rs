use tarn_domain::{lemma::Lemmatizer, memory::Memory, tag, tenant};

#[test]
fn tag_and_content_rules_compose() {
	let lemmatizer = Lemmatizer::new();
	let mut memory = Memory::new("  Notes on sourdough starters  ").unwrap();

	for tag in tag::canonicalize_all(&lemmatizer, ["Sourdough Starters", "starters, sourdough"]) {
		memory.add_canonical_tag(tag);
	}

	assert_eq!(memory.content, "Notes on sourdough starters");
	// Both phrasings collapse to the same canonical tag.
	assert_eq!(memory.metadata.tags.len(), 1);
	assert!(memory.metadata.tags.contains("sourdough-starter"));
}

#[test]
fn tenant_names_guard_search_path_interpolation() {
	assert!(tenant::validate_name("acme_corp").is_ok());
	assert!(tenant::validate_name("tenant'; DROP TABLE memories; --").is_err());
	assert!(tenant::validate_name("tenant-name").is_err());
	assert!(tenant::validate_name("tenant name").is_err());
	assert!(tenant::validate_name("").is_err());
}

#[test]
fn metadata_round_trips_through_json() {
	let lemmatizer = Lemmatizer::new();
	let mut memory = Memory::new("Sparkle stole pizza").unwrap();

	memory.add_canonical_tag(tag::canonicalize(&lemmatizer, "pizza heists"));

	let json = serde_json::to_value(&memory.metadata).unwrap();
	let restored: tarn_domain::memory::Metadata = serde_json::from_value(json).unwrap();

	assert_eq!(restored.tags, memory.metadata.tags);
	assert_eq!(restored.created_at, memory.metadata.created_at);
}

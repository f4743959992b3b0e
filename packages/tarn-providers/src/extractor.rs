//! Rule-based feature extraction.
//!
//! Pulls named entities, verb lemmas and tag candidates out of memory content
//! with token-level heuristics. Entirely CPU-bound, so callers on an async
//! runtime should run it on a blocking thread.

use tarn_domain::{
	entities::{Action, Entity},
	lemma::Lemmatizer,
};

use crate::error::Result;

/// Cap on how many entities feed the tag candidates.
const MAX_ENTITY_CANDIDATES: usize = 3;

/// Everything the extractor learned from one piece of content.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
	pub entities: Vec<Entity>,
	pub actions: Vec<Action>,
	/// Raw tag suggestions, most informative first. Not canonicalized.
	pub candidate_tags: Vec<String>,
}

pub fn extract(lemmatizer: &Lemmatizer, text: &str) -> Result<Extraction> {
	let tokens = lemmatizer.tokens(text);
	let entities = collect_entities(lemmatizer, &tokens);
	let actions = collect_actions(lemmatizer, &tokens);
	let candidate_tags = collect_candidates(lemmatizer, &tokens, &entities);

	Ok(Extraction { entities, actions, candidate_tags })
}

// Runs of capitalized non-stopword tokens are treated as one proper noun, so
// "New York" stays a single entity.
fn collect_entities(lemmatizer: &Lemmatizer, tokens: &[&str]) -> Vec<Entity> {
	let mut entities = Vec::<Entity>::new();
	let mut run = Vec::<&str>::new();

	for &token in tokens.iter().chain(std::iter::once(&"")) {
		let capitalized = token.chars().next().map(char::is_uppercase).unwrap_or(false);

		if capitalized && !lemmatizer.is_stopword(token) {
			run.push(token);

			continue;
		}
		if !run.is_empty() {
			let text = run.join(" ");

			if !entities.iter().any(|entity| entity.text == text) {
				entities.push(Entity { text, r#type: "PROPN".to_string() });
			}

			run.clear();
		}
	}

	entities
}

fn collect_actions(lemmatizer: &Lemmatizer, tokens: &[&str]) -> Vec<Action> {
	let mut actions = Vec::<Action>::new();

	for token in tokens {
		if lemmatizer.is_stopword(token) {
			continue;
		}
		if let Some(lemma) = lemmatizer.verb_lemma(token)
			&& !actions.iter().any(|action| action.lemma == lemma)
		{
			actions.push(Action { lemma });
		}
	}

	actions
}

fn collect_candidates(
	lemmatizer: &Lemmatizer,
	tokens: &[&str],
	entities: &[Entity],
) -> Vec<String> {
	let mut candidates = Vec::<String>::new();
	let mut seen = Vec::<String>::new();

	for entity in entities.iter().take(MAX_ENTITY_CANDIDATES) {
		seen.push(entity.text.to_lowercase());
		candidates.push(entity.text.clone());
	}

	for token in tokens {
		let lowered = token.to_lowercase();

		if token.chars().count() <= 2
			|| lemmatizer.is_stopword(token)
			|| lemmatizer.verb_lemma(token).is_some()
			|| seen.contains(&lowered)
		{
			continue;
		}

		seen.push(lowered);
		candidates.push((*token).to_string());
	}

	candidates
}

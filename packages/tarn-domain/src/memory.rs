use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
	entities::{Action, Entity},
	error::{Error, Result},
};

pub const MAX_CONTENT_CHARS: usize = 7_500;

/// A single remembered fact plus everything derived from it.
#[derive(Clone, Debug)]
pub struct Memory {
	/// Assigned by storage on insert.
	pub id: Option<i64>,
	pub content: String,
	pub embedding: Option<Vec<f32>>,
	pub forgotten: bool,
	pub metadata: Metadata,
}
impl Memory {
	/// Builds a memory from raw content.
	///
	/// Content is trimmed before validation, and the trimmed form is what
	/// gets stored. Empty and oversized content are rejected.
	pub fn new(content: &str) -> Result<Self> {
		let content = content.trim();

		if content.is_empty() {
			return Err(Error::InvalidContent("Memory content must be non-empty.".to_string()));
		}
		if content.chars().count() > MAX_CONTENT_CHARS {
			return Err(Error::InvalidContent(format!(
				"Memory content must be at most {MAX_CONTENT_CHARS} characters."
			)));
		}

		Ok(Self {
			id: None,
			content: content.to_string(),
			embedding: None,
			forgotten: false,
			metadata: Metadata::now(),
		})
	}

	/// Adds an already-canonicalized tag. Duplicates collapse via the set.
	pub fn add_canonical_tag(&mut self, tag: String) {
		if !tag.is_empty() {
			self.metadata.tags.insert(tag);
		}
	}

	pub fn add_entity(&mut self, entity: Entity) {
		if !self.metadata.entities.contains(&entity) {
			self.metadata.entities.push(entity);
		}
	}

	pub fn add_action(&mut self, action: Action) {
		if !self.metadata.actions.contains(&action) {
			self.metadata.actions.push(action);
		}
	}
}

/// Sidecar data persisted as JSONB next to the content.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Metadata {
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(default)]
	pub tags: BTreeSet<String>,
	#[serde(default)]
	pub entities: Vec<Entity>,
	#[serde(default)]
	pub actions: Vec<Action>,
}
impl Metadata {
	pub fn now() -> Self {
		Self {
			created_at: OffsetDateTime::now_utc(),
			tags: BTreeSet::new(),
			entities: Vec::new(),
			actions: Vec::new(),
		}
	}
}

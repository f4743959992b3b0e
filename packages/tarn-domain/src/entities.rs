use serde::{Deserialize, Serialize};

/// A named thing mentioned in a memory's content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
	pub text: String,
	pub r#type: String,
}

/// A verb from a memory's content, stored in base form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
	pub lemma: String,
}

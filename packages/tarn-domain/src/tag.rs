//! Tag canonicalization.
//!
//! Every tag that reaches storage goes through [`canonicalize`], whether the
//! caller typed it or the extractor proposed it. Phrasings of the same idea
//! ("Python Tips", "tips for Python") collapse to one canonical form, and
//! canonical forms are fixed points of the function.

use crate::lemma::Lemmatizer;

/// Reduces `raw` to its canonical tag form.
///
/// Lowercase, lemmatize each non-stopword token, keep only `[a-z0-9-]`
/// characters, then sort the lemmas and join with hyphens. Sorting makes the
/// form order-independent. Returns an empty string when nothing usable
/// remains.
pub fn canonicalize(lemmatizer: &Lemmatizer, raw: &str) -> String {
	let text = raw.trim().to_lowercase();
	let mut lemmas = lemmatizer
		.tokens(&text)
		.into_iter()
		.filter(|token| !lemmatizer.is_stopword(token))
		.map(|token| strip_to_tag_chars(&lemmatizer.lemma(token)))
		.filter(|lemma| !lemma.is_empty())
		.collect::<Vec<_>>();

	if lemmas.is_empty() {
		// Nothing lemmatizable, e.g. an emoji-only or all-stopword tag.
		// Fall back to the raw text so the caller's tag is not lost.
		let stripped = strip_to_tag_chars(&text);

		return if stripped.is_empty() { text.replace(' ', "-") } else { stripped };
	}

	lemmas.sort();

	lemmas.join("-")
}

/// Canonicalizes a batch, dropping empties and duplicates while keeping the
/// first-occurrence order.
pub fn canonicalize_all<I, S>(lemmatizer: &Lemmatizer, raw: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut seen = Vec::new();

	for tag in raw {
		let canonical = canonicalize(lemmatizer, tag.as_ref());

		if !canonical.is_empty() && !seen.contains(&canonical) {
			seen.push(canonical);
		}
	}

	seen
}

fn strip_to_tag_chars(text: &str) -> String {
	text.chars().filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-').collect()
}

//! Rule-based English lemmatization.
//!
//! Canonical tags and extracted actions both need inflected forms collapsed
//! to a base form ("stories" and "story", "stole" and "steal"). A small
//! irregular table plus suffix stripping covers the vocabulary that shows up
//! in tags well enough, without pulling a model into the write path.

use std::collections::{HashMap, HashSet};

use unicode_segmentation::UnicodeSegmentation;

const STOPWORDS: &[&str] = &[
	"a", "about", "after", "again", "all", "an", "and", "any", "are", "as", "at", "be", "because",
	"been", "before", "being", "below", "between", "both", "but", "by", "can", "did", "do", "does",
	"down", "during", "each", "few", "for", "from", "had", "has", "have", "he", "her", "here",
	"hers", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "me", "more",
	"most", "my", "no", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our",
	"out", "over", "own", "same", "she", "should", "so", "some", "such", "than", "that", "the",
	"their", "them", "then", "there", "these", "they", "this", "those", "through", "to", "too",
	"under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while",
	"who", "whom", "why", "will", "with", "would", "you", "your",
];

const IRREGULAR_NOUNS: &[(&str, &str)] = &[
	("children", "child"),
	("feet", "foot"),
	("geese", "goose"),
	("leaves", "leaf"),
	("lives", "life"),
	("men", "man"),
	("mice", "mouse"),
	("people", "person"),
	("teeth", "tooth"),
	("women", "woman"),
];

const IRREGULAR_VERBS: &[(&str, &str)] = &[
	("am", "be"),
	("are", "be"),
	("ate", "eat"),
	("been", "be"),
	("being", "be"),
	("bought", "buy"),
	("broke", "break"),
	("broken", "break"),
	("brought", "bring"),
	("built", "build"),
	("came", "come"),
	("caught", "catch"),
	("did", "do"),
	("done", "do"),
	("drank", "drink"),
	("drove", "drive"),
	("eaten", "eat"),
	("fell", "fall"),
	("felt", "feel"),
	("flew", "fly"),
	("forgot", "forget"),
	("found", "find"),
	("gave", "give"),
	("given", "give"),
	("gone", "go"),
	("got", "get"),
	("gotten", "get"),
	("had", "have"),
	("has", "have"),
	("having", "have"),
	("heard", "hear"),
	("held", "hold"),
	("is", "be"),
	("kept", "keep"),
	("knew", "know"),
	("known", "know"),
	("left", "leave"),
	("lost", "lose"),
	("made", "make"),
	("met", "meet"),
	("paid", "pay"),
	("ran", "run"),
	("said", "say"),
	("sat", "sit"),
	("saw", "see"),
	("seen", "see"),
	("sent", "send"),
	("slept", "sleep"),
	("sold", "sell"),
	("spoke", "speak"),
	("spoken", "speak"),
	("stole", "steal"),
	("stolen", "steal"),
	("stood", "stand"),
	("taught", "teach"),
	("thought", "think"),
	("told", "tell"),
	("took", "take"),
	("taken", "take"),
	("was", "be"),
	("went", "go"),
	("were", "be"),
	("won", "win"),
	("wrote", "write"),
	("written", "write"),
];

/// Shared lemmatization tables. Build once and reuse; construction allocates
/// the lookup maps.
#[derive(Debug)]
pub struct Lemmatizer {
	stopwords: HashSet<&'static str>,
	irregular_nouns: HashMap<&'static str, &'static str>,
	irregular_verbs: HashMap<&'static str, &'static str>,
}
impl Lemmatizer {
	pub fn new() -> Self {
		Self {
			stopwords: STOPWORDS.iter().copied().collect(),
			irregular_nouns: IRREGULAR_NOUNS.iter().copied().collect(),
			irregular_verbs: IRREGULAR_VERBS.iter().copied().collect(),
		}
	}

	/// Splits `text` into word tokens on Unicode word boundaries.
	pub fn tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
		text.unicode_words().collect()
	}

	pub fn is_stopword(&self, token: &str) -> bool {
		self.stopwords.contains(token.to_lowercase().as_str())
	}

	/// Collapses a token to its base noun form.
	pub fn lemma(&self, token: &str) -> String {
		let token = token.to_lowercase();
		let token = token.strip_suffix("'s").or_else(|| token.strip_suffix("\u{2019}s")).map(str::to_string).unwrap_or(token);

		if let Some(base) = self.irregular_nouns.get(token.as_str()) {
			return (*base).to_string();
		}

		if token.len() > 4
			&& let Some(stem) = token.strip_suffix("ies")
		{
			return format!("{stem}y");
		}
		if token.len() > 5
			&& let Some(stem) = token.strip_suffix("ing")
		{
			return undouble(stem);
		}
		if token.len() > 4
			&& let Some(stem) = token.strip_suffix("ed")
		{
			return undouble(stem);
		}
		if token.len() > 3
			&& token.ends_with('s')
			&& !token.ends_with("ss")
			&& !token.ends_with("us")
			&& !token.ends_with("is")
		{
			return token[..token.len() - 1].to_string();
		}

		token
	}

	/// Base form of `token` if it reads as a verb, [`None`] otherwise.
	pub fn verb_lemma(&self, token: &str) -> Option<String> {
		let token = token.to_lowercase();

		if let Some(base) = self.irregular_verbs.get(token.as_str()) {
			return Some((*base).to_string());
		}
		if token.len() > 5
			&& let Some(stem) = token.strip_suffix("ing")
		{
			return Some(undouble(stem));
		}
		if token.len() > 4
			&& let Some(stem) = token.strip_suffix("ed")
		{
			return Some(undouble(stem));
		}

		None
	}
}
impl Default for Lemmatizer {
	fn default() -> Self {
		Self::new()
	}
}

// "stopp" reads back as "stop" but "fill" must stay "fill".
fn undouble(stem: &str) -> String {
	let bytes = stem.as_bytes();

	if bytes.len() >= 2
		&& bytes[bytes.len() - 1] == bytes[bytes.len() - 2]
		&& !matches!(bytes[bytes.len() - 1], b'l' | b's' | b'z' | b'e' | b'o')
	{
		stem[..stem.len() - 1].to_string()
	} else {
		stem.to_string()
	}
}

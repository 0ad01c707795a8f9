// ---------------------------------------------------------------------------
// Search Index — normalized token -> set of item ids
// ---------------------------------------------------------------------------
//
// Boolean membership only: a query returns the ids whose extracted tokens
// match, with no ranking. Buckets are dropped as soon as they empty, so the
// index over a given item set is the same whether it was built incrementally
// or by `rebuild`.
// ---------------------------------------------------------------------------

use std::collections::{HashMap, HashSet};

use crate::text::{normalize_token, tokenize_words};
use crate::types::CatalogItem;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
	/// token -> set of item ids
	index: HashMap<String, HashSet<String>>,
	/// also index specification material, finish and feature words
	index_specifications: bool,
}

impl InvertedIndex {
	pub fn new(index_specifications: bool) -> Self {
		Self {
			index: HashMap::new(),
			index_specifications,
		}
	}

	/// Unique tokens extracted from an item: each word of the name, the full
	/// category, the full identifier, and optionally specification words.
	pub fn tokens_for(&self, item: &CatalogItem) -> HashSet<String> {
		let mut tokens: HashSet<String> = tokenize_words(item.name()).into_iter().collect();
		for whole in [item.category(), item.id()] {
			let token = normalize_token(whole);
			if !token.is_empty() {
				tokens.insert(token);
			}
		}

		if self.index_specifications {
			let specs = item.specifications();
			tokens.extend(tokenize_words(&specs.material));
			tokens.extend(tokenize_words(&specs.finish));
			for feature in &specs.features {
				tokens.extend(tokenize_words(feature));
			}
		}

		tokens
	}

	/// Add the item id to the bucket of every token extracted from it.
	pub fn index(&mut self, item: &CatalogItem) {
		for token in self.tokens_for(item) {
			self.index
				.entry(token)
				.or_default()
				.insert(item.id().to_string());
		}
	}

	/// Remove the item id from every bucket its tokens point at. Must be
	/// given the item as it was when indexed.
	pub fn deindex(&mut self, item: &CatalogItem) {
		for token in self.tokens_for(item) {
			if let Some(postings) = self.index.get_mut(&token) {
				postings.remove(item.id());
				if postings.is_empty() {
					self.index.remove(&token);
				}
			}
		}
	}

	/// Clear and re-index every item.
	pub fn rebuild<'a>(&mut self, items: impl IntoIterator<Item = &'a CatalogItem>) {
		self.index.clear();
		for item in items {
			self.index(item);
		}
	}

	/// Ids matching a query term.
	///
	/// An exact bucket wins; otherwise every bucket whose token contains the
	/// normalized term is unioned. A term that normalizes to nothing matches
	/// every indexed id.
	pub fn query(&self, term: &str) -> HashSet<String> {
		let needle = normalize_token(term);
		if needle.is_empty() {
			return self.all_ids();
		}

		if let Some(postings) = self.index.get(&needle) {
			return postings.clone();
		}

		let mut result = HashSet::new();
		for (token, postings) in &self.index {
			if token.contains(&needle) {
				result.extend(postings.iter().cloned());
			}
		}
		result
	}

	/// Ids indexed under exactly this token.
	pub fn get_entries(&self, token: &str) -> Vec<String> {
		match self.index.get(&normalize_token(token)) {
			Some(postings) => postings.iter().cloned().collect(),
			None => Vec::new(),
		}
	}

	pub fn contains(&self, token: &str, item_id: &str) -> bool {
		self.index
			.get(token)
			.is_some_and(|postings| postings.contains(item_id))
	}

	/// Every (token, ids) bucket, in no particular order.
	pub fn buckets(&self) -> impl Iterator<Item = (&String, &HashSet<String>)> {
		self.index.iter()
	}

	fn all_ids(&self) -> HashSet<String> {
		self.index.values().flatten().cloned().collect()
	}

	/// Number of distinct tokens.
	pub fn token_count(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	pub fn clear(&mut self) {
		self.index.clear();
	}
}

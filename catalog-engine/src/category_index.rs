// ---------------------------------------------------------------------------
// Category Index — category name -> member item ids
// ---------------------------------------------------------------------------
//
// Derived from the item store and kept in lockstep with it. Keys are always
// normalized with `normalize_category`. Buckets created implicitly by an item
// disappear with their last member; buckets declared through `declare`
// persist while empty.
// ---------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::text::normalize_category;
use crate::validation::MAX_CATEGORY_CHARS;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategoryIndex {
	/// category -> Set<item id>
	buckets: HashMap<String, HashSet<String>>,
	/// categories kept alive while empty
	declared: HashSet<String>,
}

impl CategoryIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declare a category so it survives without members. Returns the
	/// normalized key, or `None` if the name normalizes to nothing or is
	/// longer than `MAX_CATEGORY_CHARS`.
	pub fn declare(&mut self, name: &str) -> Option<String> {
		let key = normalize_category(name);
		if key.is_empty() || key.chars().count() > MAX_CATEGORY_CHARS {
			return None;
		}
		self.buckets.entry(key.clone()).or_default();
		self.declared.insert(key.clone());
		Some(key)
	}

	/// Register an item under a category.
	pub fn insert(&mut self, item_id: &str, category: &str) {
		let key = normalize_category(category);
		self.buckets
			.entry(key)
			.or_default()
			.insert(item_id.to_string());
	}

	/// Remove an item from a category bucket, dropping the bucket if it is
	/// now empty and was never declared.
	pub fn remove(&mut self, item_id: &str, category: &str) {
		let key = normalize_category(category);
		if let Some(members) = self.buckets.get_mut(&key) {
			members.remove(item_id);
			if members.is_empty() && !self.declared.contains(&key) {
				self.buckets.remove(&key);
			}
		}
	}

	/// Move an item from one category to another.
	pub fn relocate(&mut self, item_id: &str, old_category: &str, new_category: &str) {
		self.remove(item_id, old_category);
		self.insert(item_id, new_category);
	}

	/// Detach a whole bucket and forget its declaration. Returns the member
	/// ids (empty if the category was unknown).
	pub fn take(&mut self, name: &str) -> Vec<String> {
		let key = normalize_category(name);
		self.declared.remove(&key);
		let mut ids: Vec<String> = self
			.buckets
			.remove(&key)
			.map(|s| s.into_iter().collect())
			.unwrap_or_default();
		ids.sort();
		ids
	}

	/// Member ids of a category, sorted.
	pub fn members(&self, name: &str) -> Vec<String> {
		let key = normalize_category(name);
		let mut ids: Vec<String> = self
			.buckets
			.get(&key)
			.map(|s| s.iter().cloned().collect())
			.unwrap_or_default();
		ids.sort();
		ids
	}

	pub fn contains(&self, name: &str, item_id: &str) -> bool {
		self.buckets
			.get(&normalize_category(name))
			.is_some_and(|s| s.contains(item_id))
	}

	pub fn member_count(&self, name: &str) -> usize {
		self.buckets
			.get(&normalize_category(name))
			.map_or(0, |s| s.len())
	}

	pub fn has_category(&self, name: &str) -> bool {
		self.buckets.contains_key(&normalize_category(name))
	}

	/// All category names, sorted.
	pub fn categories(&self) -> Vec<String> {
		let mut names: Vec<String> = self.buckets.keys().cloned().collect();
		names.sort();
		names
	}

	pub fn counts(&self) -> BTreeMap<String, usize> {
		self.buckets
			.iter()
			.map(|(k, v)| (k.clone(), v.len()))
			.collect()
	}

	/// Drop all memberships. Declared categories survive as empty buckets.
	pub fn clear_members(&mut self) {
		self.buckets.clear();
		for key in &self.declared {
			self.buckets.insert(key.clone(), HashSet::new());
		}
	}
}

// ---------------------------------------------------------------------------
// ItemStore — authoritative id -> item map plus its derived indexes
// ---------------------------------------------------------------------------
//
// Every mutation is checked in full before anything is touched, then fans out
// to the category index and the search index before returning. Mutators are
// split into `check_*` (pure, returns the prepared change) and `apply_*` so a
// caller can persist between the two; `add` / `update` / `remove` do both.
// ---------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use crate::category_index::CategoryIndex;
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::inverted_index::InvertedIndex;
use crate::text::{normalize_category, UNCATEGORIZED};
use crate::types::CatalogItem;
use crate::validation::{check_resources, validate_item, MAX_CATEGORY_CHARS};

/// Central stateful store for catalog items.
#[derive(Debug, Clone)]
pub struct ItemStore {
	items: HashMap<String, CatalogItem>,
	category_index: CategoryIndex,
	search_index: InvertedIndex,
	resource_base: Option<PathBuf>,
}

/// An update that passed its checks, carrying the stored value it replaces.
#[derive(Debug, Clone)]
pub struct PreparedUpdate {
	pub previous: CatalogItem,
	pub next: CatalogItem,
}

impl ItemStore {
	// -- Lifecycle -----------------------------------------------------------

	pub fn new(config: &CatalogConfig) -> Self {
		Self {
			items: HashMap::new(),
			category_index: CategoryIndex::new(),
			search_index: InvertedIndex::new(config.index_specifications),
			resource_base: config.catalog_base_path.clone(),
		}
	}

	fn validated(&self, item: &CatalogItem, check_files: bool) -> Result<CatalogItem, CatalogError> {
		let mut violations = validate_item(item);
		if check_files {
			if let Some(base) = &self.resource_base {
				violations.extend(check_resources(item, base));
			}
		}
		if !violations.is_empty() {
			return Err(CatalogError::Validation {
				id: item.id().to_string(),
				violations,
			});
		}
		let mut prepared = item.clone();
		prepared.normalize_category_in_place(normalize_category(item.category()));
		Ok(prepared)
	}

	// -- Add -----------------------------------------------------------------

	/// Validate a new item (including resource references) and return the
	/// value that would be stored.
	pub fn check_add(&self, item: &CatalogItem) -> Result<CatalogItem, CatalogError> {
		let prepared = self.validated(item, true)?;
		if self.items.contains_key(prepared.id()) {
			return Err(CatalogError::AlreadyExists(prepared.id().to_string()));
		}
		Ok(prepared)
	}

	/// Store a value returned by `check_add` and index it.
	pub fn apply_add(&mut self, item: CatalogItem) {
		self.category_index.insert(item.id(), item.category());
		self.search_index.index(&item);
		tracing::debug!(id = item.id(), category = item.category(), "item added");
		self.items.insert(item.id().to_string(), item);
	}

	pub fn add(&mut self, item: CatalogItem) -> Result<(), CatalogError> {
		let prepared = self.check_add(&item)?;
		self.apply_add(prepared);
		Ok(())
	}

	/// Insert without the resource check. Used when rehydrating items that
	/// were already accepted once.
	pub fn restore(&mut self, item: &CatalogItem) -> Result<(), CatalogError> {
		let prepared = self.validated(item, false)?;
		if self.items.contains_key(prepared.id()) {
			return Err(CatalogError::AlreadyExists(prepared.id().to_string()));
		}
		self.apply_add(prepared);
		Ok(())
	}

	// -- Update --------------------------------------------------------------

	/// Validate a replacement for a stored item. The stored creation time is
	/// carried over; only `updated_at` comes from the replacement.
	pub fn check_update(&self, item: &CatalogItem) -> Result<PreparedUpdate, CatalogError> {
		let mut next = self.validated(item, false)?;
		let previous = self
			.items
			.get(next.id())
			.cloned()
			.ok_or_else(|| CatalogError::NotFound(next.id().to_string()))?;
		next.set_timestamps(previous.created_at(), next.updated_at());
		Ok(PreparedUpdate { previous, next })
	}

	/// Replace the stored value. The category index moves only on a category
	/// change; the search index is always re-tokenized.
	pub fn apply_update(&mut self, update: PreparedUpdate) {
		let PreparedUpdate { previous, next } = update;
		if previous.category() != next.category() {
			self.category_index
				.relocate(next.id(), previous.category(), next.category());
		}
		self.search_index.deindex(&previous);
		self.search_index.index(&next);
		tracing::debug!(id = next.id(), "item updated");
		self.items.insert(next.id().to_string(), next);
	}

	pub fn update(&mut self, item: CatalogItem) -> Result<(), CatalogError> {
		let prepared = self.check_update(&item)?;
		self.apply_update(prepared);
		Ok(())
	}

	// -- Remove --------------------------------------------------------------

	pub fn check_remove(&self, id: &str) -> Result<(), CatalogError> {
		if self.items.contains_key(id) {
			Ok(())
		} else {
			Err(CatalogError::NotFound(id.to_string()))
		}
	}

	/// Drop an item from both indexes, then from the map.
	pub fn apply_remove(&mut self, id: &str) -> Option<CatalogItem> {
		let item = self.items.get(id)?;
		self.category_index.remove(id, item.category());
		self.search_index.deindex(item);
		tracing::debug!(id, "item removed");
		self.items.remove(id)
	}

	pub fn remove(&mut self, id: &str) -> Result<CatalogItem, CatalogError> {
		self.check_remove(id)?;
		self.apply_remove(id)
			.ok_or_else(|| CatalogError::NotFound(id.to_string()))
	}

	/// Drop every item. Declared categories survive.
	pub fn clear(&mut self) {
		self.items.clear();
		self.category_index.clear_members();
		self.search_index.clear();
	}

	// -- Accessors -----------------------------------------------------------

	pub fn get(&self, id: &str) -> Option<&CatalogItem> {
		self.items.get(id)
	}

	pub fn has(&self, id: &str) -> bool {
		self.items.contains_key(id)
	}

	/// All items, in no guaranteed order.
	pub fn get_all(&self) -> Vec<&CatalogItem> {
		self.items.values().collect()
	}

	/// All items ordered by identifier.
	pub fn sorted(&self) -> Vec<&CatalogItem> {
		let mut items = self.get_all();
		items.sort_by(|a, b| a.id().cmp(b.id()));
		items
	}

	pub fn count(&self) -> usize {
		self.items.len()
	}

	pub fn category_index(&self) -> &CategoryIndex {
		&self.category_index
	}

	pub fn search_index(&self) -> &InvertedIndex {
		&self.search_index
	}

	/// Resolve index ids back to items, ordered by identifier.
	///
	/// An id missing from the store means index maintenance went wrong: that
	/// trips a debug assertion and is skipped in release builds.
	pub fn resolve<'i>(&self, ids: impl IntoIterator<Item = &'i String>) -> Vec<&CatalogItem> {
		let mut items: Vec<&CatalogItem> = ids
			.into_iter()
			.filter_map(|id| {
				let found = self.items.get(id);
				debug_assert!(found.is_some(), "index references unknown item {id}");
				if found.is_none() {
					tracing::warn!(id = %id, "index references unknown item");
				}
				found
			})
			.collect();
		items.sort_by(|a, b| a.id().cmp(b.id()));
		items
	}

	/// Ids matching a search term.
	pub fn search_ids(&self, term: &str) -> HashSet<String> {
		self.search_index.query(term)
	}

	// -- Categories ----------------------------------------------------------

	pub fn add_category(&mut self, name: &str) -> bool {
		self.category_index.declare(name).is_some()
	}

	/// Members of a category, ordered by identifier.
	pub fn items_in_category(&self, name: &str) -> Vec<&CatalogItem> {
		let ids = self.category_index.members(name);
		self.resolve(&ids)
	}

	pub fn categories(&self) -> Vec<String> {
		self.category_index.categories()
	}

	pub fn counts_by_category(&self) -> BTreeMap<String, usize> {
		self.category_index.counts()
	}

	/// Prospective result of moving every member of `name` elsewhere: the
	/// relabeled snapshots, or `None` if the operation would be a no-op.
	pub fn check_remove_category(&self, name: &str) -> Option<Vec<CatalogItem>> {
		let key = normalize_category(name);
		if key == UNCATEGORIZED || self.category_index.member_count(&key) == 0 {
			return None;
		}
		Some(self.relabeled(&key, UNCATEGORIZED))
	}

	/// Prospective relabeling for a rename, or `None` when `old` has no
	/// members or `new` is not a valid category (empty once normalized, or
	/// longer than `MAX_CATEGORY_CHARS`).
	pub fn check_rename_category(&self, old: &str, new: &str) -> Option<Vec<CatalogItem>> {
		let old_key = normalize_category(old);
		let new_key = normalize_category(new);
		if new_key.is_empty() || new_key.chars().count() > MAX_CATEGORY_CHARS {
			return None;
		}
		if self.category_index.member_count(&old_key) == 0 {
			return None;
		}
		if old_key == new_key {
			return Some(Vec::new());
		}
		Some(self.relabeled(&old_key, &new_key))
	}

	fn relabeled(&self, old_key: &str, new_key: &str) -> Vec<CatalogItem> {
		self.items_in_category(old_key)
			.into_iter()
			.map(|item| {
				let mut moved = item.clone();
				moved.set_category(new_key);
				moved
			})
			.collect()
	}

	/// Detach the source bucket and store the relabeled snapshots.
	pub fn apply_category_move(&mut self, old: &str, moved: &[CatalogItem]) {
		self.category_index.take(old);
		for next in moved {
			if let Some(previous) = self.items.get(next.id()) {
				self.search_index.deindex(previous);
			}
			self.category_index.insert(next.id(), next.category());
			self.search_index.index(next);
			self.items.insert(next.id().to_string(), next.clone());
		}
	}

	/// Move every member of `name` to `uncategorized`. Returns the moved items.
	pub fn remove_category(&mut self, name: &str) -> Option<Vec<CatalogItem>> {
		let moved = self.check_remove_category(name)?;
		self.apply_category_move(name, &moved);
		Some(moved)
	}

	/// Relabel every member of `old` as `new`. Returns the moved items.
	pub fn rename_category(&mut self, old: &str, new: &str) -> Option<Vec<CatalogItem>> {
		let moved = self.check_rename_category(old, new)?;
		if !moved.is_empty() {
			self.apply_category_move(old, &moved);
		}
		Some(moved)
	}

	// -- Index maintenance ---------------------------------------------------

	/// Rebuild both indexes from the item map.
	pub fn rebuild_indexes(&mut self) {
		self.category_index.clear_members();
		for item in self.items.values() {
			self.category_index.insert(item.id(), item.category());
		}
		self.search_index.rebuild(self.items.values());
		tracing::debug!(
			items = self.items.len(),
			tokens = self.search_index.token_count(),
			"indexes rebuilt"
		);
	}

	/// Check that every item is reachable through both indexes and that the
	/// indexes reference only stored items.
	pub fn is_consistent(&self) -> bool {
		for item in self.items.values() {
			if !self.category_index.contains(item.category(), item.id()) {
				return false;
			}
			let tokens = self.search_index.tokens_for(item);
			if !tokens.iter().all(|t| self.search_index.contains(t, item.id())) {
				return false;
			}
		}
		let categories_ok = self.category_index.categories().iter().all(|c| {
			self.category_index
				.members(c)
				.iter()
				.all(|id| self.items.get(id).is_some_and(|i| i.category() == c))
		});
		let tokens_ok = self.search_index.buckets().all(|(token, ids)| {
			!ids.is_empty()
				&& ids.iter().all(|id| {
					self.items
						.get(id)
						.is_some_and(|i| self.search_index.tokens_for(i).contains(token))
				})
		});
		categories_ok && tokens_ok
	}
}

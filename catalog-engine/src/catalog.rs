// ---------------------------------------------------------------------------
// Catalog — query façade over the item store
// ---------------------------------------------------------------------------
//
// Owns the store, the injected configuration, the optional repository and
// the optional observer. Mutations run validate -> persist -> apply ->
// notify, and come back as display-ready `OperationResult`s. Reads never
// fail: absent inputs give empty results.
// ---------------------------------------------------------------------------

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::filter;
use crate::interchange::{apply_import_options, item_from_json, item_to_json, ImportReport};
use crate::observer::CatalogObserver;
use crate::recommendation::{most_recently_created, most_recently_updated, rank_similar};
use crate::repository::Repository;
use crate::store::ItemStore;
use crate::text::normalize_token;
use crate::types::{CatalogFilter, CatalogItem, OperationResult, Recommendation, SearchPage};

/// Outcome of loading items from the repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydrateReport {
	pub loaded: usize,
	pub rejected: Vec<CatalogError>,
}

pub struct Catalog {
	store: ItemStore,
	config: CatalogConfig,
	repository: Option<Box<dyn Repository>>,
	observer: Option<Box<dyn CatalogObserver>>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Slice `[offset, offset + limit)` out of an ordered candidate list.
fn paginate(candidates: Vec<&CatalogItem>, offset: usize, limit: usize) -> SearchPage {
	let total_count = candidates.len();
	let items = candidates
		.into_iter()
		.skip(offset)
		.take(limit)
		.cloned()
		.collect();
	SearchPage {
		items,
		total_count,
		offset,
		limit,
	}
}

impl Catalog {
	// -- Lifecycle -----------------------------------------------------------

	pub fn new(config: CatalogConfig) -> Self {
		Self {
			store: ItemStore::new(&config),
			config,
			repository: None,
			observer: None,
		}
	}

	pub fn with_repository(mut self, repository: Box<dyn Repository>) -> Self {
		self.repository = Some(repository);
		self
	}

	pub fn config(&self) -> &CatalogConfig {
		&self.config
	}

	/// Install the single observer, replacing any previous one.
	pub fn set_observer(&mut self, observer: Box<dyn CatalogObserver>) {
		self.observer = Some(observer);
	}

	pub fn clear_observer(&mut self) -> Option<Box<dyn CatalogObserver>> {
		self.observer.take()
	}

	/// Load every item from the repository into an empty catalog.
	///
	/// Items are validated and indexed but neither re-saved nor announced to
	/// the observer; invalid ones are reported and skipped.
	pub fn hydrate(&mut self) -> Result<HydrateReport, CatalogError> {
		let Some(repository) = self.repository.as_ref() else {
			return Ok(HydrateReport::default());
		};
		let items = match repository.load_all() {
			Ok(items) => items,
			Err(e) => {
				self.notify_error(&e);
				return Err(e);
			}
		};

		let mut report = HydrateReport::default();
		for item in &items {
			match self.store.restore(item) {
				Ok(()) => report.loaded += 1,
				Err(e) => {
					tracing::warn!(id = item.id(), error = %e, "skipping stored item");
					self.notify_error(&e);
					report.rejected.push(e);
				}
			}
		}
		tracing::info!(
			loaded = report.loaded,
			rejected = report.rejected.len(),
			"catalog hydrated"
		);
		Ok(report)
	}

	// -- Notification --------------------------------------------------------

	fn notify_error(&mut self, error: &CatalogError) {
		if let Some(observer) = self.observer.as_mut() {
			observer.error(error);
		}
	}

	fn notify_updated(&mut self, item: &CatalogItem) {
		if let Some(observer) = self.observer.as_mut() {
			observer.item_updated(item);
		}
	}

	fn reject(&mut self, id: &str, error: CatalogError) -> OperationResult {
		tracing::warn!(id, code = error.code(), error = %error, "mutation rejected");
		self.notify_error(&error);
		OperationResult::failed(id, error)
	}

	fn persist(&mut self, item: &CatalogItem) -> Result<(), CatalogError> {
		let Some(repo) = self.repository.as_mut() else {
			return Ok(());
		};
		if repo.save(item) {
			Ok(())
		} else {
			Err(CatalogError::Persistence {
				id: item.id().to_string(),
				operation: "save".to_string(),
			})
		}
	}

	// -- Mutations -----------------------------------------------------------

	pub fn add_item(&mut self, item: CatalogItem) -> OperationResult {
		let prepared = match self.store.check_add(&item) {
			Ok(p) => p,
			Err(e) => return self.reject(item.id(), e),
		};
		if let Err(e) = self.persist(&prepared) {
			return self.reject(item.id(), e);
		}
		let id = prepared.id().to_string();
		self.store.apply_add(prepared);
		if let (Some(observer), Some(stored)) = (self.observer.as_mut(), self.store.get(&id)) {
			observer.item_added(stored);
		}
		OperationResult::ok(&id, format!("Added item {id}"))
	}

	pub fn update_item(&mut self, item: CatalogItem) -> OperationResult {
		let prepared = match self.store.check_update(&item) {
			Ok(p) => p,
			Err(e) => return self.reject(item.id(), e),
		};
		if let Err(e) = self.persist(&prepared.next) {
			return self.reject(item.id(), e);
		}
		let id = prepared.next.id().to_string();
		self.store.apply_update(prepared);
		if let (Some(observer), Some(stored)) = (self.observer.as_mut(), self.store.get(&id)) {
			observer.item_updated(stored);
		}
		OperationResult::ok(&id, format!("Updated item {id}"))
	}

	pub fn remove_item(&mut self, id: &str) -> OperationResult {
		if let Err(e) = self.store.check_remove(id) {
			return self.reject(id, e);
		}
		if let Some(repo) = self.repository.as_mut() {
			if !repo.delete(id) {
				let e = CatalogError::Persistence {
					id: id.to_string(),
					operation: "delete".to_string(),
				};
				return self.reject(id, e);
			}
		}
		self.store.apply_remove(id);
		if let Some(observer) = self.observer.as_mut() {
			observer.item_removed(id);
		}
		OperationResult::ok(id, format!("Removed item {id}"))
	}

	// -- Item reads ----------------------------------------------------------

	pub fn get_item(&self, id: &str) -> Option<&CatalogItem> {
		self.store.get(id)
	}

	pub fn has_item(&self, id: &str) -> bool {
		self.store.has(id)
	}

	/// Every item, in no guaranteed order.
	pub fn all_items(&self) -> Vec<&CatalogItem> {
		self.store.get_all()
	}

	pub fn item_count(&self) -> usize {
		self.store.count()
	}

	pub fn store(&self) -> &ItemStore {
		&self.store
	}

	// -- Categories ----------------------------------------------------------

	pub fn add_category(&mut self, name: &str) -> bool {
		self.store.add_category(name)
	}

	/// Move every member of a category to `uncategorized` and drop the
	/// category. False when the category has no members.
	pub fn remove_category(&mut self, name: &str) -> bool {
		match self.store.remove_category(name) {
			Some(moved) => {
				tracing::info!(category = name, moved = moved.len(), "category removed");
				self.after_category_move(&moved);
				true
			}
			None => false,
		}
	}

	/// Relabel every member of `old` as `new`. False when `old` has no
	/// members or `new` is not a usable name.
	pub fn rename_category(&mut self, old: &str, new: &str) -> bool {
		match self.store.rename_category(old, new) {
			Some(moved) => {
				tracing::info!(from = old, to = new, moved = moved.len(), "category renamed");
				self.after_category_move(&moved);
				true
			}
			None => false,
		}
	}

	/// Persist and announce items relabeled by a bulk category operation.
	/// A failed save is reported but the in-memory relabel stands.
	fn after_category_move(&mut self, moved: &[CatalogItem]) {
		for item in moved {
			if let Err(e) = self.persist(item) {
				tracing::warn!(id = item.id(), error = %e, "relabeled item not persisted");
				self.notify_error(&e);
			}
			self.notify_updated(item);
		}
	}

	pub fn categories(&self) -> Vec<String> {
		self.store.categories()
	}

	pub fn counts_by_category(&self) -> BTreeMap<String, usize> {
		self.store.counts_by_category()
	}

	pub fn items_in_category(&self, name: &str) -> Vec<&CatalogItem> {
		self.store.items_in_category(name)
	}

	// -- Queries -------------------------------------------------------------

	fn text_candidates(&self, term: &str) -> Vec<&CatalogItem> {
		if normalize_token(term).is_empty() {
			return self.store.sorted();
		}
		let ids: HashSet<String> = self.store.search_ids(term);
		self.store.resolve(&ids)
	}

	/// Text search through the search index, paginated.
	pub fn search_items(&self, term: &str, offset: usize, limit: usize) -> SearchPage {
		paginate(self.text_candidates(term), offset, limit)
	}

	/// Items matching the structured filter, paginated.
	pub fn filter_items(&self, filter: &CatalogFilter, offset: usize, limit: usize) -> SearchPage {
		let candidates = self
			.store
			.sorted()
			.into_iter()
			.filter(|item| filter::matches(item, filter))
			.collect();
		paginate(candidates, offset, limit)
	}

	/// Text search result set intersected with the filter, paginated. The
	/// filter runs over the entire text match set, not just one page.
	pub fn advanced_search(
		&self,
		term: &str,
		filter: &CatalogFilter,
		offset: usize,
		limit: usize,
	) -> SearchPage {
		let candidates = self
			.text_candidates(term)
			.into_iter()
			.filter(|item| filter::matches(item, filter))
			.collect();
		paginate(candidates, offset, limit)
	}

	/// Items most similar to `id`, best first. Empty when `id` is unknown.
	pub fn similar_items(&self, id: &str, max_results: usize) -> Vec<Recommendation> {
		match self.store.get(id) {
			Some(reference) => rank_similar(reference, self.store.sorted(), max_results),
			None => Vec::new(),
		}
	}

	/// With an empty category: the newest items overall. Otherwise: that
	/// category's most recently updated items.
	pub fn recommended_items(&self, category: &str, max_results: usize) -> Vec<CatalogItem> {
		if category.trim().is_empty() {
			most_recently_created(self.store.get_all(), max_results)
		} else {
			most_recently_updated(self.store.items_in_category(category), max_results)
		}
	}

	// -- Index maintenance ---------------------------------------------------

	pub fn rebuild_indexes(&mut self) {
		self.store.rebuild_indexes();
	}

	// -- Import / export -----------------------------------------------------

	/// Import JSON items using the configured import/export options.
	///
	/// New ids are added; existing ids are updated when `overwriteExisting`
	/// is set and skipped otherwise.
	pub fn import_items(&mut self, values: &[Value]) -> ImportReport {
		let options = self.config.import_export.clone();
		let mut report = ImportReport::default();

		for (position, value) in values.iter().enumerate() {
			let mut item = match item_from_json(value) {
				Ok(item) => item,
				Err(violations) => {
					let id = value
						.get("id")
						.and_then(Value::as_str)
						.unwrap_or_default()
						.to_string();
					let e = CatalogError::Validation { id, violations };
					self.notify_error(&e);
					report.rejected.push((position, e));
					continue;
				}
			};
			apply_import_options(&mut item, &options);

			let id = item.id().to_string();
			let exists = self.store.has(&id);
			if exists && !options.overwrite_existing {
				report.skipped.push(id);
				continue;
			}
			let result = if exists {
				self.update_item(item)
			} else {
				self.add_item(item)
			};
			match (result.success, exists) {
				(true, true) => report.updated.push(id),
				(true, false) => report.added.push(id),
				(false, _) => {
					if let Some(e) = result.error {
						report.rejected.push((position, e));
					}
				}
			}
		}

		tracing::info!(
			added = report.added.len(),
			updated = report.updated.len(),
			skipped = report.skipped.len(),
			rejected = report.rejected.len(),
			"import finished"
		);
		report
	}

	/// Export every item as a JSON array in identifier order.
	pub fn export_items(&self) -> Value {
		Value::Array(
			self.store
				.sorted()
				.into_iter()
				.map(|item| item_to_json(item, &self.config.import_export))
				.collect(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::repository::InMemoryRepository;
	use crate::types::Dimensions;

	fn item(id: &str, name: &str, category: &str, price: f64) -> CatalogItem {
		CatalogItem::new(id, name, category, Dimensions::new(0.6, 0.85, 0.6), price)
	}

	fn seeded() -> Catalog {
		let mut catalog = Catalog::new(CatalogConfig::default());
		for (id, name, category) in [
			("a", "Oak Cabinet", "base"),
			("b", "Maple Cabinet", "base"),
			("c", "Oak Shelf", "wall"),
			("d", "Steel Sink", "sinks"),
			("e", "Oak Door", "doors"),
		] {
			assert!(catalog.add_item(item(id, name, category, 100.0)).success);
		}
		catalog
	}

	#[test]
	fn pagination_clips_and_keeps_total() {
		let catalog = seeded();
		let page = catalog.search_items("oak", 1, 1);
		assert_eq!(page.total_count, 3);
		assert_eq!(page.ids(), vec!["c"]);
		assert!(page.has_more());

		let tail = catalog.search_items("oak", 2, 10);
		assert_eq!(tail.ids(), vec!["e"]);
		assert!(!tail.has_more());

		let beyond = catalog.search_items("oak", 10, 10);
		assert!(beyond.items.is_empty());
		assert_eq!(beyond.total_count, 3);
	}

	#[test]
	fn zero_limit_returns_empty_page_with_total() {
		let catalog = seeded();
		let page = catalog.filter_items(&CatalogFilter::default(), 0, 0);
		assert!(page.items.is_empty());
		assert_eq!(page.total_count, 5);
		assert!(page.has_more());
	}

	#[test]
	fn empty_term_lists_everything_in_id_order() {
		let catalog = seeded();
		let page = catalog.search_items("", 0, 100);
		assert_eq!(page.ids(), vec!["a", "b", "c", "d", "e"]);
	}

	#[test]
	fn advanced_search_filters_whole_text_match_set() {
		let catalog = seeded();
		let filter = CatalogFilter::default().with_category("doors");
		let page = catalog.advanced_search("oak", &filter, 0, 1);
		assert_eq!(page.total_count, 1);
		assert_eq!(page.ids(), vec!["e"]);
	}

	#[test]
	fn failed_mutations_report_reason() {
		let mut catalog = seeded();
		let dup = catalog.add_item(item("a", "Again", "base", 1.0));
		assert!(!dup.success);
		assert_eq!(dup.item_id, "a");
		assert!(dup.message.contains("already exists"));

		let missing = catalog.remove_item("zzz");
		assert_eq!(missing.error, Some(CatalogError::NotFound("zzz".into())));
		assert!(!catalog.update_item(item("zzz", "Z", "z", 1.0)).success);
		assert_eq!(catalog.item_count(), 5);
	}

	#[test]
	fn repository_receives_mutations() {
		let mut catalog = Catalog::new(CatalogConfig::default())
			.with_repository(Box::new(InMemoryRepository::new()));
		assert!(catalog.add_item(item("a", "Oak", "base", 1.0)).success);
		assert!(catalog.remove_item("a").success);
		assert_eq!(catalog.item_count(), 0);
	}

	#[test]
	fn invalid_rename_leaves_items_and_repository_alone() {
		let mut catalog = Catalog::new(CatalogConfig::default())
			.with_repository(Box::new(InMemoryRepository::new()));
		assert!(catalog.add_item(item("a", "Oak", "base", 1.0)).success);
		assert!(!catalog.rename_category("base", &"x".repeat(150)));
		assert_eq!(catalog.get_item("a").unwrap().category(), "base");
		assert_eq!(catalog.counts_by_category()["base"], 1);
	}

	#[test]
	fn update_with_fresh_item_keeps_created_at() {
		let mut catalog = seeded();
		let created = catalog.get_item("a").unwrap().created_at();
		assert!(catalog.update_item(item("a", "Oak Cabinet", "base", 120.0)).success);
		assert_eq!(catalog.get_item("a").unwrap().created_at(), created);
	}

	#[test]
	fn recommended_items_for_unknown_category_is_empty() {
		let catalog = seeded();
		assert!(catalog.recommended_items("ghosts", 5).is_empty());
		assert_eq!(catalog.recommended_items("", 3).len(), 3);
	}

	#[test]
	fn similar_items_for_unknown_id_is_empty() {
		assert!(seeded().similar_items("nope", 5).is_empty());
	}
}

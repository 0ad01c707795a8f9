// ---------------------------------------------------------------------------
// Repository — durable storage boundary
// ---------------------------------------------------------------------------
//
// The catalog calls the repository synchronously: `load_all` when hydrating,
// `save` / `delete` before applying a mutation in memory. Failures are
// reported to the caller and never retried.
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use crate::error::CatalogError;
use crate::types::CatalogItem;

pub trait Repository {
	fn load_all(&self) -> Result<Vec<CatalogItem>, CatalogError>;

	/// Insert or replace an item. Returns false on failure.
	fn save(&mut self, item: &CatalogItem) -> bool;

	/// Returns false if the item could not be deleted.
	fn delete(&mut self, id: &str) -> bool;
}

/// Repository kept in process memory, keyed by identifier.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
	items: BTreeMap<String, CatalogItem>,
}

impl InMemoryRepository {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
		Self {
			items: items
				.into_iter()
				.map(|i| (i.id().to_string(), i))
				.collect(),
		}
	}

	pub fn get(&self, id: &str) -> Option<&CatalogItem> {
		self.items.get(id)
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl Repository for InMemoryRepository {
	fn load_all(&self) -> Result<Vec<CatalogItem>, CatalogError> {
		Ok(self.items.values().cloned().collect())
	}

	fn save(&mut self, item: &CatalogItem) -> bool {
		self.items.insert(item.id().to_string(), item.clone());
		true
	}

	fn delete(&mut self, id: &str) -> bool {
		self.items.remove(id).is_some()
	}
}

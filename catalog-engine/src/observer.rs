use crate::error::CatalogError;
use crate::types::CatalogItem;

/// Notification hooks, called synchronously right after the corresponding
/// mutation has been applied (or, for `error`, where it failed).
///
/// All methods default to no-ops so a subscriber implements only what it
/// needs. A catalog holds at most one observer.
pub trait CatalogObserver {
	fn item_added(&mut self, _item: &CatalogItem) {}

	fn item_updated(&mut self, _item: &CatalogItem) {}

	fn item_removed(&mut self, _id: &str) {}

	fn error(&mut self, _error: &CatalogError) {}
}

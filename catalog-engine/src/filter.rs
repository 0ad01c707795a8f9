// ---------------------------------------------------------------------------
// Filter Engine — stateless structured predicate over a single item
// ---------------------------------------------------------------------------

use crate::text::{contains_ignore_case, normalize_category};
use crate::types::{CatalogFilter, CatalogItem};

/// Free text against name, category, specification material and features.
pub fn matches_search_term(item: &CatalogItem, term: &str) -> bool {
	let needle = term.trim().to_lowercase();
	if needle.is_empty() {
		return true;
	}
	let specs = item.specifications();
	contains_ignore_case(item.name(), &needle)
		|| contains_ignore_case(item.category(), &needle)
		|| contains_ignore_case(&specs.material, &needle)
		|| specs
			.features
			.iter()
			.any(|f| contains_ignore_case(f, &needle))
}

pub fn matches_categories(item: &CatalogItem, filter: &CatalogFilter) -> bool {
	filter.categories.is_empty()
		|| filter
			.categories
			.iter()
			.any(|c| normalize_category(c) == item.category())
}

pub fn matches_dimensions(item: &CatalogItem, filter: &CatalogFilter) -> bool {
	item.dimensions()
		.within(&filter.min_dimensions, &filter.max_dimensions)
}

/// Uses the effective price with no material selected.
pub fn matches_price(item: &CatalogItem, filter: &CatalogFilter) -> bool {
	let price = item.effective_price(None);
	price >= filter.min_price && price <= filter.max_price
}

pub fn matches_features(item: &CatalogItem, filter: &CatalogFilter) -> bool {
	filter
		.features
		.iter()
		.all(|f| item.specifications().has_feature(f))
}

/// True iff every criterion of the filter holds for the item.
pub fn matches(item: &CatalogItem, filter: &CatalogFilter) -> bool {
	matches_search_term(item, &filter.search_term)
		&& matches_categories(item, filter)
		&& matches_dimensions(item, filter)
		&& matches_price(item, filter)
		&& matches_features(item, filter)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{Dimensions, Specifications};

	fn cabinet() -> CatalogItem {
		let mut item = CatalogItem::new(
			"cab_1",
			"Oak Base Cabinet",
			"base_cabinets",
			Dimensions::new(0.6, 0.85, 0.6),
			300.0,
		);
		item.set_specifications(Specifications {
			material: "Solid Oak".into(),
			features: vec!["Soft Close".into(), "Adjustable Shelf".into()],
			..Default::default()
		});
		item
	}

	#[test]
	fn default_filter_matches_everything() {
		assert!(matches(&cabinet(), &CatalogFilter::default()));
	}

	#[test]
	fn search_term_checks_each_text_surface() {
		let item = cabinet();
		assert!(matches_search_term(&item, "BASE"));
		assert!(matches_search_term(&item, "cabinets"));
		assert!(matches_search_term(&item, "solid"));
		assert!(matches_search_term(&item, "adjustable"));
		assert!(!matches_search_term(&item, "walnut"));
	}

	#[test]
	fn categories_are_normalized_before_comparison() {
		let item = cabinet();
		assert!(matches(&item, &CatalogFilter::default().with_category("Base Cabinets")));
		assert!(matches(
			&item,
			&CatalogFilter::default()
				.with_category("wall_cabinets")
				.with_category("base_cabinets")
		));
		assert!(!matches(&item, &CatalogFilter::default().with_category("wall_cabinets")));
	}

	#[test]
	fn dimension_bounds_are_inclusive_box() {
		let item = cabinet();
		let exact = Dimensions::new(0.6, 0.85, 0.6);
		assert!(matches_dimensions(
			&item,
			&CatalogFilter::default().with_dimension_range(exact, exact)
		));
		let too_shallow = CatalogFilter::default()
			.with_dimension_range(Dimensions::ZERO, Dimensions::new(10.0, 10.0, 0.5));
		assert!(!matches_dimensions(&item, &too_shallow));
	}

	#[test]
	fn price_bounds_are_inclusive() {
		let item = cabinet();
		assert!(matches_price(&item, &CatalogFilter::default().with_price_range(300.0, 300.0)));
		assert!(!matches_price(&item, &CatalogFilter::default().with_price_range(0.0, 299.99)));
		assert!(!matches_price(&item, &CatalogFilter::default().with_price_range(300.01, 1e9)));
	}

	#[test]
	fn features_require_containment() {
		let item = cabinet();
		let both = CatalogFilter::default()
			.with_feature("soft close")
			.with_feature("Adjustable Shelf");
		assert!(matches_features(&item, &both));
		let extra = both.with_feature("LED Lighting");
		assert!(!matches_features(&item, &extra));
	}

	#[test]
	fn all_criteria_must_hold() {
		let item = cabinet();
		let filter = CatalogFilter::default()
			.with_search_term("oak")
			.with_category("base_cabinets")
			.with_price_range(100.0, 500.0)
			.with_feature("Soft Close");
		assert!(matches(&item, &filter));
		assert!(!matches(&item, &filter.clone().with_search_term("maple")));
		assert!(!matches(&item, &filter.with_price_range(0.0, 10.0)));
	}
}

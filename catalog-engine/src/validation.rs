// ---------------------------------------------------------------------------
// Validation — item invariants and external resource checks
// ---------------------------------------------------------------------------

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Violation;
use crate::text::normalize_category;
use crate::types::CatalogItem;

pub const MAX_NAME_CHARS: usize = 255;
pub const MAX_CATEGORY_CHARS: usize = 100;

fn identifier_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern compiles"))
}

/// Whether `id` matches the identifier grammar (letters, digits, underscore).
pub fn is_valid_identifier(id: &str) -> bool {
	identifier_pattern().is_match(id)
}

/// Check every item invariant and return all violations (empty = valid).
pub fn validate_item(item: &CatalogItem) -> Vec<Violation> {
	let mut violations = Vec::new();

	if !is_valid_identifier(item.id()) {
		violations.push(Violation::InvalidIdentifier(item.id().to_string()));
	}

	let name_chars = item.name().chars().count();
	if item.name().trim().is_empty() {
		violations.push(Violation::EmptyName);
	} else if name_chars > MAX_NAME_CHARS {
		violations.push(Violation::NameTooLong(name_chars));
	}

	let category_chars = item.category().chars().count();
	if normalize_category(item.category()).is_empty() {
		violations.push(Violation::EmptyCategory);
	} else if category_chars > MAX_CATEGORY_CHARS {
		violations.push(Violation::CategoryTooLong(category_chars));
	}

	let dims = item.dimensions();
	if !dims.is_valid() {
		violations.push(Violation::NonPositiveDimensions {
			width: dims.width,
			height: dims.height,
			depth: dims.depth,
		});
	}

	let price = item.base_price();
	if !(price.is_finite() && price >= 0.0) {
		violations.push(Violation::NegativePrice(price));
	}

	violations
}

/// Check that the item's thumbnail and model references resolve to existing
/// files. Relative paths are resolved against `base_path`.
pub fn check_resources(item: &CatalogItem, base_path: &Path) -> Vec<Violation> {
	let mut violations = Vec::new();
	let references = [
		("Thumbnail", item.thumbnail_path()),
		("Model", item.model_path()),
	];
	for (kind, reference) in references {
		let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
			continue;
		};
		let candidate = Path::new(reference);
		let resolved = if candidate.is_absolute() {
			candidate.to_path_buf()
		} else {
			base_path.join(candidate)
		};
		if !resolved.is_file() {
			violations.push(Violation::MissingResource {
				kind: kind.to_string(),
				path: resolved.display().to_string(),
			});
		}
	}
	violations
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Dimensions;

	fn item(id: &str, name: &str, category: &str) -> CatalogItem {
		CatalogItem::new(id, name, category, Dimensions::new(0.6, 0.85, 0.6), 300.0)
	}

	#[test]
	fn valid_item_has_no_violations() {
		assert!(validate_item(&item("cab_1", "Oak Base Cabinet", "base_cabinets")).is_empty());
	}

	#[test]
	fn identifier_grammar() {
		assert!(is_valid_identifier("cab_1"));
		assert!(is_valid_identifier("A9"));
		assert!(!is_valid_identifier(""));
		assert!(!is_valid_identifier("cab-1"));
		assert!(!is_valid_identifier("cab 1"));
	}

	#[test]
	fn reports_one_violation_per_broken_invariant() {
		let bad = CatalogItem::new("bad id", " ", "", Dimensions::new(0.0, 1.0, -1.0), -5.0);
		let violations = validate_item(&bad);
		assert_eq!(violations.len(), 5);
		assert!(matches!(violations[0], Violation::InvalidIdentifier(_)));
		assert_eq!(violations[1], Violation::EmptyName);
		assert_eq!(violations[2], Violation::EmptyCategory);
		assert!(matches!(violations[3], Violation::NonPositiveDimensions { .. }));
		assert_eq!(violations[4], Violation::NegativePrice(-5.0));
	}

	#[test]
	fn length_limits_count_characters() {
		let name = "é".repeat(MAX_NAME_CHARS);
		assert!(validate_item(&item("a", &name, "c")).is_empty());
		let too_long = "x".repeat(MAX_NAME_CHARS + 1);
		assert_eq!(
			validate_item(&item("a", &too_long, "c")),
			vec![Violation::NameTooLong(MAX_NAME_CHARS + 1)]
		);
		let category = "c".repeat(MAX_CATEGORY_CHARS + 1);
		assert_eq!(
			validate_item(&item("a", "n", &category)),
			vec![Violation::CategoryTooLong(MAX_CATEGORY_CHARS + 1)]
		);
	}

	#[test]
	fn zero_price_is_allowed() {
		let free = CatalogItem::new("free", "Sample", "misc", Dimensions::new(1.0, 1.0, 1.0), 0.0);
		assert!(validate_item(&free).is_empty());
	}

	#[test]
	fn resources_resolve_against_base_path() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::create_dir_all(dir.path().join("thumbs")).unwrap();
		std::fs::write(dir.path().join("thumbs/cab.png"), b"png").unwrap();

		let mut ok = item("cab_1", "Cabinet", "base");
		ok.set_thumbnail_path(Some("thumbs/cab.png".into()));
		assert!(check_resources(&ok, dir.path()).is_empty());

		let mut missing = item("cab_2", "Cabinet", "base");
		missing.set_model_path(Some("models/cab.glb".into()));
		let violations = check_resources(&missing, dir.path());
		assert_eq!(violations.len(), 1);
		assert_eq!(violations[0].code(), "ITEM_MISSING_RESOURCE");
	}

	#[test]
	fn empty_resource_references_are_ignored() {
		let dir = tempfile::tempdir().unwrap();
		let mut it = item("cab_1", "Cabinet", "base");
		it.set_thumbnail_path(Some(String::new()));
		assert!(check_resources(&it, dir.path()).is_empty());
	}
}

// ---------------------------------------------------------------------------
// Interchange — JSON item decoding/encoding for import/export adapters
// ---------------------------------------------------------------------------
//
// Decoding is parse-then-validate: each field is read on its own, a type
// mismatch becomes a `MalformedField` violation instead of aborting, optional
// fields fall back to defaults, and the assembled item then goes through the
// regular invariant checks. The caller gets either a valid item or every
// problem found.
// ---------------------------------------------------------------------------

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::ImportExportOptions;
use crate::error::{CatalogError, Violation};
use crate::types::{CatalogItem, Dimensions, MaterialOption, Specifications};
use crate::validation::validate_item;

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

fn malformed(field: &str, expected: &str) -> Violation {
	Violation::MalformedField {
		field: field.to_string(),
		expected: expected.to_string(),
	}
}

struct FieldReader<'a> {
	object: &'a Map<String, Value>,
	violations: Vec<Violation>,
}

impl<'a> FieldReader<'a> {
	fn string(&mut self, field: &str) -> Option<String> {
		match self.object.get(field) {
			None | Some(Value::Null) => None,
			Some(Value::String(s)) => Some(s.clone()),
			Some(_) => {
				self.violations.push(malformed(field, "a string"));
				None
			}
		}
	}

	fn number(&mut self, field: &str) -> Option<f64> {
		match self.object.get(field) {
			None | Some(Value::Null) => None,
			Some(Value::Number(n)) => n.as_f64(),
			Some(_) => {
				self.violations.push(malformed(field, "a number"));
				None
			}
		}
	}

	fn typed<T: DeserializeOwned>(&mut self, field: &str, expected: &str) -> Option<T> {
		match self.object.get(field) {
			None | Some(Value::Null) => None,
			Some(value) => match serde_json::from_value(value.clone()) {
				Ok(parsed) => Some(parsed),
				Err(e) => {
					tracing::debug!(field, error = %e, "malformed interchange field");
					self.violations.push(malformed(field, expected));
					None
				}
			},
		}
	}

	fn timestamp(&mut self, field: &str) -> Option<DateTime<Utc>> {
		let raw = self.string(field)?;
		match DateTime::parse_from_rfc3339(&raw) {
			Ok(ts) => Some(ts.with_timezone(&Utc)),
			Err(_) => {
				self.violations.push(malformed(field, "an RFC 3339 timestamp"));
				None
			}
		}
	}
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode and validate an item from its JSON interchange form.
///
/// Required: `id`, `name`, `category`, `dimensions`. Everything else
/// defaults: `basePrice` 0, no materials, empty specifications, no resource
/// paths, timestamps set to now.
pub fn item_from_json(value: &Value) -> Result<CatalogItem, Vec<Violation>> {
	let Some(object) = value.as_object() else {
		return Err(vec![malformed("<root>", "an object")]);
	};
	let mut reader = FieldReader {
		object,
		violations: Vec::new(),
	};

	let id = reader.string("id").unwrap_or_default();
	let name = reader.string("name").unwrap_or_default();
	let category = reader.string("category").unwrap_or_default();
	let dimensions: Dimensions = match reader.typed("dimensions", "{width, height, depth} numbers") {
		Some(d) => d,
		None => {
			if !object.contains_key("dimensions") {
				reader.violations.push(malformed("dimensions", "{width, height, depth} numbers"));
			}
			Dimensions::ZERO
		}
	};
	let base_price = reader.number("basePrice").unwrap_or(0.0);
	let materials: Vec<MaterialOption> = reader
		.typed("materials", "a list of material options")
		.unwrap_or_default();
	let specifications: Specifications = reader
		.typed("specifications", "a specifications object")
		.unwrap_or_default();
	let model_path = reader.string("modelPath");
	let thumbnail_path = reader.string("thumbnailPath");
	let created_at = reader.timestamp("createdAt");
	let updated_at = reader.timestamp("updatedAt");

	let mut item = CatalogItem::new(id, name, category, dimensions, base_price);
	for option in materials {
		item.add_material_option(option);
	}
	item.set_specifications(specifications);
	item.set_model_path(model_path);
	item.set_thumbnail_path(thumbnail_path);
	// Each stored timestamp stands on its own; a missing one falls back to
	// the other, then to now.
	let created = created_at.or(updated_at).unwrap_or(item.created_at());
	let updated = updated_at.or(created_at).unwrap_or(item.updated_at());
	item.set_timestamps(created, updated);

	let mut violations = reader.violations;
	// A malformed dimensions field already explains the zero box.
	let skip_dimension_violation = violations
		.iter()
		.any(|v| matches!(v, Violation::MalformedField { field, .. } if field == "dimensions"));
	violations.extend(validate_item(&item).into_iter().filter(|v| {
		!(skip_dimension_violation && matches!(v, Violation::NonPositiveDimensions { .. }))
	}));

	if violations.is_empty() {
		Ok(item)
	} else {
		Err(violations)
	}
}

/// Apply import options to a decoded item: drop images or materials when
/// excluded and prefix relative resource paths with the configured bases.
/// The item's timestamps are left as decoded.
pub fn apply_import_options(item: &mut CatalogItem, options: &ImportExportOptions) {
	let (created, updated) = (item.created_at(), item.updated_at());
	if !options.include_materials && !item.materials().is_empty() {
		item.clear_material_options();
	}
	if !options.include_images {
		if item.thumbnail_path().is_some() {
			item.set_thumbnail_path(None);
		}
	} else if let Some(path) = item.thumbnail_path() {
		let joined = join_base(&options.image_base_path, path);
		if joined != path {
			item.set_thumbnail_path(Some(joined));
		}
	}
	if let Some(path) = item.model_path() {
		let joined = join_base(&options.model_base_path, path);
		if joined != path {
			item.set_model_path(Some(joined));
		}
	}
	item.set_timestamps(created, updated);
}

fn join_base(base: &str, path: &str) -> String {
	if base.is_empty() || path.is_empty() || Path::new(path).is_absolute() {
		return path.to_string();
	}
	Path::new(base).join(path).display().to_string()
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode an item in the same shape `item_from_json` reads.
pub fn item_to_json(item: &CatalogItem, options: &ImportExportOptions) -> Value {
	let mut value = serde_json::to_value(item).unwrap_or(Value::Null);
	if let Some(object) = value.as_object_mut() {
		if !options.include_materials {
			object.remove("materials");
		}
		if !options.include_images {
			object.remove("thumbnailPath");
		}
	}
	value
}

// ---------------------------------------------------------------------------
// Import report
// ---------------------------------------------------------------------------

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
	pub added: Vec<String>,
	pub updated: Vec<String>,
	/// Existing ids left alone because overwriting was disabled.
	pub skipped: Vec<String>,
	/// Entries that failed to decode or to apply, by position in the input.
	pub rejected: Vec<(usize, CatalogError)>,
}

impl ImportReport {
	pub fn processed(&self) -> usize {
		self.added.len() + self.updated.len() + self.skipped.len() + self.rejected.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn cabinet_json() -> Value {
		json!({
			"id": "cab_1",
			"name": "Oak Base Cabinet",
			"category": "base_cabinets",
			"dimensions": { "width": 0.6, "height": 0.85, "depth": 0.6 },
			"basePrice": 300.0,
			"materials": [
				{ "id": "oak", "name": "Oak", "priceModifier": 10.0 },
				{ "id": "oak", "name": "Smoked Oak", "priceModifier": 25.0 }
			],
			"specifications": { "material": "Oak", "features": ["Soft Close"] },
			"thumbnailPath": "cab_1.png",
			"createdAt": "2024-03-01T10:00:00Z"
		})
	}

	#[test]
	fn decodes_complete_item() {
		let item = item_from_json(&cabinet_json()).unwrap();
		assert_eq!(item.id(), "cab_1");
		assert_eq!(item.dimensions(), Dimensions::new(0.6, 0.85, 0.6));
		assert_eq!(item.materials().len(), 1);
		assert_eq!(item.effective_price(Some("oak")), 325.0);
		assert!(item.specifications().has_feature("soft close"));
		assert_eq!(item.created_at().to_rfc3339(), "2024-03-01T10:00:00+00:00");
		assert_eq!(item.updated_at(), item.created_at());
	}

	#[test]
	fn updated_at_restored_without_created_at() {
		let mut value = cabinet_json();
		let object = value.as_object_mut().unwrap();
		object.remove("createdAt");
		object.insert("updatedAt".into(), json!("2024-05-01T08:30:00Z"));

		let item = item_from_json(&value).unwrap();
		assert_eq!(item.updated_at().to_rfc3339(), "2024-05-01T08:30:00+00:00");
		assert_eq!(item.created_at(), item.updated_at());
	}

	#[test]
	fn import_options_keep_decoded_timestamps() {
		let mut value = cabinet_json();
		value["updatedAt"] = json!("2024-04-02T12:00:00Z");
		let mut item = item_from_json(&value).unwrap();
		let (created, updated) = (item.created_at(), item.updated_at());

		let options = ImportExportOptions {
			include_images: false,
			include_materials: false,
			model_base_path: "models".into(),
			..Default::default()
		};
		apply_import_options(&mut item, &options);
		assert!(item.materials().is_empty());
		assert_eq!(item.created_at(), created);
		assert_eq!(item.updated_at(), updated);
		assert_eq!(updated.to_rfc3339(), "2024-04-02T12:00:00+00:00");
	}

	#[test]
	fn optional_fields_default() {
		let item = item_from_json(&json!({
			"id": "x",
			"name": "Panel",
			"category": "panels",
			"dimensions": { "width": 1.0, "height": 2.0, "depth": 0.02 }
		}))
		.unwrap();
		assert_eq!(item.base_price(), 0.0);
		assert!(item.materials().is_empty());
		assert!(item.thumbnail_path().is_none());
	}

	#[test]
	fn collects_every_problem() {
		let violations = item_from_json(&json!({
			"id": "bad id",
			"name": 42,
			"category": "base",
			"dimensions": "large",
			"basePrice": "cheap",
			"createdAt": "yesterday"
		}))
		.unwrap_err();
		let codes: Vec<&str> = violations.iter().map(|v| v.code()).collect();
		assert_eq!(
			codes,
			vec![
				"ITEM_MALFORMED_FIELD", // name
				"ITEM_MALFORMED_FIELD", // dimensions
				"ITEM_MALFORMED_FIELD", // basePrice
				"ITEM_MALFORMED_FIELD", // createdAt
				"ITEM_INVALID_ID",
				"ITEM_EMPTY_NAME",
			]
		);
	}

	#[test]
	fn missing_dimensions_is_reported_once() {
		let violations = item_from_json(&json!({
			"id": "x", "name": "n", "category": "c"
		}))
		.unwrap_err();
		assert_eq!(violations.len(), 1);
		assert!(matches!(&violations[0], Violation::MalformedField { field, .. } if field == "dimensions"));
	}

	#[test]
	fn non_object_is_rejected() {
		assert_eq!(item_from_json(&json!([1, 2])).unwrap_err().len(), 1);
	}

	#[test]
	fn export_round_trips_through_import() {
		let item = item_from_json(&cabinet_json()).unwrap();
		let exported = item_to_json(&item, &ImportExportOptions::default());
		assert_eq!(exported["basePrice"], 300.0);
		let again = item_from_json(&exported).unwrap();
		assert_eq!(again, item);
	}

	#[test]
	fn export_honours_exclusions() {
		let item = item_from_json(&cabinet_json()).unwrap();
		let options = ImportExportOptions {
			include_images: false,
			include_materials: false,
			..Default::default()
		};
		let exported = item_to_json(&item, &options);
		assert!(exported.get("materials").is_none());
		assert!(exported.get("thumbnailPath").is_none());
		assert_eq!(exported["name"], "Oak Base Cabinet");
	}

	#[test]
	fn import_options_prefix_and_strip() {
		let mut item = item_from_json(&cabinet_json()).unwrap();
		item.set_model_path(Some("/abs/cab.glb".into()));
		let options = ImportExportOptions {
			image_base_path: "images".into(),
			model_base_path: "models".into(),
			include_materials: false,
			..Default::default()
		};
		apply_import_options(&mut item, &options);
		assert_eq!(item.thumbnail_path(), Some("images/cab_1.png"));
		assert_eq!(item.model_path(), Some("/abs/cab.glb"));
		assert!(item.materials().is_empty());

		let no_images = ImportExportOptions {
			include_images: false,
			..Default::default()
		};
		apply_import_options(&mut item, &no_images);
		assert!(item.thumbnail_path().is_none());
	}
}

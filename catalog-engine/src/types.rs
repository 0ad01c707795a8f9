use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// Width, height and depth of an item in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
	pub width: f64,
	pub height: f64,
	pub depth: f64,
}

impl Dimensions {
	pub const ZERO: Dimensions = Dimensions {
		width: 0.0,
		height: 0.0,
		depth: 0.0,
	};

	pub const UNBOUNDED: Dimensions = Dimensions {
		width: f64::INFINITY,
		height: f64::INFINITY,
		depth: f64::INFINITY,
	};

	pub fn new(width: f64, height: f64, depth: f64) -> Self {
		Self {
			width,
			height,
			depth,
		}
	}

	/// True when all three axes are finite and strictly positive.
	pub fn is_valid(&self) -> bool {
		[self.width, self.height, self.depth]
			.iter()
			.all(|v| v.is_finite() && *v > 0.0)
	}

	/// Box containment: every axis lies within `[min, max]` inclusive.
	pub fn within(&self, min: &Dimensions, max: &Dimensions) -> bool {
		(min.width..=max.width).contains(&self.width)
			&& (min.height..=max.height).contains(&self.height)
			&& (min.depth..=max.depth).contains(&self.depth)
	}
}

impl Default for Dimensions {
	fn default() -> Self {
		Self::ZERO
	}
}

// ---------------------------------------------------------------------------
// MaterialOption / Specifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialOption {
	pub id: String,
	pub name: String,
	#[serde(rename = "texturePath", default)]
	pub texture_path: String,
	#[serde(rename = "priceModifier", default)]
	pub price_modifier: f64,
	#[serde(default)]
	pub properties: BTreeMap<String, String>,
}

impl MaterialOption {
	pub fn new(id: impl Into<String>, name: impl Into<String>, price_modifier: f64) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			texture_path: String::new(),
			price_modifier,
			properties: BTreeMap::new(),
		}
	}
}

/// Descriptive data shown to users; `material` and `features` also feed the
/// filter engine's free-text and feature criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Specifications {
	pub material: String,
	pub finish: String,
	pub hardware: String,
	pub weight: Option<f64>,
	#[serde(rename = "loadCapacity")]
	pub load_capacity: Option<f64>,
	#[serde(rename = "installationType")]
	pub installation_type: String,
	pub features: Vec<String>,
	#[serde(rename = "additionalInfo")]
	pub additional_info: BTreeMap<String, String>,
}

impl Specifications {
	/// Case-insensitive feature lookup.
	pub fn has_feature(&self, feature: &str) -> bool {
		let wanted = feature.trim().to_lowercase();
		self.features
			.iter()
			.any(|f| f.trim().to_lowercase() == wanted)
	}
}

// ---------------------------------------------------------------------------
// CatalogItem
// ---------------------------------------------------------------------------

/// One placeable design element.
///
/// The identifier and creation time are fixed at construction. Every setter
/// refreshes `updated_at`. Items held by the store are only reachable through
/// shared references; changing one means cloning it, editing the clone and
/// passing it back through `update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
	id: String,
	name: String,
	category: String,
	dimensions: Dimensions,
	#[serde(rename = "basePrice")]
	base_price: f64,
	materials: Vec<MaterialOption>,
	specifications: Specifications,
	#[serde(rename = "modelPath")]
	model_path: Option<String>,
	#[serde(rename = "thumbnailPath")]
	thumbnail_path: Option<String>,
	#[serde(rename = "createdAt")]
	created_at: DateTime<Utc>,
	#[serde(rename = "updatedAt")]
	updated_at: DateTime<Utc>,
}

impl CatalogItem {
	pub fn new(
		id: impl Into<String>,
		name: impl Into<String>,
		category: impl Into<String>,
		dimensions: Dimensions,
		base_price: f64,
	) -> Self {
		let now = Utc::now();
		Self {
			id: id.into(),
			name: name.into(),
			category: category.into(),
			dimensions,
			base_price,
			materials: Vec::new(),
			specifications: Specifications::default(),
			model_path: None,
			thumbnail_path: None,
			created_at: now,
			updated_at: now,
		}
	}

	/// A fresh identifier that satisfies the identifier grammar.
	pub fn generate_id() -> String {
		format!("item_{}", Uuid::new_v4().simple())
	}

	// -- Accessors -----------------------------------------------------------

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn category(&self) -> &str {
		&self.category
	}

	pub fn dimensions(&self) -> Dimensions {
		self.dimensions
	}

	pub fn base_price(&self) -> f64 {
		self.base_price
	}

	pub fn materials(&self) -> &[MaterialOption] {
		&self.materials
	}

	pub fn material(&self, option_id: &str) -> Option<&MaterialOption> {
		self.materials.iter().find(|m| m.id == option_id)
	}

	pub fn specifications(&self) -> &Specifications {
		&self.specifications
	}

	pub fn model_path(&self) -> Option<&str> {
		self.model_path.as_deref()
	}

	pub fn thumbnail_path(&self) -> Option<&str> {
		self.thumbnail_path.as_deref()
	}

	pub fn created_at(&self) -> DateTime<Utc> {
		self.created_at
	}

	pub fn updated_at(&self) -> DateTime<Utc> {
		self.updated_at
	}

	/// Base price plus the selected material's modifier, floored at zero.
	/// An unknown material id prices at the base.
	pub fn effective_price(&self, material: Option<&str>) -> f64 {
		let modifier = material
			.and_then(|id| self.material(id))
			.map_or(0.0, |m| m.price_modifier);
		(self.base_price + modifier).max(0.0)
	}

	// -- Setters -------------------------------------------------------------

	fn touch(&mut self) {
		self.updated_at = Utc::now();
	}

	pub fn set_name(&mut self, name: impl Into<String>) {
		self.name = name.into();
		self.touch();
	}

	pub fn set_category(&mut self, category: impl Into<String>) {
		self.category = category.into();
		self.touch();
	}

	pub fn set_dimensions(&mut self, dimensions: Dimensions) {
		self.dimensions = dimensions;
		self.touch();
	}

	pub fn set_base_price(&mut self, price: f64) {
		self.base_price = price;
		self.touch();
	}

	/// Add a material option, replacing in place any option with the same id.
	pub fn add_material_option(&mut self, option: MaterialOption) {
		match self.materials.iter_mut().find(|m| m.id == option.id) {
			Some(existing) => *existing = option,
			None => self.materials.push(option),
		}
		self.touch();
	}

	pub fn remove_material_option(&mut self, option_id: &str) -> bool {
		let before = self.materials.len();
		self.materials.retain(|m| m.id != option_id);
		let removed = self.materials.len() != before;
		if removed {
			self.touch();
		}
		removed
	}

	pub fn clear_material_options(&mut self) {
		self.materials.clear();
		self.touch();
	}

	pub fn set_specifications(&mut self, specifications: Specifications) {
		self.specifications = specifications;
		self.touch();
	}

	pub fn set_model_path(&mut self, path: Option<String>) {
		self.model_path = path;
		self.touch();
	}

	pub fn set_thumbnail_path(&mut self, path: Option<String>) {
		self.thumbnail_path = path;
		self.touch();
	}

	/// Restore persisted timestamps. Meant for import adapters and
	/// repositories rehydrating stored items.
	pub fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
		self.created_at = created_at;
		self.updated_at = updated_at;
	}

	/// Category rewrite performed by the store when it normalizes on write.
	/// Does not count as a user edit, so `updated_at` is left alone.
	pub(crate) fn normalize_category_in_place(&mut self, normalized: String) {
		self.category = normalized;
	}
}

// ---------------------------------------------------------------------------
// CatalogFilter
// ---------------------------------------------------------------------------

/// Structured filter. Every non-empty criterion must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogFilter {
	pub search_term: String,
	/// Acceptable categories; empty accepts any.
	pub categories: BTreeSet<String>,
	pub min_dimensions: Dimensions,
	pub max_dimensions: Dimensions,
	pub min_price: f64,
	pub max_price: f64,
	/// Features the item must all carry; empty requires none.
	pub features: BTreeSet<String>,
}

impl Default for CatalogFilter {
	fn default() -> Self {
		Self {
			search_term: String::new(),
			categories: BTreeSet::new(),
			min_dimensions: Dimensions::ZERO,
			max_dimensions: Dimensions::UNBOUNDED,
			min_price: 0.0,
			max_price: f64::INFINITY,
			features: BTreeSet::new(),
		}
	}
}

impl CatalogFilter {
	pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
		self.search_term = term.into();
		self
	}

	pub fn with_category(mut self, category: impl Into<String>) -> Self {
		self.categories.insert(category.into());
		self
	}

	pub fn with_dimension_range(mut self, min: Dimensions, max: Dimensions) -> Self {
		self.min_dimensions = min;
		self.max_dimensions = max;
		self
	}

	pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
		self.min_price = min;
		self.max_price = max;
		self
	}

	pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
		self.features.insert(feature.into());
		self
	}
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// One page of a candidate set.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
	pub items: Vec<CatalogItem>,
	/// Size of the whole candidate set before pagination.
	pub total_count: usize,
	pub offset: usize,
	pub limit: usize,
}

impl SearchPage {
	pub fn has_more(&self) -> bool {
		self.offset + self.items.len() < self.total_count
	}

	pub fn ids(&self) -> Vec<&str> {
		self.items.iter().map(|i| i.id()).collect()
	}
}

/// Per-criterion similarity contributions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimilarityScores {
	pub category: f64,
	pub dimensions: f64,
	pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
	pub item: CatalogItem,
	pub score: f64,
	pub scores: SimilarityScores,
}

/// Display-ready outcome of a mutating call.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
	pub success: bool,
	pub message: String,
	pub item_id: String,
	pub error: Option<crate::error::CatalogError>,
}

impl OperationResult {
	pub fn ok(item_id: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			success: true,
			message: message.into(),
			item_id: item_id.into(),
			error: None,
		}
	}

	pub fn failed(item_id: impl Into<String>, error: crate::error::CatalogError) -> Self {
		Self {
			success: false,
			message: error.to_string(),
			item_id: item_id.into(),
			error: Some(error),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cabinet() -> CatalogItem {
		CatalogItem::new(
			"cab_1",
			"Oak Base Cabinet",
			"base_cabinets",
			Dimensions::new(0.6, 0.85, 0.6),
			300.0,
		)
	}

	#[test]
	fn generated_ids_are_unique_and_well_formed() {
		let a = CatalogItem::generate_id();
		let b = CatalogItem::generate_id();
		assert_ne!(a, b);
		assert!(a.starts_with("item_"));
		assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
	}

	#[test]
	fn dimensions_validity() {
		assert!(Dimensions::new(0.6, 0.85, 0.6).is_valid());
		assert!(!Dimensions::new(0.6, 0.0, 0.6).is_valid());
		assert!(!Dimensions::new(f64::NAN, 1.0, 1.0).is_valid());
		assert!(!Dimensions::UNBOUNDED.is_valid());
	}

	#[test]
	fn dimensions_box_containment_is_per_axis() {
		let d = Dimensions::new(0.6, 0.85, 0.6);
		assert!(d.within(&Dimensions::new(0.6, 0.8, 0.5), &Dimensions::new(0.6, 0.9, 0.6)));
		// Volume fits but depth exceeds the box.
		assert!(!d.within(&Dimensions::ZERO, &Dimensions::new(2.0, 2.0, 0.5)));
	}

	#[test]
	fn re_adding_material_replaces_in_place() {
		let mut item = cabinet();
		item.add_material_option(MaterialOption::new("oak", "Oak", 10.0));
		item.add_material_option(MaterialOption::new("walnut", "Walnut", 40.0));
		item.add_material_option(MaterialOption::new("oak", "Smoked Oak", 25.0));
		assert_eq!(item.materials().len(), 2);
		assert_eq!(item.materials()[0].name, "Smoked Oak");
		assert_eq!(item.effective_price(Some("oak")), 325.0);
	}

	#[test]
	fn effective_price_floors_at_zero() {
		let mut item = cabinet();
		item.add_material_option(MaterialOption::new("promo", "Promo", -500.0));
		assert_eq!(item.effective_price(Some("promo")), 0.0);
		assert_eq!(item.effective_price(Some("missing")), 300.0);
		assert_eq!(item.effective_price(None), 300.0);
	}

	#[test]
	fn setters_refresh_updated_at_only() {
		let mut item = cabinet();
		let old = DateTime::<Utc>::from_timestamp(1_000, 0).unwrap();
		item.set_timestamps(old, old);
		item.set_name("Walnut Base Cabinet");
		assert_eq!(item.created_at(), old);
		assert!(item.updated_at() > old);
	}

	#[test]
	fn remove_material_reports_presence() {
		let mut item = cabinet();
		item.add_material_option(MaterialOption::new("oak", "Oak", 0.0));
		assert!(item.remove_material_option("oak"));
		assert!(!item.remove_material_option("oak"));
	}

	#[test]
	fn has_feature_ignores_case() {
		let specs = Specifications {
			features: vec!["Soft Close".into()],
			..Default::default()
		};
		assert!(specs.has_feature(" soft close"));
		assert!(!specs.has_feature("push open"));
	}

	#[test]
	fn page_has_more() {
		let page = SearchPage {
			items: vec![cabinet()],
			total_count: 3,
			offset: 1,
			limit: 1,
		};
		assert!(page.has_more());
		let last = SearchPage {
			offset: 2,
			..page
		};
		assert!(!last.has_more());
	}
}

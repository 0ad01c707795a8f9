use std::path::PathBuf;

use serde::Deserialize;

use crate::error::CatalogError;

/// Defaults applied by the JSON import/export adapter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImportExportOptions {
	#[serde(rename = "includeImages")]
	pub include_images: bool,
	#[serde(rename = "includeMaterials")]
	pub include_materials: bool,
	#[serde(rename = "overwriteExisting")]
	pub overwrite_existing: bool,
	#[serde(rename = "imageBasePath")]
	pub image_base_path: String,
	#[serde(rename = "modelBasePath")]
	pub model_base_path: String,
}

impl Default for ImportExportOptions {
	fn default() -> Self {
		Self {
			include_images: true,
			include_materials: true,
			overwrite_existing: false,
			image_base_path: String::new(),
			model_base_path: String::new(),
		}
	}
}

/// Configuration for a `Catalog`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
	/// Base for resolving relative thumbnail and model paths. When unset,
	/// resource references are not checked.
	#[serde(rename = "catalogBasePath")]
	pub catalog_base_path: Option<PathBuf>,
	#[serde(rename = "importExport")]
	pub import_export: ImportExportOptions,
	/// Also index specification material, finish and feature words.
	#[serde(rename = "indexSpecifications")]
	pub index_specifications: bool,
}

impl CatalogConfig {
	pub fn from_json(json: &str) -> Result<Self, CatalogError> {
		serde_json::from_str(json).map_err(|e| CatalogError::Config(e.to_string()))
	}

	pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.catalog_base_path = Some(path.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = CatalogConfig::default();
		assert!(config.catalog_base_path.is_none());
		assert!(config.import_export.include_images);
		assert!(config.import_export.include_materials);
		assert!(!config.import_export.overwrite_existing);
		assert!(!config.index_specifications);
	}

	#[test]
	fn parses_partial_json() {
		let config = CatalogConfig::from_json(
			r#"{"catalogBasePath": "/srv/catalog", "importExport": {"overwriteExisting": true}}"#,
		)
		.unwrap();
		assert_eq!(config.catalog_base_path, Some(PathBuf::from("/srv/catalog")));
		assert!(config.import_export.overwrite_existing);
		assert!(config.import_export.include_images);
	}

	#[test]
	fn empty_object_is_default() {
		assert_eq!(CatalogConfig::from_json("{}").unwrap(), CatalogConfig::default());
	}

	#[test]
	fn malformed_json_is_config_error() {
		let err = CatalogConfig::from_json(r#"{"indexSpecifications": "yes"}"#).unwrap_err();
		assert_eq!(err.code(), "CATALOG_CONFIG");
	}
}

use thiserror::Error;

/// A single violated item invariant. Validation collects every violation
/// instead of stopping at the first one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
	#[error("Invalid identifier {0:?}: must be non-empty letters, digits or underscore")]
	InvalidIdentifier(String),
	#[error("Name must not be empty")]
	EmptyName,
	#[error("Name is {0} characters long (max 255)")]
	NameTooLong(usize),
	#[error("Category must not be empty")]
	EmptyCategory,
	#[error("Category is {0} characters long (max 100)")]
	CategoryTooLong(usize),
	#[error("Dimensions must be positive, got {width} x {height} x {depth}")]
	NonPositiveDimensions { width: f64, height: f64, depth: f64 },
	#[error("Base price must be non-negative, got {0}")]
	NegativePrice(f64),
	#[error("{kind} not found: {path}")]
	MissingResource { kind: String, path: String },
	#[error("Field {field:?} is malformed: expected {expected}")]
	MalformedField { field: String, expected: String },
}

impl Violation {
	pub fn code(&self) -> &str {
		match self {
			Self::InvalidIdentifier(_) => "ITEM_INVALID_ID",
			Self::EmptyName => "ITEM_EMPTY_NAME",
			Self::NameTooLong(_) => "ITEM_NAME_TOO_LONG",
			Self::EmptyCategory => "ITEM_EMPTY_CATEGORY",
			Self::CategoryTooLong(_) => "ITEM_CATEGORY_TOO_LONG",
			Self::NonPositiveDimensions { .. } => "ITEM_BAD_DIMENSIONS",
			Self::NegativePrice(_) => "ITEM_NEGATIVE_PRICE",
			Self::MissingResource { .. } => "ITEM_MISSING_RESOURCE",
			Self::MalformedField { .. } => "ITEM_MALFORMED_FIELD",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
	#[error("Item {id:?} is invalid: {}", join_violations(.violations))]
	Validation { id: String, violations: Vec<Violation> },
	#[error("Item already exists: {0}")]
	AlreadyExists(String),
	#[error("Item not found: {0}")]
	NotFound(String),
	#[error("Repository failed to {operation} item {id}")]
	Persistence { id: String, operation: String },
	#[error("Repository error: {0}")]
	Repository(String),
	#[error("Configuration error: {0}")]
	Config(String),
}

fn join_violations(violations: &[Violation]) -> String {
	violations
		.iter()
		.map(|v| v.to_string())
		.collect::<Vec<_>>()
		.join("; ")
}

impl CatalogError {
	pub fn code(&self) -> &str {
		match self {
			Self::Validation { .. } => "CATALOG_VALIDATION",
			Self::AlreadyExists(_) => "CATALOG_DUPLICATE_ID",
			Self::NotFound(_) => "CATALOG_NOT_FOUND",
			Self::Persistence { .. } => "CATALOG_PERSISTENCE",
			Self::Repository(_) => "CATALOG_REPOSITORY",
			Self::Config(_) => "CATALOG_CONFIG",
		}
	}

	/// The identifier the error refers to, when there is one.
	pub fn item_id(&self) -> Option<&str> {
		match self {
			Self::Validation { id, .. }
			| Self::AlreadyExists(id)
			| Self::NotFound(id)
			| Self::Persistence { id, .. } => Some(id),
			Self::Repository(_) | Self::Config(_) => None,
		}
	}

	pub fn to_json(&self) -> serde_json::Value {
		let mut payload = serde_json::json!({
			"catalogCode": self.code(),
			"message": self.to_string(),
		});
		if let Self::Validation { violations, .. } = self {
			payload["violations"] = violations
				.iter()
				.map(|v| serde_json::json!({ "code": v.code(), "message": v.to_string() }))
				.collect();
		}
		payload
	}
}

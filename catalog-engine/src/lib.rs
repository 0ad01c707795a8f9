pub mod catalog;
pub mod category_index;
pub mod config;
pub mod error;
pub mod filter;
pub mod interchange;
pub mod inverted_index;
pub mod observer;
pub mod recommendation;
pub mod repository;
pub mod store;
pub mod text;
pub mod types;
pub mod validation;

pub use catalog::{Catalog, HydrateReport};
pub use config::{CatalogConfig, ImportExportOptions};
pub use error::{CatalogError, Violation};
pub use observer::CatalogObserver;
pub use repository::{InMemoryRepository, Repository};
pub use types::{
	CatalogFilter, CatalogItem, Dimensions, MaterialOption, OperationResult, Recommendation,
	SearchPage, SimilarityScores, Specifications,
};

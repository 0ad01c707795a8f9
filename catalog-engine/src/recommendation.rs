// ---------------------------------------------------------------------------
// Recommendation Engine — item similarity and recency recommenders
// ---------------------------------------------------------------------------
//
// Pure scoring functions; the store supplies candidates. Each criterion is
// clamped independently before summing.
// ---------------------------------------------------------------------------

use std::cmp::Ordering;

use crate::types::{CatalogItem, Dimensions, Recommendation, SimilarityScores};

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

pub const CATEGORY_WEIGHT: f64 = 50.0;
pub const DIMENSION_WEIGHT: f64 = 30.0;
pub const PRICE_WEIGHT: f64 = 20.0;

// ---------------------------------------------------------------------------
// Individual scoring functions
// ---------------------------------------------------------------------------

/// Flat bonus when both items share a category.
pub fn category_score(a: &CatalogItem, b: &CatalogItem) -> f64 {
	if a.category() == b.category() {
		CATEGORY_WEIGHT
	} else {
		0.0
	}
}

fn relative_delta(a: f64, b: f64) -> f64 {
	let max = a.max(b);
	if max > 0.0 {
		(a - b).abs() / max
	} else {
		0.0
	}
}

/// `30 * (1 - mean relative delta)` over the three axes, clamped to
/// `[0, 30]`. Zero unless both boxes are valid.
pub fn dimension_score(a: &Dimensions, b: &Dimensions) -> f64 {
	if !a.is_valid() || !b.is_valid() {
		return 0.0;
	}
	let avg = (relative_delta(a.width, b.width)
		+ relative_delta(a.height, b.height)
		+ relative_delta(a.depth, b.depth))
		/ 3.0;
	(DIMENSION_WEIGHT * (1.0 - avg)).clamp(0.0, DIMENSION_WEIGHT)
}

/// `20 * (1 - |pa - pb| / max(pa, pb))`, clamped to `[0, 20]`. Zero unless
/// both prices are positive.
pub fn price_score(a: f64, b: f64) -> f64 {
	if !(a > 0.0 && b > 0.0) {
		return 0.0;
	}
	(PRICE_WEIGHT * (1.0 - relative_delta(a, b))).clamp(0.0, PRICE_WEIGHT)
}

/// Score `candidate` against `reference`.
pub fn similarity(reference: &CatalogItem, candidate: &CatalogItem) -> SimilarityScores {
	SimilarityScores {
		category: category_score(reference, candidate),
		dimensions: dimension_score(&reference.dimensions(), &candidate.dimensions()),
		price: price_score(reference.base_price(), candidate.base_price()),
	}
}

impl SimilarityScores {
	pub fn total(&self) -> f64 {
		self.category + self.dimensions + self.price
	}
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rank candidates by similarity to `reference`.
///
/// The reference itself and zero-scoring candidates are dropped. The sort is
/// stable, so ties keep the order in which candidates were supplied.
pub fn rank_similar<'a>(
	reference: &CatalogItem,
	candidates: impl IntoIterator<Item = &'a CatalogItem>,
	max_results: usize,
) -> Vec<Recommendation> {
	let mut results: Vec<Recommendation> = candidates
		.into_iter()
		.filter(|c| c.id() != reference.id())
		.filter_map(|c| {
			let scores = similarity(reference, c);
			let score = scores.total();
			(score > 0.0).then(|| Recommendation {
				item: c.clone(),
				score,
				scores,
			})
		})
		.collect();

	results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
	results.truncate(max_results);
	results
}

/// Most recently created first; ties broken by identifier.
pub fn most_recently_created(mut items: Vec<&CatalogItem>, max_results: usize) -> Vec<CatalogItem> {
	items.sort_by(|a, b| {
		b.created_at()
			.cmp(&a.created_at())
			.then_with(|| a.id().cmp(b.id()))
	});
	items.into_iter().take(max_results).cloned().collect()
}

/// Most recently updated first; ties broken by identifier.
pub fn most_recently_updated(mut items: Vec<&CatalogItem>, max_results: usize) -> Vec<CatalogItem> {
	items.sort_by(|a, b| {
		b.updated_at()
			.cmp(&a.updated_at())
			.then_with(|| a.id().cmp(b.id()))
	});
	items.into_iter().take(max_results).cloned().collect()
}

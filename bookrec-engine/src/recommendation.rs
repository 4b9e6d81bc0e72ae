// ---------------------------------------------------------------------------
// Recommendation Engine — nearest neighbours from the similarity matrix
// ---------------------------------------------------------------------------
//
// Ranking is a pure function over one matrix row. The highest score is
// assumed to be the title's own self-similarity and always sits at rank 0,
// which is dropped; ranks 1..=NEIGHBOR_COUNT are returned.
// ---------------------------------------------------------------------------

use std::cmp::Ordering;

use crate::catalog::Catalog;
use crate::error::RecommendError;
use crate::metadata::round_to;
use crate::ratings::RatingStore;
use crate::resolver::not_found_suggestions;
use crate::types::{BookInfo, DataQuality, Recommendations, UNKNOWN_AUTHOR};

pub const NEIGHBOR_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// NaN sorts below every real score.
fn score_order(a: f64, b: f64) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Less,
		(false, true) => Ordering::Greater,
		(false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
	}
}

/// Pair each column with its score, sort descending (stable, so ties keep
/// column order), drop rank 0 and keep the next `count`.
pub fn rank_neighbors(row: &[f64], count: usize) -> Vec<(usize, f64)> {
	let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
	ranked.sort_by(|a, b| score_order(b.1, a.1));
	ranked.into_iter().skip(1).take(count).collect()
}

// ---------------------------------------------------------------------------
// Data quality
// ---------------------------------------------------------------------------

/// A book the catalog knows almost nothing about.
pub fn is_limited(book: &BookInfo) -> bool {
	book.author == UNKNOWN_AUTHOR && book.rating == 0.0
}

pub fn data_quality(books: &[BookInfo]) -> DataQuality {
	let limited = books.iter().filter(|b| is_limited(b)).count();
	let percentage = if books.is_empty() {
		0.0
	} else {
		round_to(limited as f64 / books.len() as f64 * 100.0, 1)
	};
	DataQuality {
		total_recommendations: books.len(),
		limited_info_count: limited,
		limited_info_percentage: percentage,
	}
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn recommend(
	catalog: &Catalog,
	ratings: &RatingStore,
	title: &str,
) -> Result<Recommendations, RecommendError> {
	if !catalog.is_loaded() {
		return Err(RecommendError::SystemNotLoaded);
	}

	let Some(position) = catalog.position(title) else {
		let suggestions = not_found_suggestions(catalog.titles(), title);
		tracing::debug!(title, suggestions = suggestions.len(), "Title not found");
		return Err(RecommendError::TitleNotFound { suggestions });
	};

	let Some(row) = catalog.similarity_row(position) else {
		tracing::warn!(
			title,
			position,
			rows = catalog.similarity_rows(),
			"Similarity matrix has no row for title"
		);
		return Err(RecommendError::DataInconsistency {
			position,
			rows: catalog.similarity_rows(),
		});
	};

	let titles = catalog.titles();
	let books: Vec<BookInfo> = rank_neighbors(row, NEIGHBOR_COUNT)
		.into_iter()
		.filter_map(|(column, _)| titles.get(column))
		.map(|neighbor| catalog.lookup(neighbor, ratings))
		.collect();

	let data_quality = data_quality(&books);
	tracing::debug!(title, count = books.len(), "Generated recommendations");
	if data_quality.limited_info_count > 0 {
		tracing::info!(
			title,
			limited = data_quality.limited_info_count,
			percentage = data_quality.limited_info_percentage,
			"Recommendations include books with limited information"
		);
	}

	Ok(Recommendations {
		books,
		data_quality,
	})
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

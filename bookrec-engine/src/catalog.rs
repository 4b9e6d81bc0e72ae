// ---------------------------------------------------------------------------
// Catalog — immutable context built once at startup
// ---------------------------------------------------------------------------
//
// Owns the loaded artifacts and the merged metadata index. Nothing here is
// mutated after construction; the server shares it behind an `Arc`.
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use crate::loader::CatalogArtifacts;
use crate::metadata::MetadataIndex;
use crate::ratings::RatingStore;
use crate::types::{BookInfo, CatalogRecord, CatalogStatus, PopularityRecord};

#[derive(Debug, Default)]
pub struct Catalog {
	titles: Vec<String>,
	positions: HashMap<String, usize>,
	similarity: Vec<Vec<f64>>,
	popularity: Vec<PopularityRecord>,
	books: Vec<CatalogRecord>,
	index: MetadataIndex,
}

impl Catalog {
	pub fn from_artifacts(artifacts: CatalogArtifacts) -> Self {
		let CatalogArtifacts {
			popularity,
			titles,
			similarity,
			books,
		} = artifacts;

		// First occurrence wins for duplicated titles.
		let mut positions = HashMap::with_capacity(titles.len());
		for (position, title) in titles.iter().enumerate() {
			positions.entry(title.clone()).or_insert(position);
		}

		if !similarity.is_empty() && similarity.len() != titles.len() {
			tracing::warn!(
				titles = titles.len(),
				rows = similarity.len(),
				"Similarity matrix does not match pivot index size"
			);
		}

		let index = MetadataIndex::build(&popularity, &books, &titles);

		Self {
			titles,
			positions,
			similarity,
			popularity,
			books,
			index,
		}
	}

	/// Both the pivot index and the similarity matrix are present.
	pub fn is_loaded(&self) -> bool {
		!self.titles.is_empty() && !self.similarity.is_empty()
	}

	pub fn titles(&self) -> &[String] {
		&self.titles
	}

	pub fn position(&self, title: &str) -> Option<usize> {
		self.positions.get(title).copied()
	}

	pub fn similarity_row(&self, position: usize) -> Option<&[f64]> {
		self.similarity.get(position).map(Vec::as_slice)
	}

	pub fn similarity_rows(&self) -> usize {
		self.similarity.len()
	}

	pub fn index(&self) -> &MetadataIndex {
		&self.index
	}

	/// Merged display record, with the user average applied.
	pub fn lookup(&self, title: &str, ratings: &RatingStore) -> BookInfo {
		self.index.book_info(title, ratings.user_average(title))
	}

	/// Popularity table, optionally narrowed to rows whose title or author
	/// contains `search` (case-insensitive).
	pub fn popular(&self, search: Option<&str>) -> Vec<&PopularityRecord> {
		let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
		if needle.is_empty() {
			return self.popularity.iter().collect();
		}
		self.popularity
			.iter()
			.filter(|record| {
				record.title.to_lowercase().contains(&needle)
					|| record
						.author
						.as_deref()
						.is_some_and(|author| author.to_lowercase().contains(&needle))
			})
			.collect()
	}

	/// First catalog row for `title`.
	pub fn details(&self, title: &str) -> Option<&CatalogRecord> {
		self.books.iter().find(|record| record.title == title)
	}

	pub fn status(&self) -> CatalogStatus {
		CatalogStatus {
			loaded: self.is_loaded(),
			titles: self.titles.len(),
			similarity_rows: self.similarity.len(),
			popularity_records: self.popularity.len(),
			catalog_records: self.books.len(),
			indexed_books: self.index.len(),
		}
	}
}

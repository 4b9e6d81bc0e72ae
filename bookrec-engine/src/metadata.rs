// ---------------------------------------------------------------------------
// Book Metadata Index
// ---------------------------------------------------------------------------
//
// Merges the pivot index, popularity table and full catalog into one
// title -> {author, image, rating} mapping. Pass order:
//
//   1. every pivot title gets defaults (Unknown / placeholder / 0)
//   2. popularity records overwrite unconditionally, inserting new titles
//   3. catalog records fill author/image only where a default remains
//
// Popularity runs before the catalog but still wins on conflict, because
// the catalog pass never touches a non-default field.
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use crate::types::{
	BookInfo, CatalogRecord, PopularityRecord, PLACEHOLDER_IMAGE, UNKNOWN_AUTHOR,
};

/// Round to `decimals` places. Exact halves go to the even neighbour, so
/// an average of 4.125 displays as 4.12.
pub fn round_to(value: f64, decimals: i32) -> f64 {
	let factor = 10f64.powi(decimals);
	(value * factor).round_ties_even() / factor
}

/// Index entry for one title, before user ratings are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct BookMetadata {
	pub author: String,
	pub image: String,
	pub rating: f64,
}

impl Default for BookMetadata {
	fn default() -> Self {
		Self {
			author: UNKNOWN_AUTHOR.to_string(),
			image: PLACEHOLDER_IMAGE.to_string(),
			rating: 0.0,
		}
	}
}

impl BookMetadata {
	fn from_popularity(record: &PopularityRecord) -> Self {
		Self {
			author: record
				.author
				.clone()
				.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
			image: record
				.image
				.clone()
				.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
			rating: round_to(record.avg_rating.unwrap_or(0.0), 2),
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
	entries: HashMap<String, BookMetadata>,
}

impl MetadataIndex {
	pub fn build(
		popularity: &[PopularityRecord],
		catalog: &[CatalogRecord],
		pivot_titles: &[String],
	) -> Self {
		let mut entries: HashMap<String, BookMetadata> = pivot_titles
			.iter()
			.map(|title| (title.clone(), BookMetadata::default()))
			.collect();

		for record in popularity {
			entries.insert(record.title.clone(), BookMetadata::from_popularity(record));
		}

		for record in catalog {
			let Some(entry) = entries.get_mut(&record.title) else {
				continue;
			};
			if entry.author == UNKNOWN_AUTHOR {
				if let Some(author) = &record.author {
					entry.author = author.clone();
				}
			}
			if entry.image == PLACEHOLDER_IMAGE {
				if let Some(image) = &record.image {
					entry.image = image.clone();
				}
			}
		}

		tracing::info!(count = entries.len(), "Created book lookup");
		Self { entries }
	}

	pub fn get(&self, title: &str) -> Option<&BookMetadata> {
		self.entries.get(title)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Assemble the display record for `title`. A user average, when
	/// present, replaces whatever rating the index holds.
	pub fn book_info(&self, title: &str, user_average: Option<f64>) -> BookInfo {
		let meta = self.entries.get(title).cloned().unwrap_or_default();
		let mut rating = if meta.rating > 0.0 { meta.rating } else { 0.0 };
		if let Some(avg) = user_average.filter(|avg| *avg > 0.0) {
			rating = round_to(avg, 2);
		}
		BookInfo {
			title: title.to_string(),
			author: meta.author,
			image: meta.image,
			rating,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::BTreeMap;

	fn popular(title: &str, author: &str, image: &str, rating: f64) -> PopularityRecord {
		PopularityRecord {
			title: title.into(),
			author: Some(author.into()),
			image: Some(image.into()),
			avg_rating: Some(rating),
			num_ratings: Some(100),
		}
	}

	fn book(title: &str, author: &str, image: &str) -> CatalogRecord {
		CatalogRecord {
			title: title.into(),
			author: Some(author.into()),
			image: Some(image.into()),
			extra: BTreeMap::new(),
		}
	}

	fn titles(names: &[&str]) -> Vec<String> {
		names.iter().map(|s| s.to_string()).collect()
	}

	// -- pass 1: pivot defaults ----------------------------------------------

	#[test]
	fn pivot_only_title_has_defaults() {
		let index = MetadataIndex::build(&[], &[], &titles(&["Dune"]));
		let info = index.book_info("Dune", None);
		assert_eq!(info.author, UNKNOWN_AUTHOR);
		assert_eq!(info.image, PLACEHOLDER_IMAGE);
		assert_eq!(info.rating, 0.0);
	}

	#[test]
	fn unknown_title_gets_defaults() {
		let index = MetadataIndex::build(&[], &[], &[]);
		let info = index.book_info("Nowhere", None);
		assert_eq!(info.title, "Nowhere");
		assert_eq!(info.author, UNKNOWN_AUTHOR);
		assert_eq!(info.rating, 0.0);
	}

	// -- pass 2: popularity is authoritative ---------------------------------

	#[test]
	fn popularity_overwrites_defaults_and_rounds_rating() {
		let index = MetadataIndex::build(
			&[popular("Dune", "Frank Herbert", "http://img/dune", 4.456)],
			&[],
			&titles(&["Dune"]),
		);
		let info = index.book_info("Dune", None);
		assert_eq!(info.author, "Frank Herbert");
		assert_eq!(info.image, "http://img/dune");
		assert_eq!(info.rating, 4.46);
	}

	#[test]
	fn popularity_inserts_titles_outside_pivot() {
		let index = MetadataIndex::build(
			&[popular("Emma", "Jane Austen", "http://img/emma", 3.9)],
			&[],
			&titles(&["Dune"]),
		);
		assert_eq!(index.len(), 2);
		assert_eq!(index.get("Emma").unwrap().author, "Jane Austen");
	}

	#[test]
	fn popularity_row_missing_fields_falls_back_to_defaults() {
		let record = PopularityRecord {
			title: "Dune".into(),
			author: None,
			image: None,
			avg_rating: None,
			num_ratings: None,
		};
		let index = MetadataIndex::build(&[record], &[], &[]);
		assert_eq!(index.get("Dune"), Some(&BookMetadata::default()));
	}

	// -- pass 3: catalog only fills defaults ---------------------------------

	#[test]
	fn catalog_fills_default_fields() {
		let index = MetadataIndex::build(
			&[],
			&[book("Dune", "Frank Herbert", "http://img/dune")],
			&titles(&["Dune"]),
		);
		let meta = index.get("Dune").unwrap();
		assert_eq!(meta.author, "Frank Herbert");
		assert_eq!(meta.image, "http://img/dune");
		assert_eq!(meta.rating, 0.0);
	}

	#[test]
	fn catalog_never_overrides_popularity() {
		let index = MetadataIndex::build(
			&[popular("Dune", "Frank Herbert", "http://img/pop", 4.0)],
			&[book("Dune", "F. Herbert", "http://img/catalog")],
			&titles(&["Dune"]),
		);
		let meta = index.get("Dune").unwrap();
		assert_eq!(meta.author, "Frank Herbert");
		assert_eq!(meta.image, "http://img/pop");
	}

	#[test]
	fn catalog_fills_only_the_field_still_at_default() {
		let record = PopularityRecord {
			title: "Dune".into(),
			author: Some("Frank Herbert".into()),
			image: None,
			avg_rating: Some(4.0),
			num_ratings: Some(10),
		};
		let index = MetadataIndex::build(
			&[record],
			&[book("Dune", "F. Herbert", "http://img/catalog")],
			&titles(&["Dune"]),
		);
		let meta = index.get("Dune").unwrap();
		assert_eq!(meta.author, "Frank Herbert");
		assert_eq!(meta.image, "http://img/catalog");
	}

	#[test]
	fn catalog_ignores_titles_outside_index() {
		let index = MetadataIndex::build(&[], &[book("Emma", "Jane Austen", "x")], &[]);
		assert!(index.is_empty());
	}

	// -- user ratings --------------------------------------------------------

	#[test]
	fn user_average_overrides_popularity_rating() {
		let index = MetadataIndex::build(
			&[popular("Dune", "Frank Herbert", "http://img/dune", 4.46)],
			&[],
			&[],
		);
		let info = index.book_info("Dune", Some(4.0));
		assert_eq!(info.rating, 4.0);
		assert_eq!(info.author, "Frank Herbert");
	}

	#[test]
	fn user_average_is_rounded() {
		let index = MetadataIndex::build(&[], &[], &titles(&["Dune"]));
		let info = index.book_info("Dune", Some(11.0 / 3.0));
		assert_eq!(info.rating, 3.67);
	}

	#[test]
	fn average_of_eight_ratings_rounds_half_to_even() {
		let index = MetadataIndex::build(&[], &[], &titles(&["Dune"]));
		let ratings = [4, 4, 4, 4, 4, 4, 4, 5];
		let average = ratings.iter().sum::<i32>() as f64 / ratings.len() as f64;
		assert_eq!(average, 4.125);
		assert_eq!(index.book_info("Dune", Some(average)).rating, 4.12);
		assert_eq!(index.book_info("Dune", Some(4.375)).rating, 4.38);
	}

	#[test]
	fn round_to_two_places() {
		assert_eq!(round_to(4.456, 2), 4.46);
		assert_eq!(round_to(3.0, 2), 3.0);
		assert_eq!(round_to(66.666, 1), 66.7);
		assert_eq!(round_to(0.125, 2), 0.12);
		assert_eq!(round_to(0.875, 2), 0.88);
	}
}

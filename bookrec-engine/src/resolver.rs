// ---------------------------------------------------------------------------
// Title Resolver
// ---------------------------------------------------------------------------
//
// Case-insensitive substring matching over the ordered title space.
// Exact matches come first, then partial matches; both keep catalog order.
// ---------------------------------------------------------------------------

use crate::catalog::Catalog;
use crate::ratings::RatingStore;
use crate::types::BookInfo;

/// Autocomplete queries shorter than this are not matched at all.
pub const MIN_QUERY_CHARS: usize = 2;

/// Suggestions offered when a recommendation title is not found.
pub const MAX_NOT_FOUND_SUGGESTIONS: usize = 3;

const TRAILING_PUNCTUATION: &[char] = &['.', ',', '?', ';', ':'];

/// Every title containing `query`, exact matches ranked first.
pub fn resolve<'a>(titles: &'a [String], query: &str) -> Vec<&'a str> {
	let needle = query.to_lowercase();
	let mut exact = Vec::new();
	let mut partial = Vec::new();
	for title in titles {
		let lower = title.to_lowercase();
		if lower == needle {
			exact.push(title.as_str());
		} else if lower.contains(&needle) {
			partial.push(title.as_str());
		}
	}
	exact.extend(partial);
	exact
}

/// Autocomplete: the first `limit` resolved titles as display records.
pub fn suggest(catalog: &Catalog, ratings: &RatingStore, query: &str, limit: usize) -> Vec<BookInfo> {
	if query.chars().count() < MIN_QUERY_CHARS {
		return Vec::new();
	}
	resolve(catalog.titles(), query)
		.into_iter()
		.take(limit)
		.map(|title| catalog.lookup(title, ratings))
		.collect()
}

pub fn strip_trailing_punctuation(title: &str) -> &str {
	title.trim_end_matches(TRAILING_PUNCTUATION)
}

/// Up to three display-ready alternatives for a title that was not found.
pub fn not_found_suggestions(titles: &[String], query: &str) -> Vec<String> {
	resolve(titles, query)
		.into_iter()
		.take(MAX_NOT_FOUND_SUGGESTIONS)
		.map(|title| strip_trailing_punctuation(title).to_string())
		.collect()
}

pub fn not_found_message(suggestions: &[String]) -> String {
	match suggestions.split_first() {
		None => "Book not found. Please try another book.".to_string(),
		Some((first, [])) => format!("Book not found. Did you mean: {}?", first),
		Some((first, rest)) => format!(
			"Book not found. Did you mean: {}? Or try: {}",
			first,
			rest.join(", ")
		),
	}
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Author shown when no source supplies one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Cover image shown when no source supplies one.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

/// Row of the precomputed popularity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularityRecord {
	#[serde(rename = "Book-Title")]
	pub title: String,
	#[serde(rename = "Book-Author", default)]
	pub author: Option<String>,
	#[serde(rename = "Image-URL-M", default)]
	pub image: Option<String>,
	#[serde(rename = "avg_rating", default)]
	pub avg_rating: Option<f64>,
	#[serde(rename = "num_ratings", default)]
	pub num_ratings: Option<u64>,
}

/// Row of the optional full catalog. Columns beyond title, author and
/// image are carried through untouched for the details view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
	#[serde(rename = "Book-Title")]
	pub title: String,
	#[serde(rename = "Book-Author", default)]
	pub author: Option<String>,
	#[serde(rename = "Image-URL-M", default)]
	pub image: Option<String>,
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

/// Merged, request-time view of a single title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInfo {
	pub title: String,
	pub author: String,
	pub image: String,
	/// 0 means no rating is available.
	pub rating: f64,
}

/// A user-submitted rating, as persisted in the rating store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRatingEntry {
	pub rating: i64,
	#[serde(default)]
	pub review: String,
	pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
	#[serde(rename = "totalRecommendations")]
	pub total_recommendations: usize,
	#[serde(rename = "limitedInfoCount")]
	pub limited_info_count: usize,
	#[serde(rename = "limitedInfoPercentage")]
	pub limited_info_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
	pub books: Vec<BookInfo>,
	#[serde(rename = "dataQuality")]
	pub data_quality: DataQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStatus {
	pub loaded: bool,
	pub titles: usize,
	#[serde(rename = "similarityRows")]
	pub similarity_rows: usize,
	#[serde(rename = "popularityRecords")]
	pub popularity_records: usize,
	#[serde(rename = "catalogRecords")]
	pub catalog_records: usize,
	#[serde(rename = "indexedBooks")]
	pub indexed_books: usize,
}

// ---------------------------------------------------------------------------
// Catalog Loader — precomputed artifact loading
// ---------------------------------------------------------------------------
//
// Reads the popularity table, pivot index, similarity matrix and optional
// full catalog from a data directory. Every artifact is loaded on its own:
// a missing or corrupt file degrades to empty (or synthesized) data and is
// reported through tracing, never as an error to the caller.
//
// Artifacts are JSON documents, optionally gzip-compressed. Compression is
// detected from the magic bytes, not the file name.
// ---------------------------------------------------------------------------

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::{CatalogRecord, PopularityRecord, PLACEHOLDER_IMAGE, UNKNOWN_AUTHOR};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Corruption: {0}")]
	Corruption(String),
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_POPULAR_FILE: &str = "popular.json";
pub const DEFAULT_PIVOT_FILE: &str = "pt.json";
pub const DEFAULT_SIMILARITY_FILE: &str = "similarity_scores.json";
pub const DEFAULT_BOOKS_FILE: &str = "books.json";

// ---------------------------------------------------------------------------
// Artifact locations
// ---------------------------------------------------------------------------

/// Where each artifact lives on disk.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
	pub popular: PathBuf,
	pub pivot: PathBuf,
	pub similarity: PathBuf,
	pub books: PathBuf,
}

impl ArtifactPaths {
	/// Artifacts under `dir` using the default file names.
	pub fn in_dir(dir: impl AsRef<Path>) -> Self {
		let dir = dir.as_ref();
		Self {
			popular: dir.join(DEFAULT_POPULAR_FILE),
			pivot: dir.join(DEFAULT_PIVOT_FILE),
			similarity: dir.join(DEFAULT_SIMILARITY_FILE),
			books: dir.join(DEFAULT_BOOKS_FILE),
		}
	}
}

/// Everything the loader produced. Any field may be empty.
#[derive(Debug, Clone, Default)]
pub struct CatalogArtifacts {
	pub popularity: Vec<PopularityRecord>,
	pub titles: Vec<String>,
	pub similarity: Vec<Vec<f64>>,
	pub books: Vec<CatalogRecord>,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// The pivot table is only consulted for its row index. Either a bare
/// list of titles or a table object with an `index` column is accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum PivotArtifact {
	Titles(Vec<String>),
	Table { index: Vec<String> },
}

impl PivotArtifact {
	fn into_titles(self) -> Vec<String> {
		match self {
			Self::Titles(titles) => titles,
			Self::Table { index } => index,
		}
	}
}

/// Missing cells (`null`) become NaN and rank below every real score.
type RawMatrix = Vec<Vec<Option<f64>>>;

fn into_matrix(raw: RawMatrix) -> Vec<Vec<f64>> {
	raw.into_iter()
		.map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
		.collect()
}

// ---------------------------------------------------------------------------
// Gzip detection / raw reads
// ---------------------------------------------------------------------------

/// Check if data starts with gzip magic bytes (0x1f, 0x8b).
pub fn is_gzipped(data: &[u8]) -> bool {
	data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

fn decompress(data: &[u8]) -> Result<Vec<u8>, LoadError> {
	let mut decoder = GzDecoder::new(data);
	let mut decompressed = Vec::new();
	decoder.read_to_end(&mut decompressed)?;
	Ok(decompressed)
}

fn gz_sibling(path: &Path) -> PathBuf {
	let mut name = path.as_os_str().to_os_string();
	name.push(".gz");
	PathBuf::from(name)
}

/// Read an artifact's bytes, trying `path` and then `path.gz`.
/// Returns `Ok(None)` when neither file exists.
fn read_artifact_bytes(path: &Path) -> Result<Option<Vec<u8>>, LoadError> {
	let gz_path = gz_sibling(path);
	let raw = if path.exists() {
		std::fs::read(path)?
	} else if gz_path.exists() {
		std::fs::read(&gz_path)?
	} else {
		return Ok(None);
	};

	if is_gzipped(&raw) {
		Ok(Some(decompress(&raw)?))
	} else {
		Ok(Some(raw))
	}
}

/// Read and parse one artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, LoadError> {
	let Some(bytes) = read_artifact_bytes(path)? else {
		return Ok(None);
	};
	let parsed = serde_json::from_slice(&bytes).map_err(|e| {
		LoadError::Corruption(format!("Invalid JSON in {}: {}", path.display(), e))
	})?;
	Ok(Some(parsed))
}

/// Like [`read_artifact`], but logs the outcome and folds failures into `None`.
fn load_logged<T: DeserializeOwned>(label: &str, path: &Path) -> Option<T> {
	match read_artifact(path) {
		Ok(Some(value)) => {
			tracing::info!(artifact = label, path = %path.display(), "Loaded artifact");
			Some(value)
		}
		Ok(None) => {
			tracing::warn!(artifact = label, path = %path.display(), "Artifact not found");
			None
		}
		Err(e) => {
			tracing::error!(artifact = label, path = %path.display(), "Error loading artifact: {}", e);
			None
		}
	}
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

/// Build a minimal catalog from the pivot titles alone.
pub fn synthesize_catalog(titles: &[String]) -> Vec<CatalogRecord> {
	titles
		.iter()
		.map(|title| CatalogRecord {
			title: title.clone(),
			author: Some(UNKNOWN_AUTHOR.to_string()),
			image: Some(PLACEHOLDER_IMAGE.to_string()),
			extra: BTreeMap::new(),
		})
		.collect()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Load all four artifacts. Never fails; see module docs.
pub fn load_artifacts(paths: &ArtifactPaths) -> CatalogArtifacts {
	let popularity: Vec<PopularityRecord> =
		load_logged("popularity", &paths.popular).unwrap_or_default();

	let titles = load_logged::<PivotArtifact>("pivot", &paths.pivot)
		.map(PivotArtifact::into_titles)
		.unwrap_or_default();

	let books = match load_logged::<Vec<CatalogRecord>>("catalog", &paths.books) {
		Some(books) => books,
		None if !titles.is_empty() => {
			tracing::info!(count = titles.len(), "Created minimal catalog from pivot index");
			synthesize_catalog(&titles)
		}
		None => {
			tracing::warn!("Failed to create catalog: pivot index is empty");
			Vec::new()
		}
	};

	let similarity = load_logged::<RawMatrix>("similarity", &paths.similarity)
		.map(into_matrix)
		.unwrap_or_else(|| {
			tracing::warn!("Similarity scores unavailable, using empty matrix");
			Vec::new()
		});

	CatalogArtifacts {
		popularity,
		titles,
		similarity,
		books,
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;
	use flate2::write::GzEncoder;
	use flate2::Compression;
	use std::io::Write;

	fn write(dir: &Path, name: &str, body: &str) {
		std::fs::write(dir.join(name), body).unwrap();
	}

	fn write_gz(dir: &Path, name: &str, body: &str) {
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(body.as_bytes()).unwrap();
		std::fs::write(dir.join(name), encoder.finish().unwrap()).unwrap();
	}

	#[test]
	fn empty_directory_loads_empty_artifacts() {
		let dir = tempfile::tempdir().unwrap();
		let artifacts = load_artifacts(&ArtifactPaths::in_dir(dir.path()));
		assert!(artifacts.popularity.is_empty());
		assert!(artifacts.titles.is_empty());
		assert!(artifacts.similarity.is_empty());
		assert!(artifacts.books.is_empty());
	}

	#[test]
	fn loads_all_artifacts() {
		let dir = tempfile::tempdir().unwrap();
		write(
			dir.path(),
			DEFAULT_POPULAR_FILE,
			r#"[{"Book-Title":"Dune","Book-Author":"Frank Herbert","Image-URL-M":"http://img/dune","avg_rating":4.456,"num_ratings":300}]"#,
		);
		write(dir.path(), DEFAULT_PIVOT_FILE, r#"["Dune","Emma"]"#);
		write(dir.path(), DEFAULT_SIMILARITY_FILE, "[[1.0,0.5],[0.5,1.0]]");
		write(
			dir.path(),
			DEFAULT_BOOKS_FILE,
			r#"[{"Book-Title":"Emma","Book-Author":"Jane Austen","Image-URL-M":"http://img/emma","Publisher":"Penguin"}]"#,
		);

		let artifacts = load_artifacts(&ArtifactPaths::in_dir(dir.path()));
		assert_eq!(artifacts.popularity.len(), 1);
		assert_eq!(artifacts.popularity[0].num_ratings, Some(300));
		assert_eq!(artifacts.titles, vec!["Dune", "Emma"]);
		assert_eq!(artifacts.similarity, vec![vec![1.0, 0.5], vec![0.5, 1.0]]);
		assert_eq!(artifacts.books.len(), 1);
		assert_eq!(artifacts.books[0].extra["Publisher"], "Penguin");
	}

	#[test]
	fn pivot_accepts_table_with_index() {
		let dir = tempfile::tempdir().unwrap();
		write(
			dir.path(),
			DEFAULT_PIVOT_FILE,
			r#"{"index":["A","B"],"columns":[1,2],"data":[[0,1],[1,0]]}"#,
		);
		let artifacts = load_artifacts(&ArtifactPaths::in_dir(dir.path()));
		assert_eq!(artifacts.titles, vec!["A", "B"]);
	}

	#[test]
	fn missing_catalog_is_synthesized_from_pivot() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), DEFAULT_PIVOT_FILE, r#"["A","B"]"#);
		let artifacts = load_artifacts(&ArtifactPaths::in_dir(dir.path()));
		assert_eq!(artifacts.books.len(), 2);
		assert_eq!(artifacts.books[1].title, "B");
		assert_eq!(artifacts.books[1].author.as_deref(), Some(UNKNOWN_AUTHOR));
		assert_eq!(artifacts.books[1].image.as_deref(), Some(PLACEHOLDER_IMAGE));
	}

	#[test]
	fn corrupt_artifact_degrades_without_affecting_others() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), DEFAULT_PIVOT_FILE, r#"["A","B"]"#);
		write(dir.path(), DEFAULT_SIMILARITY_FILE, "not json");
		write(dir.path(), DEFAULT_POPULAR_FILE, "{broken");
		let artifacts = load_artifacts(&ArtifactPaths::in_dir(dir.path()));
		assert_eq!(artifacts.titles.len(), 2);
		assert!(artifacts.similarity.is_empty());
		assert!(artifacts.popularity.is_empty());
	}

	#[test]
	fn gzipped_sibling_is_detected() {
		let dir = tempfile::tempdir().unwrap();
		write_gz(dir.path(), "similarity_scores.json.gz", "[[1.0,0.2],[0.2,1.0]]");
		let artifacts = load_artifacts(&ArtifactPaths::in_dir(dir.path()));
		assert_eq!(artifacts.similarity.len(), 2);
	}

	#[test]
	fn null_scores_become_nan() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), DEFAULT_SIMILARITY_FILE, "[[1.0,null]]");
		let artifacts = load_artifacts(&ArtifactPaths::in_dir(dir.path()));
		assert!(artifacts.similarity[0][1].is_nan());
	}

	#[test]
	fn read_artifact_reports_corruption() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "bad.json", "[1,");
		let result: Result<Option<Vec<u32>>, _> = read_artifact(&dir.path().join("bad.json"));
		assert!(matches!(result, Err(LoadError::Corruption(_))));
	}

	#[test]
	fn gzip_magic_detection() {
		assert!(is_gzipped(&[0x1f, 0x8b, 0x08]));
		assert!(!is_gzipped(b"[]"));
		assert!(!is_gzipped(&[0x1f]));
	}
}

// ---------------------------------------------------------------------------
// Rating Store — user ratings persisted as a single JSON document
// ---------------------------------------------------------------------------
//
// Layout: `{ "<title>": [ { "rating": 4, "review": "...", "timestamp": "..." } ] }`
//
// Every append re-reads and rewrites the whole document. Two writers racing
// on the same file lose one update (last writer wins); there is no locking.
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::RatingError;
use crate::types::UserRatingEntry;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

type RatingDocument = BTreeMap<String, Vec<UserRatingEntry>>;

#[derive(Debug, Error)]
pub enum PersistenceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Corruption: {0}")]
	Corruption(String),
	#[error("Serialization: {0}")]
	Serialization(String),
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a rating that is already an integer.
pub fn validate_rating(rating: i64) -> Result<i64, RatingError> {
	if (MIN_RATING..=MAX_RATING).contains(&rating) {
		Ok(rating)
	} else {
		Err(RatingError::OutOfRange(rating))
	}
}

/// Validate a raw form submission: both fields present and non-empty, the
/// rating an integer in 1..=5.
pub fn parse_submission<'a>(
	title: Option<&'a str>,
	rating: Option<&str>,
) -> Result<(&'a str, i64), RatingError> {
	let (Some(title), Some(raw)) = (title, rating) else {
		return Err(RatingError::MissingField);
	};
	if title.is_empty() || raw.is_empty() {
		return Err(RatingError::MissingField);
	}
	let value: i64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| match e.kind() {
		IntErrorKind::PosOverflow => RatingError::OutOfRange(i64::MAX),
		IntErrorKind::NegOverflow => RatingError::OutOfRange(i64::MIN),
		_ => RatingError::NotAnInteger(raw.to_string()),
	})?;
	Ok((title, validate_rating(value)?))
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RatingStore {
	path: PathBuf,
}

impl RatingStore {
	/// Open the store at `path`, creating an empty document if none exists.
	/// A failure to create the file is logged; reads then return nothing
	/// and the first successful append creates it.
	pub fn open(path: impl Into<PathBuf>) -> Self {
		let store = Self { path: path.into() };
		if !store.path.exists() {
			if let Err(e) = store.write_document(&RatingDocument::new()) {
				tracing::warn!(path = %store.path.display(), "Could not initialize rating store: {}", e);
			}
		}
		store
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read_document(&self) -> Result<RatingDocument, PersistenceError> {
		if !self.path.exists() {
			return Ok(RatingDocument::new());
		}
		let bytes = std::fs::read(&self.path)?;
		serde_json::from_slice(&bytes)
			.map_err(|e| PersistenceError::Corruption(format!("Invalid ratings JSON: {}", e)))
	}

	fn staging_path(&self) -> PathBuf {
		let mut name = self
			.path
			.file_name()
			.map(OsString::from)
			.unwrap_or_else(|| OsString::from("ratings"));
		name.push(".tmp");
		self.path.with_file_name(name)
	}

	/// Write to a sibling staging file, then rename it over the document so
	/// an interrupted write never leaves truncated JSON behind.
	fn write_document(&self, document: &RatingDocument) -> Result<(), PersistenceError> {
		let json = serde_json::to_vec(document)
			.map_err(|e| PersistenceError::Serialization(e.to_string()))?;
		let staging = self.staging_path();
		std::fs::write(&staging, json)?;
		if let Err(e) = std::fs::rename(&staging, &self.path) {
			let _ = std::fs::remove_file(&staging);
			return Err(e.into());
		}
		Ok(())
	}

	/// All ratings for `title` in submission order. Read failures are
	/// logged and yield an empty list.
	pub fn get_ratings(&self, title: &str) -> Vec<UserRatingEntry> {
		match self.read_document() {
			Ok(mut document) => document.remove(title).unwrap_or_default(),
			Err(e) => {
				tracing::error!("Error getting book ratings: {}", e);
				Vec::new()
			}
		}
	}

	/// Mean of the user ratings for `title`, or `None` when there are none.
	pub fn user_average(&self, title: &str) -> Option<f64> {
		let ratings = self.get_ratings(title);
		if ratings.is_empty() {
			return None;
		}
		let sum: f64 = ratings.iter().map(|r| r.rating as f64).sum();
		Some(sum / ratings.len() as f64)
	}

	/// Mean of the user ratings for `title`; 0 when there are none.
	pub fn average_rating(&self, title: &str) -> f64 {
		self.user_average(title).unwrap_or(0.0)
	}

	/// Append a rating. Invalid input is rejected before any I/O. A
	/// persistence failure is logged and reported as `Ok(false)`.
	pub fn save_rating(&self, title: &str, rating: i64, review: &str) -> Result<bool, RatingError> {
		if title.is_empty() {
			return Err(RatingError::MissingField);
		}
		let rating = validate_rating(rating)?;

		let entry = UserRatingEntry {
			rating,
			review: review.to_string(),
			timestamp: chrono::Local::now().to_rfc3339(),
		};

		let saved = self
			.read_document()
			.and_then(|mut document| {
				document.entry(title.to_string()).or_default().push(entry);
				self.write_document(&document)
			});

		match saved {
			Ok(()) => {
				tracing::debug!(title, rating, "Saved user rating");
				Ok(true)
			}
			Err(e) => {
				tracing::error!("Error saving user rating: {}", e);
				Ok(false)
			}
		}
	}
}

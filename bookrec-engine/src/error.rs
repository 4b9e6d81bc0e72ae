use thiserror::Error;

use crate::protocol::{BOOKREC_ERROR, INTERNAL_ERROR, INVALID_PARAMS};
use crate::resolver::not_found_message;

/// Failures of a single recommendation request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
	#[error("Recommendation system not properly loaded. Please check the data files.")]
	SystemNotLoaded,
	#[error("{}", not_found_message(.suggestions))]
	TitleNotFound { suggestions: Vec<String> },
	#[error(
		"Error generating recommendations: Data inconsistency detected. Please try another book."
	)]
	DataInconsistency { position: usize, rows: usize },
}

impl RecommendError {
	pub fn code(&self) -> &str {
		match self {
			Self::SystemNotLoaded => "SYSTEM_NOT_LOADED",
			Self::TitleNotFound { .. } => "TITLE_NOT_FOUND",
			Self::DataInconsistency { .. } => "DATA_INCONSISTENCY",
		}
	}
}

/// Rejected rating submissions. Nothing is persisted when one of these is
/// returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
	#[error("Book title and rating are required")]
	MissingField,
	#[error("Invalid rating value")]
	NotAnInteger(String),
	#[error("Rating must be between 1 and 5")]
	OutOfRange(i64),
}

impl RatingError {
	pub fn code(&self) -> &str {
		match self {
			Self::MissingField => "RATING_MISSING_FIELD",
			Self::NotAnInteger(_) => "RATING_NOT_INTEGER",
			Self::OutOfRange(_) => "RATING_OUT_OF_RANGE",
		}
	}
}

/// Top-level error surfaced by the JSON-RPC server.
#[derive(Debug, Error)]
pub enum ServiceError {
	#[error(transparent)]
	Recommend(#[from] RecommendError),
	#[error(transparent)]
	Rating(#[from] RatingError),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Invalid params: {0}")]
	InvalidParams(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
}

impl ServiceError {
	pub fn code(&self) -> &str {
		match self {
			Self::Recommend(e) => e.code(),
			Self::Rating(e) => e.code(),
			Self::Io(_) => "BOOKREC_IO",
			Self::InvalidParams(_) => "BOOKREC_INVALID_PARAMS",
			Self::Serialization(_) => "BOOKREC_SERIALIZATION",
		}
	}

	/// JSON-RPC error code for this failure.
	pub fn rpc_code(&self) -> i32 {
		match self {
			Self::InvalidParams(_) => INVALID_PARAMS,
			Self::Io(_) | Self::Serialization(_) => INTERNAL_ERROR,
			Self::Recommend(_) | Self::Rating(_) => BOOKREC_ERROR,
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		let mut data = serde_json::json!({
			"bookrecCode": self.code(),
			"message": self.to_string(),
		});
		if let Self::Recommend(RecommendError::TitleNotFound { suggestions }) = self {
			data["suggestions"] = serde_json::json!(suggestions);
		}
		data
	}
}

// ---------------------------------------------------------------------------
// BookServer — JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes incoming JSON-RPC 2.0 requests (NDJSON over stdin) to the catalog,
// resolver, recommendation engine and rating store. A main `run()` loop, a
// `dispatch()` that writes the response, `handle()` that does the routing,
// and free-standing handler functions for each method.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead};
use std::sync::Arc;

use serde::Deserialize;

use crate::catalog::Catalog;
use crate::error::{RatingError, ServiceError};
use crate::metadata::round_to;
use crate::protocol::*;
use crate::ratings::{parse_submission, RatingStore};
use crate::recommendation::recommend;
use crate::resolver::suggest;
use crate::transport::NdjsonTransport;

type HandlerResult = Result<serde_json::Value, ServiceError>;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub autocomplete_limit: usize,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			autocomplete_limit: 10,
		}
	}
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct BookServer {
	transport: NdjsonTransport,
	catalog: Arc<Catalog>,
	ratings: RatingStore,
	config: ServerConfig,
}

impl BookServer {
	pub fn new(
		transport: NdjsonTransport,
		catalog: Arc<Catalog>,
		ratings: RatingStore,
		config: ServerConfig,
	) -> Self {
		Self {
			transport,
			catalog,
			ratings,
			config,
		}
	}

	/// Main loop: read JSON-RPC messages from stdin until EOF.
	pub fn run(&mut self) -> Result<(), ServiceError> {
		let stdin = io::stdin();
		self.serve(stdin.lock())
	}

	pub fn serve(&mut self, reader: impl BufRead) -> Result<(), ServiceError> {
		for line_result in reader.lines() {
			let line = line_result?;
			if line.trim().is_empty() {
				continue;
			}

			let request: JsonRpcRequest = match serde_json::from_str(&line) {
				Ok(r) => r,
				Err(e) => {
					tracing::error!("Failed to parse request: {}", e);
					continue;
				}
			};

			self.dispatch(request);
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&self, req: JsonRpcRequest) {
		let id = req.id;
		let Some(result) = self.handle(&req.method, req.params) else {
			self.transport.write_error(
				id,
				METHOD_NOT_FOUND,
				format!("Unknown method: {}", req.method),
				None,
			);
			return;
		};

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(e) => {
				tracing::debug!(method = %req.method, code = e.code(), "Request failed");
				self.transport.write_error(
					id,
					e.rpc_code(),
					e.to_string(),
					Some(e.to_json_rpc_error()),
				)
			}
		}
	}

	/// Route one request. `None` means the method is unknown.
	pub fn handle(&self, method: &str, params: serde_json::Value) -> Option<HandlerResult> {
		let catalog = self.catalog.as_ref();
		let ratings = &self.ratings;
		let result = match method {
			// -- Catalog -------------------------------------------------
			"catalog/status" => to_json(&catalog.status()),

			// -- Books ---------------------------------------------------
			"books/popular" => handle_popular(catalog, params),
			"books/autocomplete" => {
				handle_autocomplete(catalog, ratings, params, self.config.autocomplete_limit)
			}
			"books/lookup" => handle_lookup(catalog, ratings, params),
			"books/details" => handle_details(catalog, ratings, params),
			"books/recommend" => handle_recommend(catalog, ratings, params),

			// -- Ratings -------------------------------------------------
			"ratings/get" => handle_get_ratings(ratings, params),
			"ratings/average" => handle_average_rating(ratings, params),
			"ratings/submit" => handle_submit_rating(ratings, params),

			_ => return None,
		};
		Some(result)
	}
}

// ---------------------------------------------------------------------------
// Param types
// ---------------------------------------------------------------------------

fn parse_params<T: serde::de::DeserializeOwned>(params: serde_json::Value) -> Result<T, ServiceError> {
	serde_json::from_value(params).map_err(|e| ServiceError::InvalidParams(e.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> HandlerResult {
	serde_json::to_value(value).map_err(|e| ServiceError::Serialization(e.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitleParams {
	title: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PopularParams {
	search: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AutocompleteParams {
	#[serde(default)]
	q: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRatingParams {
	title: Option<String>,
	rating: Option<serde_json::Value>,
	#[serde(default)]
	review: String,
}

/// Ratings arrive as form text or as JSON numbers; both go through the
/// same integer parse.
fn rating_text(raw: Option<serde_json::Value>) -> Result<Option<String>, RatingError> {
	match raw {
		None | Some(serde_json::Value::Null) => Ok(None),
		Some(serde_json::Value::String(s)) => Ok(Some(s)),
		Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
		Some(other) => Err(RatingError::NotAnInteger(other.to_string())),
	}
}

// ---------------------------------------------------------------------------
// Free-standing handler functions
// ---------------------------------------------------------------------------

fn handle_popular(catalog: &Catalog, params: serde_json::Value) -> HandlerResult {
	let p: PopularParams = if params.is_null() {
		PopularParams::default()
	} else {
		parse_params(params)?
	};
	let books = catalog.popular(p.search.as_deref());
	Ok(serde_json::json!({ "books": books }))
}

fn handle_autocomplete(
	catalog: &Catalog,
	ratings: &RatingStore,
	params: serde_json::Value,
	limit: usize,
) -> HandlerResult {
	let p: AutocompleteParams = if params.is_null() {
		AutocompleteParams::default()
	} else {
		parse_params(params)?
	};
	let books = suggest(catalog, ratings, &p.q, limit);
	Ok(serde_json::json!({ "books": books }))
}

fn handle_lookup(catalog: &Catalog, ratings: &RatingStore, params: serde_json::Value) -> HandlerResult {
	let p: TitleParams = parse_params(params)?;
	let book = catalog.lookup(&p.title, ratings);
	Ok(serde_json::json!({ "book": book }))
}

fn handle_details(catalog: &Catalog, ratings: &RatingStore, params: serde_json::Value) -> HandlerResult {
	let p: TitleParams = parse_params(params)?;
	let book = catalog.details(&p.title);
	let entries = ratings.get_ratings(&p.title);
	let average = ratings.average_rating(&p.title);
	Ok(serde_json::json!({
		"bookTitle": p.title,
		"book": book,
		"ratings": entries,
		"avgRating": round_to(average, 2),
	}))
}

fn handle_recommend(
	catalog: &Catalog,
	ratings: &RatingStore,
	params: serde_json::Value,
) -> HandlerResult {
	let p: TitleParams = parse_params(params)?;
	let recs = recommend(catalog, ratings, &p.title)?;
	Ok(serde_json::json!({
		"bookTitle": p.title,
		"books": recs.books,
		"dataQuality": recs.data_quality,
	}))
}

fn handle_get_ratings(ratings: &RatingStore, params: serde_json::Value) -> HandlerResult {
	let p: TitleParams = parse_params(params)?;
	Ok(serde_json::json!({ "ratings": ratings.get_ratings(&p.title) }))
}

fn handle_average_rating(ratings: &RatingStore, params: serde_json::Value) -> HandlerResult {
	let p: TitleParams = parse_params(params)?;
	Ok(serde_json::json!({ "average": ratings.average_rating(&p.title) }))
}

fn handle_submit_rating(ratings: &RatingStore, params: serde_json::Value) -> HandlerResult {
	let p: SubmitRatingParams = parse_params(params)?;
	let raw = rating_text(p.rating)?;
	let (title, rating) = parse_submission(p.title.as_deref(), raw.as_deref())?;
	let saved = ratings.save_rating(title, rating, &p.review)?;
	Ok(serde_json::json!({ "saved": saved }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

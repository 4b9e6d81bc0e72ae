use std::path::PathBuf;

use clap::Parser;

use crate::loader::{
	ArtifactPaths, DEFAULT_BOOKS_FILE, DEFAULT_PIVOT_FILE, DEFAULT_POPULAR_FILE,
	DEFAULT_SIMILARITY_FILE,
};
use crate::server::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "bookrec-engine", about = "Book recommendation engine over JSON-RPC / NDJSON stdio")]
pub struct CliArgs {
	/// Directory holding the precomputed artifacts
	#[arg(long, default_value = ".", env = "BOOKREC_DATA_DIR")]
	pub data_dir: PathBuf,

	/// Popularity table (relative to the data directory)
	#[arg(long, default_value = DEFAULT_POPULAR_FILE)]
	pub popular_file: PathBuf,

	/// Pivot table whose row index defines the title space
	#[arg(long, default_value = DEFAULT_PIVOT_FILE)]
	pub pivot_file: PathBuf,

	/// Item-item similarity matrix aligned to the pivot index
	#[arg(long, default_value = DEFAULT_SIMILARITY_FILE)]
	pub similarity_file: PathBuf,

	/// Optional full catalog
	#[arg(long, default_value = DEFAULT_BOOKS_FILE)]
	pub books_file: PathBuf,

	/// User rating store (relative to the data directory unless absolute)
	#[arg(long, default_value = "user_ratings.json", env = "BOOKREC_RATINGS_FILE")]
	pub ratings_file: PathBuf,

	/// Maximum autocomplete suggestions
	#[arg(long, default_value = "10")]
	pub autocomplete_limit: usize,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "BOOKREC_LOG_LEVEL")]
	pub log_level: String,
}

impl CliArgs {
	pub fn artifact_paths(&self) -> ArtifactPaths {
		ArtifactPaths {
			popular: self.data_dir.join(&self.popular_file),
			pivot: self.data_dir.join(&self.pivot_file),
			similarity: self.data_dir.join(&self.similarity_file),
			books: self.data_dir.join(&self.books_file),
		}
	}

	pub fn ratings_path(&self) -> PathBuf {
		self.data_dir.join(&self.ratings_file)
	}

	pub fn server_config(&self) -> ServerConfig {
		ServerConfig {
			autocomplete_limit: self.autocomplete_limit,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_resolve_under_data_dir() {
		let args = CliArgs::parse_from(["bookrec-engine", "--data-dir", "/srv/books"]);
		let paths = args.artifact_paths();
		assert_eq!(paths.pivot, PathBuf::from("/srv/books/pt.json"));
		assert_eq!(paths.similarity, PathBuf::from("/srv/books/similarity_scores.json"));
		assert_eq!(args.ratings_path(), PathBuf::from("/srv/books/user_ratings.json"));
		assert_eq!(args.server_config().autocomplete_limit, 10);
	}

	#[test]
	fn absolute_ratings_file_is_kept() {
		let args = CliArgs::parse_from([
			"bookrec-engine",
			"--data-dir",
			"/srv/books",
			"--ratings-file",
			"/var/lib/ratings.json",
		]);
		assert_eq!(args.ratings_path(), PathBuf::from("/var/lib/ratings.json"));
	}
}
